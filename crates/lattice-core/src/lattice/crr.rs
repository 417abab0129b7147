//! Cox-Ross-Rubinstein binomial lattice pricer for European options.
//!
//! The lattice is recombining (`u * d = 1`), so depth N has N + 1 distinct
//! terminal nodes. Terminal payoffs are folded back one depth at a time as a
//! discounted risk-neutral expectation over each node's up/down branches.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::error::LatticeError;
use crate::math::{exp_decimal, sqrt_decimal};
use crate::types::*;
use crate::LatticeResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl FromStr for OptionType {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(LatticeError::InvalidParameter {
                field: "option_type".into(),
                reason: format!("unrecognised option kind '{other}', expected CALL or PUT"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeInput {
    pub spot_price: Money,
    pub strike_price: Money,
    /// Years to expiry; zero means the option has already expired
    pub time_to_expiry: Years,
    /// Annualised, continuously compounded
    pub risk_free_rate: Rate,
    /// Annualised; zero collapses the lattice to a single deterministic path
    pub volatility: Rate,
    /// Number of lattice steps (default 100)
    #[serde(default = "default_steps")]
    pub steps: u32,
    pub option_type: OptionType,
}

fn default_steps() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeOutput {
    pub price: Money,
    pub intrinsic_value: Money,
    pub time_value: Money,
    pub moneyness: String,
    pub breakeven: Money,
    /// Lattice parameters; absent when the degenerate paths built no lattice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_factor: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_factor: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_neutral_prob: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &LatticeInput) -> LatticeResult<()> {
    if input.spot_price <= Decimal::ZERO {
        return Err(LatticeError::InvalidParameter {
            field: "spot_price".into(),
            reason: "must be positive".into(),
        });
    }
    if input.strike_price <= Decimal::ZERO {
        return Err(LatticeError::InvalidParameter {
            field: "strike_price".into(),
            reason: "must be positive".into(),
        });
    }
    if input.time_to_expiry < Decimal::ZERO {
        return Err(LatticeError::InvalidParameter {
            field: "time_to_expiry".into(),
            reason: "must be non-negative".into(),
        });
    }
    if input.volatility < Decimal::ZERO {
        return Err(LatticeError::InvalidParameter {
            field: "volatility".into(),
            reason: "must be non-negative".into(),
        });
    }
    if input.steps == 0 {
        return Err(LatticeError::InvalidParameter {
            field: "steps".into(),
            reason: "the lattice needs at least one step".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lattice internals
// ---------------------------------------------------------------------------

fn overflow(context: &str) -> LatticeError {
    LatticeError::NumericOverflow {
        context: context.into(),
    }
}

/// Checked multiply; decimal overflow surfaces as an error, never a panic.
fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LatticeResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

fn checked_exp(x: Decimal, context: &str) -> LatticeResult<Decimal> {
    exp_decimal(x).ok_or_else(|| overflow(context))
}

struct LatticeParams {
    dt: Decimal,
    sigma_sqrt_dt: Decimal,
    up: Decimal,
    down: Decimal,
    q_up: Decimal,
    discount: Decimal,
}

/// Derive per-step lattice parameters and check the no-arbitrage bound.
/// Callers guarantee sigma > 0 and steps >= 1, so `up > down` here.
fn derive_params(t: Years, r: Rate, sigma: Rate, steps: u32) -> LatticeResult<LatticeParams> {
    let dt = t / Decimal::from(steps);
    let sigma_sqrt_dt = checked_mul(sigma, sqrt_decimal(dt), "sigma * sqrt(dt)")?;
    let up = checked_exp(sigma_sqrt_dt, "up factor")?;
    let down = Decimal::ONE / up;
    let r_dt = checked_mul(r, dt, "r * dt")?;
    let growth = checked_exp(r_dt, "per-step growth")?;
    let q_up = (growth - down) / (up - down);

    if q_up <= Decimal::ZERO || q_up >= Decimal::ONE {
        return Err(LatticeError::ArbitrageViolation {
            risk_neutral_prob: q_up,
            reason: "must lie strictly inside (0, 1); increase the step count \
                     or check the rate and volatility inputs"
                .into(),
        });
    }

    Ok(LatticeParams {
        dt,
        sigma_sqrt_dt,
        up,
        down,
        q_up,
        discount: checked_exp(-r_dt, "per-step discount")?,
    })
}

fn payoff(price: Money, strike: Money, option_type: OptionType) -> Money {
    match option_type {
        OptionType::Call => (price - strike).max(Decimal::ZERO),
        OptionType::Put => (strike - price).max(Decimal::ZERO),
    }
}

/// Terminal payoff vector at depth N.
///
/// Index j counts down-moves, so index 0 is the all-up path. Each terminal
/// price is computed as S * exp(sigma * sqrt(dt) * (N - 2j)) rather than as
/// separate u/d powers, which keeps intermediate magnitudes bounded for
/// large step counts.
fn terminal_payoffs(
    spot: Money,
    strike: Money,
    sigma_sqrt_dt: Decimal,
    steps: u32,
    option_type: OptionType,
) -> LatticeResult<Vec<Money>> {
    let n = Decimal::from(steps);
    let size = (steps + 1) as usize;
    let mut payoffs = Vec::with_capacity(size);
    for j in 0..size {
        let moves = n - dec!(2) * Decimal::from(j as u32);
        let exponent = checked_mul(sigma_sqrt_dt, moves, "terminal exponent")?;
        let growth = checked_exp(exponent, "terminal growth factor")?;
        let terminal_price = checked_mul(spot, growth, "terminal asset price")?;
        payoffs.push(payoff(terminal_price, strike, option_type));
    }
    Ok(payoffs)
}

/// Backward induction: each pass replaces a vector of length m with one of
/// length m - 1, each entry a discounted convex combination of two adjacent
/// values. With index j counting down-moves, node j at one depth branches to
/// nodes j (up) and j + 1 (down) at the next.
fn fold_back(values: &mut Vec<Money>, params: &LatticeParams) -> LatticeResult<()> {
    let q_down = Decimal::ONE - params.q_up;
    while values.len() > 1 {
        for j in 0..values.len() - 1 {
            // The convex combination stays within its operands; only the
            // discounting can overflow, and only when r < 0 makes it > 1
            let up_leg = checked_mul(params.q_up, values[j], "backward induction")?;
            let down_leg = checked_mul(q_down, values[j + 1], "backward induction")?;
            let expectation = up_leg
                .checked_add(down_leg)
                .ok_or_else(|| overflow("backward induction"))?;
            values[j] = checked_mul(params.discount, expectation, "backward induction")?;
        }
        values.pop();
    }
    Ok(())
}

fn classify_moneyness(spot: Money, strike: Money, option_type: OptionType) -> String {
    let ratio = spot / strike;
    // ATM band: within 1% of strike
    let in_the_money = match option_type {
        OptionType::Call => ratio > dec!(1.01),
        OptionType::Put => ratio < dec!(0.99),
    };
    let out_of_the_money = match option_type {
        OptionType::Call => ratio < dec!(0.99),
        OptionType::Put => ratio > dec!(1.01),
    };
    if in_the_money {
        "ITM".into()
    } else if out_of_the_money {
        "OTM".into()
    } else {
        "ATM".into()
    }
}

fn breakeven(strike: Money, premium: Money, option_type: OptionType) -> Money {
    match option_type {
        OptionType::Call => strike + premium,
        OptionType::Put => strike - premium,
    }
}

// ---------------------------------------------------------------------------
// Public API: price_option
// ---------------------------------------------------------------------------

pub fn price_option(input: &LatticeInput) -> LatticeResult<ComputationOutput<LatticeOutput>> {
    let start = Instant::now();
    validate_input(input)?;

    let s = input.spot_price;
    let k = input.strike_price;
    let t = input.time_to_expiry;
    let r = input.risk_free_rate;
    let sigma = input.volatility;

    let mut warnings = Vec::new();

    let (price, params) = if t.is_zero() {
        // Expired: worth exactly its intrinsic payoff, nothing to discount
        (payoff(s, k, input.option_type), None)
    } else if sigma.is_zero() {
        // Zero volatility: one deterministic path growing at the risk-free
        // rate; discounting the terminal payoff needs no lattice
        let r_t = checked_mul(r, t, "r * T")?;
        let forward = checked_mul(s, checked_exp(r_t, "forward growth")?, "forward price")?;
        let discounted = checked_mul(
            checked_exp(-r_t, "discount factor")?,
            payoff(forward, k, input.option_type),
            "discounted payoff",
        )?;
        (discounted, None)
    } else {
        let params = derive_params(t, r, sigma, input.steps)?;
        if params.q_up < dec!(0.01) || params.q_up > dec!(0.99) {
            warnings.push(format!(
                "risk-neutral up-probability {} is within 0.01 of an arbitrage bound; \
                 consider a larger step count",
                params.q_up
            ));
        }
        let mut values =
            terminal_payoffs(s, k, params.sigma_sqrt_dt, input.steps, input.option_type)?;
        fold_back(&mut values, &params)?;
        (values[0], Some(params))
    };

    let intrinsic = payoff(s, k, input.option_type);
    let output = LatticeOutput {
        price,
        intrinsic_value: intrinsic,
        time_value: price - intrinsic,
        moneyness: classify_moneyness(s, k, input.option_type),
        breakeven: breakeven(k, price, input.option_type),
        up_factor: params.as_ref().map(|p| p.up),
        down_factor: params.as_ref().map(|p| p.down),
        risk_neutral_prob: params.as_ref().map(|p| p.q_up),
    };

    let methodology = if t.is_zero() {
        "Intrinsic value (expired option)"
    } else if sigma.is_zero() {
        "Discounted forward payoff (zero volatility)"
    } else {
        "CRR binomial lattice (European exercise)"
    };

    let assumptions = serde_json::json!({
        "model": methodology,
        "risk_free_rate": r.to_string(),
        "volatility": sigma.to_string(),
        "option_type": format!("{:?}", input.option_type),
        "steps": input.steps,
        "time_step": params.as_ref().map(|p| p.dt.to_string()),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Price a European option directly from scalar inputs.
#[allow(clippy::too_many_arguments)]
pub fn price(
    spot_price: Money,
    strike_price: Money,
    time_to_expiry: Years,
    risk_free_rate: Rate,
    volatility: Rate,
    steps: u32,
    option_type: OptionType,
) -> LatticeResult<Money> {
    let input = LatticeInput {
        spot_price,
        strike_price,
        time_to_expiry,
        risk_free_rate,
        volatility,
        steps,
        option_type,
    };
    Ok(price_option(&input)?.result.price)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
