use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use lattice_core::lattice::crr::{self, LatticeInput};

use crate::input;

/// Arguments for option pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Path to JSON input file (flags below are ignored when given)
    #[arg(long)]
    pub input: Option<String>,

    /// Spot price of the underlying
    #[arg(long)]
    pub spot: Option<Decimal>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Time to expiry in years
    #[arg(long)]
    pub expiry: Option<Decimal>,

    /// Risk-free rate (annualised, continuously compounded)
    #[arg(long, default_value = "0.05", allow_hyphen_values = true)]
    pub rate: Decimal,

    /// Volatility (annualised)
    #[arg(long, default_value = "0.2")]
    pub vol: Decimal,

    /// Number of lattice steps
    #[arg(long, default_value = "100")]
    pub steps: u32,

    /// Option kind: call or put
    #[arg(long, default_value = "call")]
    pub kind: String,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = resolve_input(&args)?;
    let result = crr::price_option(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the convergence sweep
#[derive(Args)]
pub struct ConvergenceArgs {
    #[command(flatten)]
    pub contract: PriceArgs,

    /// Comma-separated step counts to sweep
    #[arg(
        long = "sweep",
        value_delimiter = ',',
        default_value = "10,50,100,500,1000"
    )]
    pub sweep: Vec<u32>,
}

// `change` stays in every row (null on the first) so tabular output keeps a
// uniform column set
#[derive(Serialize)]
struct ConvergenceRow {
    steps: u32,
    price: Decimal,
    change: Option<Decimal>,
}

pub fn run_convergence(args: ConvergenceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base = resolve_input(&args.contract)?;

    let mut rows = Vec::with_capacity(args.sweep.len());
    let mut previous: Option<Decimal> = None;
    for steps in args.sweep {
        let input = LatticeInput { steps, ..base.clone() };
        let price = crr::price_option(&input)?.result.price;
        rows.push(ConvergenceRow {
            steps,
            price,
            change: previous.map(|p| price - p),
        });
        previous = Some(price);
    }

    Ok(serde_json::json!({ "results": rows }))
}

/// Build a LatticeInput from a JSON file, piped stdin, or scalar flags.
fn resolve_input(args: &PriceArgs) -> Result<LatticeInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(input::file::read_json(path)?);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    let spot = args
        .spot
        .ok_or("--spot is required when no JSON input is given")?;
    let strike = args
        .strike
        .ok_or("--strike is required when no JSON input is given")?;
    let expiry = args
        .expiry
        .ok_or("--expiry is required when no JSON input is given")?;

    Ok(LatticeInput {
        spot_price: spot,
        strike_price: strike,
        time_to_expiry: expiry,
        risk_free_rate: args.rate,
        volatility: args.vol,
        steps: args.steps,
        option_type: args.kind.parse()?,
    })
}
