use lattice_core::lattice::crr::{self, LatticeInput, OptionType};
use lattice_core::LatticeError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Model-level properties of the CRR lattice pricer
// ===========================================================================

fn contract(spot: Decimal, option_type: OptionType, steps: u32) -> LatticeInput {
    LatticeInput {
        spot_price: spot,
        strike_price: dec!(100),
        time_to_expiry: dec!(1),
        risk_free_rate: dec!(0.05),
        volatility: dec!(0.20),
        steps,
        option_type,
    }
}

fn abs(x: Decimal) -> Decimal {
    if x < Decimal::ZERO {
        -x
    } else {
        x
    }
}

#[test]
fn test_put_call_parity() {
    // C - P = S - K * e^(-rT) for identical parameters
    for spot in [dec!(80), dec!(100), dec!(125)] {
        let call = crr::price_option(&contract(spot, OptionType::Call, 50))
            .unwrap()
            .result
            .price;
        let put = crr::price_option(&contract(spot, OptionType::Put, 50))
            .unwrap()
            .result
            .price;

        // K * e^(-0.05) with e^(-0.05) to ample precision
        let discounted_strike = dec!(100) * dec!(0.951229424500714);
        let lhs = call - put;
        let rhs = spot - discounted_strike;
        assert!(
            abs(lhs - rhs) < dec!(0.0001),
            "parity failed at S={spot}: C-P={lhs}, S-Ke^(-rT)={rhs}"
        );
    }
}

#[test]
fn test_call_monotone_in_spot() {
    let spots = [dec!(60), dec!(80), dec!(95), dec!(100), dec!(110), dec!(140)];
    let mut last = Decimal::MIN;
    for spot in spots {
        let price = crr::price_option(&contract(spot, OptionType::Call, 50))
            .unwrap()
            .result
            .price;
        assert!(
            price >= last,
            "call price {price} at S={spot} below price {last} at lower spot"
        );
        last = price;
    }
}

#[test]
fn test_put_monotone_in_spot() {
    let spots = [dec!(60), dec!(80), dec!(95), dec!(100), dec!(110), dec!(140)];
    let mut last = Decimal::MAX;
    for spot in spots {
        let price = crr::price_option(&contract(spot, OptionType::Put, 50))
            .unwrap()
            .result
            .price;
        assert!(
            price <= last,
            "put price {price} at S={spot} above price {last} at lower spot"
        );
        last = price;
    }
}

#[test]
fn test_non_negativity() {
    for spot in [dec!(20), dec!(90), dec!(100), dec!(110), dec!(300)] {
        for option_type in [OptionType::Call, OptionType::Put] {
            for steps in [1, 10, 50] {
                let price = crr::price_option(&contract(spot, option_type, steps))
                    .unwrap()
                    .result
                    .price;
                assert!(
                    price >= Decimal::ZERO,
                    "negative price {price} at S={spot}, {option_type:?}, N={steps}"
                );
            }
        }
    }
}

#[test]
fn test_convergence_in_steps() {
    // Successive refinements approach the continuous-time value; the
    // Black-Scholes price for this contract is ~10.4506
    let coarse = crr::price_option(&contract(dec!(100), OptionType::Call, 10))
        .unwrap()
        .result
        .price;
    let medium = crr::price_option(&contract(dec!(100), OptionType::Call, 100))
        .unwrap()
        .result
        .price;
    let fine = crr::price_option(&contract(dec!(100), OptionType::Call, 1000))
        .unwrap()
        .result
        .price;

    let first_refinement = abs(medium - coarse);
    let second_refinement = abs(fine - medium);
    assert!(
        second_refinement < first_refinement,
        "refinement gaps should shrink: |{medium}-{coarse}|={first_refinement}, \
         |{fine}-{medium}|={second_refinement}"
    );

    let closed_form = dec!(10.4506);
    assert!(
        abs(fine - closed_form) < dec!(0.02),
        "N=1000 price {fine} not near Black-Scholes {closed_form}"
    );
}

#[test]
fn test_overflowing_inputs_error_instead_of_panicking() {
    // Extreme but precondition-respecting volatilities push terminal prices
    // past the Decimal range; the pricer must report that, never panic
    for (vol, steps) in [(dec!(2), 1000), (dec!(5), 500), (dec!(100), 1)] {
        let input = LatticeInput {
            volatility: vol,
            ..contract(dec!(100), OptionType::Call, steps)
        };
        match crr::price_option(&input) {
            Err(LatticeError::NumericOverflow { .. }) => {}
            other => panic!("expected NumericOverflow for vol={vol}, got {other:?}"),
        }
    }
}

#[test]
fn test_serde_input_schema() {
    // The JSON schema shared by the CLI and any bindings: steps defaults
    // to 100 when omitted
    let json = r#"{
        "spot_price": "100",
        "strike_price": "100",
        "time_to_expiry": "1",
        "risk_free_rate": "0.05",
        "volatility": "0.2",
        "option_type": "Call"
    }"#;
    let input: LatticeInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.steps, 100);
    let result = crr::price_option(&input).unwrap();
    assert!(result.result.price > dec!(10) && result.result.price < dec!(11));
}
