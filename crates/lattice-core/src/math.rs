//! Decimal transcendental helpers.
//!
//! The lattice parameters need `exp` and `sqrt` over `Decimal`. Rather than
//! round-tripping through f64, both are computed directly in 128-bit decimal:
//! `exp` as a Taylor series with range reduction, `sqrt` by Newton iteration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Taylor series exp(x) with range reduction for |x| > 2.
/// exp(x) = exp(x/2)^2 when |x| > 2, then Taylor with 25 terms.
/// Returns None when the result exceeds the Decimal range.
pub fn exp_decimal(x: Decimal) -> Option<Decimal> {
    let two = dec!(2);

    // Range reduction: for large |x|, split recursively. The squaring is
    // where overflow can happen, so it is checked.
    if x > two || x < -two {
        let half = exp_decimal(x / two)?;
        return half.checked_mul(half);
    }

    // Taylor series: exp(x) = sum_{n=0}^{25} x^n / n!
    // With |x| <= 2 every term and the sum stay below e^2.
    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=25 {
        term = term * x / Decimal::from(n);
        sum += term;
    }
    Some(sum)
}

/// Newton's method sqrt: y_{n+1} = (y_n + x/y_n) / 2, 25 iterations.
/// Returns zero for non-positive input; callers validate sign upstream.
pub fn sqrt_decimal(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if x == Decimal::ONE {
        return Decimal::ONE;
    }
    let two = dec!(2);
    let mut guess = x / two;
    // Better initial guess for very large or very small x
    if x > dec!(100) {
        guess = dec!(10);
    } else if x < dec!(0.01) {
        guess = dec!(0.1);
    }
    for _ in 0..25 {
        guess = (guess + x / guess) / two;
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        let diff = a - b;
        let abs_diff = if diff < Decimal::ZERO { -diff } else { diff };
        abs_diff < tol
    }

    #[test]
    fn test_exp_identity_and_e() {
        assert_eq!(exp_decimal(Decimal::ZERO).unwrap(), Decimal::ONE);
        assert!(approx_eq(
            exp_decimal(dec!(1)).unwrap(),
            dec!(2.718281828459045),
            dec!(0.000001)
        ));
    }

    #[test]
    fn test_exp_reciprocal() {
        // exp(x) * exp(-x) = 1
        let x = dec!(0.73);
        let product = exp_decimal(x).unwrap() * exp_decimal(-x).unwrap();
        assert!(approx_eq(product, Decimal::ONE, dec!(0.0000001)));
    }

    #[test]
    fn test_exp_range_reduction() {
        // e^5 ~ 148.4131591
        assert!(approx_eq(
            exp_decimal(dec!(5)).unwrap(),
            dec!(148.4131591),
            dec!(0.0001)
        ));
        // e^-5 ~ 0.0067379
        assert!(approx_eq(
            exp_decimal(dec!(-5)).unwrap(),
            dec!(0.00673794699),
            dec!(0.0000001)
        ));
    }

    #[test]
    fn test_exp_overflow_is_none() {
        // e^100 ~ 2.7e43, beyond the Decimal range
        assert_eq!(exp_decimal(dec!(100)), None);
        // Large negative exponents underflow harmlessly to zero instead
        assert_eq!(exp_decimal(dec!(-100)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_sqrt_basic() {
        assert!(approx_eq(sqrt_decimal(dec!(4)), dec!(2), dec!(0.0000001)));
        assert!(approx_eq(sqrt_decimal(dec!(2)), dec!(1.41421356), dec!(0.0000001)));
        assert!(approx_eq(sqrt_decimal(dec!(0.02)), dec!(0.141421356), dec!(0.0000001)));
    }

    #[test]
    fn test_sqrt_non_positive() {
        assert_eq!(sqrt_decimal(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(sqrt_decimal(dec!(-3)), Decimal::ZERO);
    }
}
