//! Rigorous enclosures of `exp` and `ln`.
//!
//! Both functions are evaluated by truncated power series in interval
//! arithmetic at a working precision well above the target, then the
//! truncation tail is added to the enclosure as an explicit error radius.
//! The caller rounds the appropriate endpoint outward to the target
//! precision, so soundness never depends on how tight the enclosure is.

use exo_core::ExoError;

use crate::enclosure::Enclosure;
use crate::float::{numeric_error, Float};

/// Extra bits carried above the target precision.
const GUARD_BITS: u32 = 32;

/// Arguments are halved until `|r| < 2^-REDUCTION_BITS` before the exp series.
const REDUCTION_BITS: i64 = 8;

/// `exp` arguments must satisfy `|x| < 2^EXP_ARGUMENT_BITS`.
const EXP_ARGUMENT_BITS: i64 = 40;

pub(crate) fn exp_enclosure(x: &Float, precision: u32) -> Result<Enclosure, ExoError> {
    if x.is_zero() {
        return Ok(Enclosure::point(Float::one()));
    }
    let magnitude = x.magnitude_exponent();
    if magnitude > EXP_ARGUMENT_BITS {
        return Err(numeric_error("N030", "exponential overflows the representable range")
            .with_context("argument", x));
    }
    // exp(x) = exp(x / 2^h)^(2^h)
    let halvings = (magnitude + REDUCTION_BITS).max(0);
    let bits = precision + GUARD_BITS + halvings as u32;
    let reduced = Enclosure::point(x.mul_pow2(-halvings));
    let threshold = Float::pow2(-i64::from(bits) - 4);

    let mut term = Enclosure::point(Float::one());
    let mut sum = term.clone();
    let mut n: u64 = 0;
    loop {
        n += 1;
        term = term.mul(&reduced, bits).div_int(n, bits);
        sum = sum.add(&term, bits);
        if term.magnitude() < threshold {
            break;
        }
    }
    // With |r| <= 1/2 the omitted terms sum to at most |term|.
    let mut result = sum.widen(&term.magnitude().mul_pow2(1));

    for _ in 0..halvings {
        if !result.lo.is_positive() {
            return Err(numeric_error("N031", "exponential enclosure lost positivity")
                .with_context("argument", x));
        }
        result = result.square_positive(bits);
    }
    Ok(result)
}

pub(crate) fn ln_enclosure(x: &Float, precision: u32) -> Result<Enclosure, ExoError> {
    if !x.is_positive() {
        return Err(
            numeric_error("N020", "logarithm of a non-positive value").with_context("argument", x)
        );
    }
    // x = y · 2^k with y in [3/4, 3/2]
    let top = x.significant_bits() as i64 - 1;
    let mut k = top + x.exponent();
    let mut y = Float::from_parts(x.mantissa().clone(), -top);
    if y > Float::from_parts(3.into(), -1) {
        y = y.mul_pow2(-1);
        k += 1;
    }
    let bits = precision + GUARD_BITS + (64 - k.unsigned_abs().leading_zeros());

    // ln y = 2 atanh((y - 1) / (y + 1))
    let one = Float::one();
    let z = Enclosure::quotient(&y.exact_sub(&one), &y.exact_add(&one), bits);
    let mut result = double_atanh(&z, bits);
    if k != 0 {
        let scaled = ln2_enclosure(bits).mul(&Enclosure::point(Float::from_i64(k)), bits);
        result = result.add(&scaled, bits);
    }
    Ok(result)
}

fn ln2_enclosure(bits: u32) -> Enclosure {
    let third = Enclosure::quotient(&Float::one(), &Float::from_i64(3), bits);
    double_atanh(&third, bits)
}

/// Encloses `2 atanh(z)` for `|z| <= 1/3`.
fn double_atanh(z: &Enclosure, bits: u32) -> Enclosure {
    if z.is_zero() {
        return z.clone();
    }
    let z_squared = z.mul(z, bits);
    let threshold = z.magnitude().mul_pow2(-i64::from(bits) - 4);

    let mut power = z.clone();
    let mut sum = z.clone();
    let mut denominator: u64 = 1;
    loop {
        power = power.mul(&z_squared, bits);
        denominator += 2;
        sum = sum.add(&power.div_int(denominator, bits), bits);
        if power.magnitude() < threshold {
            break;
        }
    }
    // Omitted terms sum to at most |power| · z² / (1 - z²) < |power|.
    sum.widen(&power.magnitude()).mul_pow2(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(enclosure: &Enclosure) -> Float {
        enclosure.hi.exact_sub(&enclosure.lo)
    }

    #[test]
    fn ln2_is_tight_and_correct() {
        let ln2 = ln2_enclosure(100);
        // about thirty series terms, each rounded outward at 2^-100
        assert!(width(&ln2) < Float::pow2(-93));
        assert_eq!(
            ln2.lo.to_decimal_fixed(25, crate::Round::Down),
            "0.6931471805599453094172321"
        );
    }

    #[test]
    fn exp_of_small_and_large_arguments() {
        let e = exp_enclosure(&Float::one(), 68).unwrap();
        assert!(e.lo < e.hi);
        assert!(width(&e) < Float::pow2(-80));
        let big = exp_enclosure(&Float::from_i64(1000), 68).unwrap();
        // exp(1000) ~ 1.97e434
        assert_eq!(big.lo.magnitude_exponent(), 1443);
        let tiny = exp_enclosure(&Float::from_i64(-1000), 68).unwrap();
        assert!(tiny.lo.is_positive());
        assert_eq!(tiny.hi.magnitude_exponent(), -1442);
    }

    #[test]
    fn ln_of_powers_of_two_and_near_one() {
        let ln8 = ln_enclosure(&Float::from_i64(8), 68).unwrap();
        let three_ln2 = ln2_enclosure(100).mul(&Enclosure::point(Float::from_i64(3)), 100);
        assert!(ln8.lo <= three_ln2.hi && three_ln2.lo <= ln8.hi);

        let one = ln_enclosure(&Float::one(), 68).unwrap();
        assert_eq!(one, Enclosure::point(Float::zero()));

        // ln(1 + 2^-60) ~ 2^-60 with full relative accuracy
        let near = Float::one().exact_add(&Float::pow2(-60));
        let ln_near = ln_enclosure(&near, 68).unwrap();
        assert!(ln_near.lo.is_positive());
        assert!(width(&ln_near) < Float::pow2(-60 - 80));
    }

    #[test]
    fn domain_errors() {
        assert_eq!(ln_enclosure(&Float::zero(), 68).unwrap_err().info().code, "N020");
        assert_eq!(ln_enclosure(&Float::from_i64(-1), 68).unwrap_err().info().code, "N020");
        let huge = Float::pow2(50);
        assert_eq!(exp_enclosure(&huge, 68).unwrap_err().info().code, "N030");
    }
}
