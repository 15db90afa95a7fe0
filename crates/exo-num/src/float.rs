//! Exact dyadic scalars.
//!
//! A [`Float`] is the rational `mantissa · 2^exponent` with an arbitrary
//! size mantissa. Addition, subtraction and multiplication are exact; every
//! inexact step goes through [`Float::round`] or [`Float::div_rounded`] with an
//! explicit [`Round`] direction. There are no infinities and no NaN.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use exo_core::{ErrorInfo, ExoError};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::rounding::Round;

pub(crate) fn numeric_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Numeric(ErrorInfo::new(code, message))
}

/// Exact dyadic rational `mantissa · 2^exponent`.
///
/// The representation is normalised (odd mantissa, or zero with exponent
/// zero), so structural equality is numeric equality. The default value is
/// zero.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Float {
    mantissa: BigInt,
    exponent: i64,
}

impl Float {
    /// The value zero.
    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            exponent: 0,
        }
    }

    /// The value one.
    pub fn one() -> Self {
        Self::from_i64(1)
    }

    /// Exact conversion from an integer.
    pub fn from_i64(value: i64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }

    /// `2^exponent`.
    pub fn pow2(exponent: i64) -> Self {
        Self::from_parts(BigInt::one(), exponent)
    }

    /// Builds `mantissa · 2^exponent`.
    pub fn from_parts(mantissa: BigInt, exponent: i64) -> Self {
        Self { mantissa, exponent }.normalize()
    }

    fn normalize(mut self) -> Self {
        match self.mantissa.trailing_zeros() {
            None => self.exponent = 0,
            Some(0) => {}
            Some(zeros) => {
                self.mantissa >>= zeros as usize;
                self.exponent += zeros as i64;
            }
        }
        self
    }

    /// Normalised mantissa (odd, or zero).
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Binary exponent paired with [`Float::mantissa`].
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Number of significant bits needed to hold the value exactly.
    pub fn significant_bits(&self) -> u64 {
        self.mantissa.bits()
    }

    /// Whether the value is representable with `precision` significant bits.
    pub fn fits(&self, precision: u32) -> bool {
        self.significant_bits() <= u64::from(precision)
    }

    /// Smallest `k` with `|self| < 2^k`. Zero maps to `i64::MIN`.
    pub fn magnitude_exponent(&self) -> i64 {
        if self.is_zero() {
            i64::MIN
        } else {
            self.mantissa.bits() as i64 + self.exponent
        }
    }

    /// Returns `true` for zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    /// Returns `true` for values strictly above zero.
    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    /// Returns `true` for values strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Sign of the value as an ordering against zero.
    pub fn signum(&self) -> Ordering {
        match self.mantissa.sign() {
            Sign::Minus => Ordering::Less,
            Sign::NoSign => Ordering::Equal,
            Sign::Plus => Ordering::Greater,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// Exact multiplication by `2^shift`.
    pub fn mul_pow2(&self, shift: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent + shift,
        }
    }

    /// Exact sum.
    pub fn exact_add(&self, other: &Float) -> Float {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let exponent = self.exponent.min(other.exponent);
        let lhs = &self.mantissa << (self.exponent - exponent) as usize;
        let rhs = &other.mantissa << (other.exponent - exponent) as usize;
        Float::from_parts(lhs + rhs, exponent)
    }

    /// Exact difference.
    pub fn exact_sub(&self, other: &Float) -> Float {
        self.exact_add(&-other)
    }

    /// Exact product.
    pub fn exact_mul(&self, other: &Float) -> Float {
        Float::from_parts(&self.mantissa * &other.mantissa, self.exponent + other.exponent)
    }

    /// Rounds to `precision` significant bits in the given direction.
    pub fn round(&self, precision: u32, round: Round) -> Float {
        let bits = self.mantissa.bits();
        let precision = u64::from(precision);
        if bits <= precision {
            return self.clone();
        }
        let dropped = bits - precision;
        let divisor = BigInt::one() << dropped as usize;
        Float::from_parts(
            round.divide(&self.mantissa, &divisor),
            self.exponent + dropped as i64,
        )
    }

    /// Quotient rounded to `precision` significant bits.
    pub fn div_rounded(
        &self,
        other: &Float,
        precision: u32,
        round: Round,
    ) -> Result<Float, ExoError> {
        if other.is_zero() {
            return Err(numeric_error("N001", "division by zero").with_context("dividend", self));
        }
        Ok(self.div_nonzero(other, precision, round))
    }

    /// Quotient rounded to `precision` bits; `other` must be non-zero.
    pub(crate) fn div_nonzero(&self, other: &Float, precision: u32, round: Round) -> Float {
        if self.is_zero() {
            return Float::zero();
        }
        // Scale so the integer quotient carries at least `precision + 2` bits.
        let shift = (i64::from(precision) + 2 + other.mantissa.bits() as i64
            - self.mantissa.bits() as i64)
            .max(0);
        let numerator = &self.mantissa << shift as usize;
        let (quotient, remainder) = numerator.div_mod_floor(&other.mantissa);
        let exponent = self.exponent - other.exponent - shift;
        let truncated = if remainder.is_zero() {
            Float::from_parts(quotient, exponent)
        } else {
            // Exact value lies strictly between quotient and quotient + 1; the
            // midpoint rounds the same way at the coarser target precision.
            Float::from_parts((quotient << 1usize) + 1, exponent - 1)
        };
        truncated.round(precision, round)
    }

    /// Compares against a small integer.
    pub fn cmp_i64(&self, other: i64) -> Ordering {
        self.cmp(&Float::from_i64(other))
    }

    /// Parses a fixed-point literal in radix 10 or 16, exactly.
    ///
    /// Decimal literals must denote a dyadic rational; `0.5` is accepted but
    /// `0.1` is rejected rather than rounded.
    pub fn parse_radix(text: &str, radix: u32) -> Result<Float, ExoError> {
        if radix != 10 && radix != 16 {
            return Err(numeric_error("N010", "unsupported radix").with_context("radix", radix));
        }
        let malformed =
            || numeric_error("N011", "malformed fixed-point literal").with_context("text", text);
        let (negative, body) = split_sign(text);
        let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));
        let valid = |digits: &str| digits.chars().all(|c| c.is_digit(radix));
        if (int_digits.is_empty() && frac_digits.is_empty())
            || !valid(int_digits)
            || !valid(frac_digits)
        {
            return Err(malformed());
        }
        let digits = [int_digits, frac_digits].concat();
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(malformed)?;
        let mantissa = if negative { -magnitude } else { magnitude };
        let frac_len = frac_digits.len() as i64;
        if radix == 16 {
            return Ok(Float::from_parts(mantissa, -4 * frac_len));
        }
        // m / 10^k = (m / 5^k) · 2^-k
        let fives: BigInt = num_traits::pow(BigInt::from(5u32), frac_digits.len());
        let (quotient, remainder) = mantissa.div_rem(&fives);
        if !remainder.is_zero() {
            return Err(numeric_error("N012", "decimal literal is not a dyadic rational")
                .with_context("text", text));
        }
        Ok(Float::from_parts(quotient, -frac_len))
    }

    /// Exact hexadecimal fixed-point rendering, e.g. `0.07b28`.
    pub fn to_hex_string(&self) -> String {
        let magnitude = self.mantissa.abs();
        let body = if self.exponent >= 0 {
            (magnitude << self.exponent as usize).to_str_radix(16)
        } else {
            let frac_bits = -self.exponent;
            let frac_digits = (frac_bits + 3) / 4;
            let scaled = magnitude << (4 * frac_digits - frac_bits) as usize;
            let unit = BigInt::one() << (4 * frac_digits) as usize;
            let (int_part, frac_part) = scaled.div_rem(&unit);
            format!(
                "{}.{:0>width$}",
                int_part.to_str_radix(16),
                frac_part.to_str_radix(16),
                width = frac_digits as usize
            )
        };
        if self.is_negative() {
            format!("-{body}")
        } else {
            body
        }
    }

    /// Decimal rendering with `digits` fractional digits, rounded in the
    /// given direction.
    pub fn to_decimal_fixed(&self, digits: usize, round: Round) -> String {
        let scale: BigInt = num_traits::pow(BigInt::from(10u32), digits);
        let scaled = if self.exponent >= 0 {
            (&self.mantissa << self.exponent as usize) * &scale
        } else {
            let numerator = &self.mantissa * &scale;
            let denominator = BigInt::one() << (-self.exponent) as usize;
            round.divide(&numerator, &denominator)
        };
        let sign = if scaled.is_negative() { "-" } else { "" };
        let (int_part, frac_part) = scaled.abs().div_rem(&scale);
        if digits == 0 {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{:0>digits$}", frac_part.to_string())
        }
    }

    /// Exact rendering as a reduced fraction, e.g. `-3/8`, `5` or `0`.
    pub fn to_fraction_string(&self) -> String {
        if self.exponent >= 0 {
            (&self.mantissa << self.exponent as usize).to_string()
        } else {
            let denominator = BigInt::one() << (-self.exponent) as usize;
            format!("{}/{}", self.mantissa, denominator)
        }
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    }
}

impl FromStr for Float {
    type Err = ExoError;

    /// Accepts `0x`-prefixed hexadecimal or plain decimal literals.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (negative, body) = split_sign(text);
        match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            Some(hex) => {
                if hex.starts_with(['+', '-']) {
                    return Err(numeric_error("N011", "malformed fixed-point literal")
                        .with_context("text", text));
                }
                let value = Float::parse_radix(hex, 16)?;
                Ok(if negative { -value } else { value })
            }
            None => Float::parse_radix(text, 10),
        }
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.exponent == other.exponent {
            return self.mantissa.cmp(&other.mantissa);
        }
        self.exact_sub(other).signum()
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Float {
    type Output = Float;

    fn neg(self) -> Float {
        Float {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Neg for &Float {
    type Output = Float;

    fn neg(self) -> Float {
        -self.clone()
    }
}

impl From<i64> for Float {
    fn from(value: i64) -> Self {
        Float::from_i64(value)
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_hex_string().strip_prefix('-') {
            Some(magnitude) => write!(f, "-0x{magnitude}"),
            None => write!(f, "0x{}", self.to_hex_string()),
        }
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float({self})")
    }
}
