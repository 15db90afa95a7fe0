//! Fixed-precision arithmetic with caller-chosen rounding direction.

use exo_core::ExoError;

use crate::enclosure::Enclosure;
use crate::float::{numeric_error, Float};
use crate::rounding::Round;
use crate::transcendental::{exp_enclosure, ln_enclosure};

/// Arithmetic context fixing the number of significant bits of every result.
///
/// Every operation returns the exact mathematical result rounded once in the
/// requested direction, so a chain of operations whose directions are chosen
/// consistently yields a one-sided bound on the exact value of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Engine {
    precision: u32,
}

impl Engine {
    /// Smallest accepted precision.
    pub const MIN_PRECISION: u32 = 64;
    /// Largest accepted precision.
    pub const MAX_PRECISION: u32 = 4096;

    /// Creates an engine carrying `precision` significant bits.
    pub fn new(precision: u32) -> Result<Self, ExoError> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&precision) {
            return Err(numeric_error("N040", "unsupported precision")
                .with_context("precision", precision)
                .with_context("min", Self::MIN_PRECISION)
                .with_context("max", Self::MAX_PRECISION));
        }
        Ok(Self { precision })
    }

    /// Significant bits carried by every result.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Parses a `0x` hexadecimal or dyadic decimal literal that must be
    /// representable exactly at this precision.
    pub fn parse(&self, text: &str) -> Result<Float, ExoError> {
        let value: Float = text.parse()?;
        self.exact(value).map_err(|err| err.with_context("text", text))
    }

    /// Parses an unprefixed literal in the given radix, exactly.
    pub fn parse_radix(&self, text: &str, radix: u32) -> Result<Float, ExoError> {
        let value = Float::parse_radix(text, radix)?;
        self.exact(value).map_err(|err| err.with_context("text", text))
    }

    /// `numerator / denominator`, rounded.
    pub fn from_ratio(
        &self,
        numerator: i64,
        denominator: i64,
        round: Round,
    ) -> Result<Float, ExoError> {
        self.div(&Float::from_i64(numerator), &Float::from_i64(denominator), round)
    }

    /// Accepts `value` only if it needs no rounding.
    pub fn exact(&self, value: Float) -> Result<Float, ExoError> {
        if value.fits(self.precision) {
            Ok(value)
        } else {
            Err(numeric_error("N041", "value is not representable at the working precision")
                .with_context("precision", self.precision)
                .with_context("bits", value.significant_bits()))
        }
    }

    /// `a + b`, rounded.
    pub fn add(&self, a: &Float, b: &Float, round: Round) -> Float {
        a.exact_add(b).round(self.precision, round)
    }

    /// `a + b`, failing if the sum is not representable.
    pub fn add_exact(&self, a: &Float, b: &Float) -> Result<Float, ExoError> {
        self.exact(a.exact_add(b))
    }

    /// `a - b`, rounded.
    pub fn sub(&self, a: &Float, b: &Float, round: Round) -> Float {
        a.exact_sub(b).round(self.precision, round)
    }

    /// `a - b`, failing if the difference is not representable.
    pub fn sub_exact(&self, a: &Float, b: &Float) -> Result<Float, ExoError> {
        self.exact(a.exact_sub(b))
    }

    /// `a · b`, rounded.
    pub fn mul(&self, a: &Float, b: &Float, round: Round) -> Float {
        a.exact_mul(b).round(self.precision, round)
    }

    /// `a / b`, rounded. Division by zero is an error.
    pub fn div(&self, a: &Float, b: &Float, round: Round) -> Result<Float, ExoError> {
        a.div_rounded(b, self.precision, round)
    }

    /// Natural logarithm, rounded. Non-positive arguments are an error.
    pub fn ln(&self, a: &Float, round: Round) -> Result<Float, ExoError> {
        Ok(self.select(ln_enclosure(a, self.precision)?, round))
    }

    /// Exponential, rounded. Arguments beyond `±2^40` are an error.
    pub fn exp(&self, a: &Float, round: Round) -> Result<Float, ExoError> {
        Ok(self.select(exp_enclosure(a, self.precision)?, round))
    }

    /// Exact negation.
    pub fn neg(&self, a: &Float) -> Float {
        -a
    }

    /// Smaller of two values; never rounds.
    pub fn min(&self, a: &Float, b: &Float) -> Float {
        a.min(b).clone()
    }

    fn select(&self, enclosure: Enclosure, round: Round) -> Float {
        match round {
            Round::Down => enclosure.lo.round(self.precision, Round::Down),
            Round::Up => enclosure.hi.round(self.precision, Round::Up),
        }
    }
}
