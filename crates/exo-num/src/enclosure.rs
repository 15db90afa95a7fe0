use crate::float::Float;
use crate::rounding::Round;

/// Closed interval `[lo, hi]` of dyadics, widened outward on every rounded
/// operation. Only used as scratch space while evaluating series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Enclosure {
    pub(crate) lo: Float,
    pub(crate) hi: Float,
}

impl Enclosure {
    pub(crate) fn point(value: Float) -> Self {
        Self {
            lo: value.clone(),
            hi: value,
        }
    }

    /// Encloses `numerator / denominator`; `denominator` must be non-zero.
    pub(crate) fn quotient(numerator: &Float, denominator: &Float, bits: u32) -> Self {
        Self {
            lo: numerator.div_nonzero(denominator, bits, Round::Down),
            hi: numerator.div_nonzero(denominator, bits, Round::Up),
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.lo.is_zero() && self.hi.is_zero()
    }

    pub(crate) fn add(&self, other: &Enclosure, bits: u32) -> Self {
        Self {
            lo: self.lo.exact_add(&other.lo).round(bits, Round::Down),
            hi: self.hi.exact_add(&other.hi).round(bits, Round::Up),
        }
    }

    pub(crate) fn mul(&self, other: &Enclosure, bits: u32) -> Self {
        let products = [
            self.lo.exact_mul(&other.lo),
            self.lo.exact_mul(&other.hi),
            self.hi.exact_mul(&other.lo),
            self.hi.exact_mul(&other.hi),
        ];
        let mut lo = &products[0];
        let mut hi = &products[0];
        for product in &products[1..] {
            lo = lo.min(product);
            hi = hi.max(product);
        }
        Self {
            lo: lo.round(bits, Round::Down),
            hi: hi.round(bits, Round::Up),
        }
    }

    /// Squares an enclosure lying strictly above zero.
    pub(crate) fn square_positive(&self, bits: u32) -> Self {
        debug_assert!(self.lo.is_positive());
        Self {
            lo: self.lo.exact_mul(&self.lo).round(bits, Round::Down),
            hi: self.hi.exact_mul(&self.hi).round(bits, Round::Up),
        }
    }

    pub(crate) fn div_int(&self, divisor: u64, bits: u32) -> Self {
        let divisor = Float::from_i64(divisor as i64);
        Self {
            lo: self.lo.div_nonzero(&divisor, bits, Round::Down),
            hi: self.hi.div_nonzero(&divisor, bits, Round::Up),
        }
    }

    /// Widens both ends by `radius` (non-negative), exactly.
    pub(crate) fn widen(&self, radius: &Float) -> Self {
        Self {
            lo: self.lo.exact_sub(radius),
            hi: self.hi.exact_add(radius),
        }
    }

    pub(crate) fn mul_pow2(&self, shift: i64) -> Self {
        Self {
            lo: self.lo.mul_pow2(shift),
            hi: self.hi.mul_pow2(shift),
        }
    }

    /// Largest absolute value in the enclosure.
    pub(crate) fn magnitude(&self) -> Float {
        self.lo.abs().max(self.hi.abs())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, value: &Float) -> bool {
        &self.lo <= value && value <= &self.hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_sign_product_takes_extreme_corners() {
        let a = Enclosure {
            lo: Float::from_i64(-2),
            hi: Float::from_i64(3),
        };
        let b = Enclosure {
            lo: Float::from_i64(-5),
            hi: Float::from_i64(4),
        };
        let product = a.mul(&b, 64);
        assert_eq!(product.lo, Float::from_i64(-15));
        assert_eq!(product.hi, Float::from_i64(12));
    }

    #[test]
    fn rounded_operations_stay_outward() {
        let third = Enclosure::quotient(&Float::one(), &Float::from_i64(3), 20);
        assert!(third.lo < third.hi);
        let tripled = third.mul(&Enclosure::point(Float::from_i64(3)), 20);
        assert!(tripled.contains(&Float::one()));
        let halved = Enclosure::point(Float::one()).div_int(3, 20);
        assert_eq!(halved, third);
    }

    #[test]
    fn widen_and_magnitude() {
        let e = Enclosure::point(Float::from_i64(-3)).widen(&Float::one());
        assert_eq!(e.lo, Float::from_i64(-4));
        assert_eq!(e.hi, Float::from_i64(-2));
        assert_eq!(e.magnitude(), Float::from_i64(4));
    }
}
