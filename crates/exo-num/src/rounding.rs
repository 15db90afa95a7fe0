//! Rounding directions.

use num_bigint::BigInt;
use num_integer::Integer;

/// Direction in which an inexact result is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Round {
    /// Toward negative infinity.
    Down,
    /// Toward positive infinity.
    Up,
}

impl Round {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Round {
        match self {
            Round::Down => Round::Up,
            Round::Up => Round::Down,
        }
    }

    /// Integer quotient rounded in this direction. `denominator` must be positive.
    pub(crate) fn divide(self, numerator: &BigInt, denominator: &BigInt) -> BigInt {
        match self {
            Round::Down => numerator.div_floor(denominator),
            Round::Up => -(-numerator).div_floor(denominator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_rounds_toward_the_requested_infinity() {
        let seven = BigInt::from(7);
        let minus_seven = BigInt::from(-7);
        let two = BigInt::from(2);
        assert_eq!(Round::Down.divide(&seven, &two), BigInt::from(3));
        assert_eq!(Round::Up.divide(&seven, &two), BigInt::from(4));
        assert_eq!(Round::Down.divide(&minus_seven, &two), BigInt::from(-4));
        assert_eq!(Round::Up.divide(&minus_seven, &two), BigInt::from(-3));
        assert_eq!(Round::Up.divide(&BigInt::from(8), &two), BigInt::from(4));
    }

    #[test]
    fn reverse_flips() {
        assert_eq!(Round::Down.reverse(), Round::Up);
        assert_eq!(Round::Up.reverse(), Round::Down);
    }
}
