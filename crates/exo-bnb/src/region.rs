//! Box regions over the pair of probability triples `(Q_X, Q_Y)`.

use std::fmt;

use exo_core::{ErrorInfo, ExoError};
use serde::{Deserialize, Serialize};

/// Bounds are integers scaled by `2^FIXED_POINT_EXPONENT`.
pub const FIXED_POINT_EXPONENT: u32 = 29;

/// Fixed-point representation of one.
pub const FIXED_POINT_ONE: i64 = 1 << FIXED_POINT_EXPONENT;

fn invariant_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Invariant(ErrorInfo::new(code, message))
}

/// Which probability triple a bound slot constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// `Q_X`, slots 0 to 2.
    X,
    /// `Q_Y`, slots 3 to 5.
    Y,
}

impl Side {
    /// Index of the first slot on this side.
    pub fn offset(self) -> usize {
        match self {
            Side::X => 0,
            Side::Y => 3,
        }
    }
}

/// One of the six bounded quantities, `Q_X(1..3)` then `Q_Y(1..3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoundSlot(u8);

impl BoundSlot {
    /// Number of slots in a region.
    pub const COUNT: usize = 6;

    /// Slot from its index in `0..6`.
    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index as u8))
    }

    /// Slot named by a split directive letter `a..=f`.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a'..='f' => Self::new(letter as usize - 'a' as usize),
            _ => None,
        }
    }

    /// Index in `0..6`.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Split directive letter for this slot.
    pub fn letter(self) -> char {
        char::from(b'a' + self.0)
    }

    /// Triple this slot belongs to.
    pub fn side(self) -> Side {
        if self.index() < 3 {
            Side::X
        } else {
            Side::Y
        }
    }

    /// All six slots in index order.
    pub fn all() -> impl Iterator<Item = BoundSlot> {
        (0..Self::COUNT as u8).map(BoundSlot)
    }
}

impl fmt::Display for BoundSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side() {
            Side::X => "X",
            Side::Y => "Y",
        };
        write!(f, "{} (Q_{}({}))", self.letter(), side, self.index() % 3 + 1)
    }
}

/// Six `[lower, upper]` bounds in fixed point:
/// `lower[i] <= Q(i) * 2^29 <= upper[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    lower: [i64; 6],
    upper: [i64; 6],
}

impl Region {
    /// The whole unit box, where the driver starts.
    pub fn unit() -> Self {
        Self {
            lower: [0; 6],
            upper: [FIXED_POINT_ONE; 6],
        }
    }

    /// Builds a region after checking `0 <= lower < upper <= one` per slot.
    pub fn new(lower: [i64; 6], upper: [i64; 6]) -> Result<Self, ExoError> {
        let region = Self { lower, upper };
        region.validate()?;
        Ok(region)
    }

    /// Lower bound of a slot.
    pub fn lower(&self, slot: BoundSlot) -> i64 {
        self.lower[slot.index()]
    }

    /// Upper bound of a slot.
    pub fn upper(&self, slot: BoundSlot) -> i64 {
        self.upper[slot.index()]
    }

    /// Lower and upper bounds of one side's three slots.
    pub fn side_bounds(&self, side: Side) -> ([i64; 3], [i64; 3]) {
        let start = side.offset();
        let mut lower = [0; 3];
        let mut upper = [0; 3];
        lower.copy_from_slice(&self.lower[start..start + 3]);
        upper.copy_from_slice(&self.upper[start..start + 3]);
        (lower, upper)
    }

    /// Checks `0 <= lower < upper <= one` for every slot.
    pub fn validate(&self) -> Result<(), ExoError> {
        for slot in BoundSlot::all() {
            let (lower, upper) = (self.lower(slot), self.upper(slot));
            let violation = if lower < 0 {
                Some(("R001", "lower bound is negative"))
            } else if lower >= upper {
                Some(("R002", "lower bound is not below upper bound"))
            } else if upper > FIXED_POINT_ONE {
                Some(("R003", "upper bound exceeds one"))
            } else {
                None
            };
            if let Some((code, message)) = violation {
                return Err(invariant_error(code, message)
                    .with_context("slot", slot)
                    .with_context("lower", lower)
                    .with_context("upper", upper));
            }
        }
        Ok(())
    }

    /// Tightens every bound against the two simplex constraints
    /// `sum Q_X = 1` and `sum Q_Y = 1`, validating before and after.
    ///
    /// All lower bounds are tightened from the incoming upper bounds first,
    /// then all upper bounds from the tightened lower bounds.
    pub fn tightened(&self) -> Result<Region, ExoError> {
        self.validate()?;
        let mut next = *self;
        for side in [Side::X, Side::Y] {
            let base = side.offset();
            for i in 0..3 {
                let (j, k) = (base + (i + 1) % 3, base + (i + 2) % 3);
                next.lower[base + i] =
                    next.lower[base + i].max(FIXED_POINT_ONE - self.upper[j] - self.upper[k]);
            }
        }
        for side in [Side::X, Side::Y] {
            let base = side.offset();
            for i in 0..3 {
                let (j, k) = (base + (i + 1) % 3, base + (i + 2) % 3);
                next.upper[base + i] =
                    next.upper[base + i].min(FIXED_POINT_ONE - next.lower[j] - next.lower[k]);
            }
        }
        next.validate()
            .map_err(|err| err.with_context("stage", "after tightening"))?;
        Ok(next)
    }

    /// Halves the region along `slot`, returning `(lower half, upper half)`.
    ///
    /// Both bounds of the slot must be even so the midpoint is exact.
    pub fn split(&self, slot: BoundSlot) -> Result<(Region, Region), ExoError> {
        let (lower, upper) = (self.lower(slot), self.upper(slot));
        if lower % 2 != 0 || upper % 2 != 0 {
            return Err(ExoError::Script(
                ErrorInfo::new("S030", "split slot has an odd bound")
                    .with_context("slot", slot.to_string())
                    .with_context("lower", lower.to_string())
                    .with_context("upper", upper.to_string())
                    .with_hint("the region is already at fixed-point resolution"),
            ));
        }
        let middle = lower / 2 + upper / 2;
        let mut lower_half = *self;
        let mut upper_half = *self;
        lower_half.upper[slot.index()] = middle;
        upper_half.lower[slot.index()] = middle;
        Ok((lower_half, upper_half))
    }

    /// Whether every bound of `self` lies inside the matching bound of `outer`.
    pub fn is_within(&self, outer: &Region) -> bool {
        BoundSlot::all().all(|slot| {
            outer.lower(slot) <= self.lower(slot) && self.upper(slot) <= outer.upper(slot)
        })
    }
}
