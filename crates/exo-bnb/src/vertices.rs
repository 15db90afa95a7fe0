//! Extreme points of one side of a region.
//!
//! The feasible set of a triple is the simplex `q0 + q1 + q2 = 1` cut by
//! the three boxes. Every vertex fixes one coordinate at its lower bound,
//! another at its upper bound, and takes the third as the complement; the
//! six orderings of `{0, 1, 2}` cover every such choice.

use std::collections::BTreeSet;

use exo_core::{ErrorInfo, ExoError};

use crate::region::{Region, Side, FIXED_POINT_ONE};

/// A triple of fixed-point coordinates summing to [`FIXED_POINT_ONE`].
pub type Vertex = [i64; 3];

const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Enumerates the distinct vertices of `side` of a tightened region.
///
/// A complement falling outside its own bounds means the region was not
/// tightened and is reported as an invariant violation.
pub fn extreme_points(region: &Region, side: Side) -> Result<BTreeSet<Vertex>, ExoError> {
    let (lower, upper) = region.side_bounds(side);
    let mut vertices = BTreeSet::new();
    for [low_at, high_at, rest_at] in PERMUTATIONS {
        let mut vertex = [0; 3];
        vertex[low_at] = lower[low_at];
        vertex[high_at] = upper[high_at];
        vertex[rest_at] = FIXED_POINT_ONE - lower[low_at] - upper[high_at];
        if vertex[rest_at] < lower[rest_at] || vertex[rest_at] > upper[rest_at] {
            return Err(ExoError::Invariant(
                ErrorInfo::new("V001", "extreme point complement lies outside its bounds")
                    .with_context("side", format!("{side:?}"))
                    .with_context("coordinate", rest_at.to_string())
                    .with_context("complement", vertex[rest_at].to_string())
                    .with_context("lower", lower[rest_at].to_string())
                    .with_context("upper", upper[rest_at].to_string())
                    .with_hint("regions must be tightened before enumeration"),
            ));
        }
        vertices.insert(vertex);
    }
    Ok(vertices)
}
