#![deny(missing_docs)]
//! Fixed-precision dyadic arithmetic with explicit directed rounding.
//!
//! [`Float`] holds exact dyadic rationals; [`Engine`] fixes a precision and
//! exposes the arithmetic primitives the certificate checkers compose, each
//! rounded toward a caller-chosen [`Round`] direction. `ln` and `exp` are
//! computed from rigorous enclosures, so the rounded result is always on the
//! requested side of the exact value.

mod enclosure;
mod engine;
mod float;
mod rounding;
mod transcendental;

pub use engine::Engine;
pub use float::Float;
pub use rounding::Round;
