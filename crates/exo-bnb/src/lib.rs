#![deny(missing_docs)]
//! Branch-and-bound verification of the error-exponent lower bound.
//!
//! The [`Driver`] walks a proof script depth-first over an explicit stack of
//! [`Region`]s, splitting where the script says to split and handing every
//! leaf to a [`LeafCertifier`], normally the [`BoundEvaluator`].

pub mod driver;
pub mod evaluator;
pub mod region;
pub mod script;
pub mod vertices;
pub mod wolfram;

pub use driver::{walk_script, Driver, Leaf, LeafCertifier, RunSummary, OUTPUT_DIGITS};
pub use evaluator::BoundEvaluator;
pub use region::{BoundSlot, Region, Side, FIXED_POINT_EXPONENT, FIXED_POINT_ONE};
pub use script::{ProofRecord, ScriptReader, VerifyRecord, VERIFY_LINE_LEN};
pub use vertices::{extreme_points, Vertex};
pub use wolfram::{export_wolfram, leaf_statement, WOLFRAM_TRAILER};
