#![deny(missing_docs)]
//! Companion checker for the upper bound: each shipped distribution `R` must
//! be a probability mass function whose divergences from its own product of
//! marginals and from the fixed law `P` stay below the stated thresholds.

mod checker;

pub use checker::{CaseReport, DivergenceChecker, ParsedCase, OUTPUT_DIGITS};
