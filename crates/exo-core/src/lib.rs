#![deny(missing_docs)]
//! Shared error family, configuration and provenance types for the exo
//! certificate checkers.

pub mod config;
pub mod errors;
pub mod provenance;

pub use config::{DivergenceCase, DivergenceConfig, JointLaw, VerifierConfig};
pub use errors::{ErrorInfo, ExoError, FailureClass};
pub use provenance::InputProvenance;

/// Line printed once a whole run has certified.
pub const COMPLETION_MARKER: &str = "finish";
