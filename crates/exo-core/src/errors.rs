//! Structured error types shared across the exo crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ExoError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (slots, line numbers, values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Three-way failure taxonomy. Every class is fatal; the distinction only
/// exists for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Malformed region bounds, non-finite intermediates, vertices outside their box.
    Structural,
    /// Unexpected leading character, malformed numeric field, odd split bound.
    ScriptFormat,
    /// The certified inequality does not hold.
    Certification,
}

/// Canonical error type for the exo checkers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ExoError {
    /// Region or enumeration invariants were violated.
    #[error("invariant violation: {0}")]
    Invariant(ErrorInfo),
    /// Arithmetic produced a non-finite or unrepresentable value.
    #[error("numeric error: {0}")]
    Numeric(ErrorInfo),
    /// The proof script is malformed or ended early.
    #[error("script error: {0}")]
    Script(ErrorInfo),
    /// A certified bound failed its threshold check.
    #[error("certification failure: {0}")]
    Certification(ErrorInfo),
    /// Reading input or writing output failed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ExoError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ExoError::Invariant(info)
            | ExoError::Numeric(info)
            | ExoError::Script(info)
            | ExoError::Certification(info)
            | ExoError::Io(info) => info,
        }
    }

    /// Maps the error family onto the failure taxonomy.
    ///
    /// I/O failures count as script-format failures: an unreadable script
    /// cannot be trusted either.
    pub fn class(&self) -> FailureClass {
        match self {
            ExoError::Invariant(_) | ExoError::Numeric(_) => FailureClass::Structural,
            ExoError::Script(_) | ExoError::Io(_) => FailureClass::ScriptFormat,
            ExoError::Certification(_) => FailureClass::Certification,
        }
    }

    /// Returns the same error with an extra context entry.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        match self {
            ExoError::Invariant(info) => ExoError::Invariant(info.with_context(key, value)),
            ExoError::Numeric(info) => ExoError::Numeric(info.with_context(key, value)),
            ExoError::Script(info) => ExoError::Script(info.with_context(key, value)),
            ExoError::Certification(info) => {
                ExoError::Certification(info.with_context(key, value))
            }
            ExoError::Io(info) => ExoError::Io(info.with_context(key, value)),
        }
    }
}

impl From<std::io::Error> for ExoError {
    fn from(err: std::io::Error) -> Self {
        ExoError::Io(
            ErrorInfo::new("IO001", err.to_string())
                .with_context("kind", format!("{:?}", err.kind())),
        )
    }
}
