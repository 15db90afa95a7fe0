//! Compiled-in constants for both checkers, gathered into explicit
//! configuration values that are built once and passed by reference.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, ExoError};

fn config_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Invariant(ErrorInfo::new(code, message))
}

/// Fixed 3×3 joint law `P(x, y)` stored as integer weights over a common
/// denominator, row-major in `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointLaw {
    /// Numerators of `P(x, y)`, indexed `[x][y]`.
    pub weights: [[u32; 3]; 3],
    /// Common denominator of every entry.
    pub denominator: u32,
}

impl JointLaw {
    /// Diagonal mass 6/60000, off-diagonal mass 9997/60000.
    pub fn reference() -> Self {
        let mut weights = [[9997; 3]; 3];
        for (x, row) in weights.iter_mut().enumerate() {
            row[x] = 6;
        }
        Self {
            weights,
            denominator: 60000,
        }
    }

    /// Checks that every entry is strictly positive and the entries sum to one.
    pub fn validate(&self) -> Result<(), ExoError> {
        if self.denominator == 0 {
            return Err(config_error("CFG001", "joint law denominator is zero"));
        }
        if self.cells().any(|weight| weight == 0) {
            return Err(config_error(
                "CFG002",
                "joint law has an empty cell; log P(x, y) would be undefined",
            ));
        }
        let total: u64 = self.cells().map(u64::from).sum();
        if total != u64::from(self.denominator) {
            return Err(config_error("CFG003", "joint law does not sum to one")
                .with_context("total", total)
                .with_context("denominator", self.denominator));
        }
        Ok(())
    }

    /// Numerator of cell `3 * x + y`.
    pub fn weight(&self, cell: usize) -> u32 {
        self.weights[cell / 3][cell % 3]
    }

    /// Iterates over the nine numerators in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = u32> + '_ {
        self.weights.iter().flat_map(|row| row.iter().copied())
    }
}

impl Default for JointLaw {
    fn default() -> Self {
        Self::reference()
    }
}

/// Constants for the branch-and-bound lower-bound verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Significant bits carried by every scalar.
    pub precision: u32,
    /// Rate constant, as an exact hexadecimal fraction.
    pub rate: String,
    /// Threshold every certified value must exceed.
    pub lowerbound: String,
    /// The fixed joint law.
    pub law: JointLaw,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            precision: 68,
            // 3941 / 2^17
            rate: "0x0.07b28".to_string(),
            // 58488010525784883 / 2^56
            lowerbound: "0x0.cfca8923023b33".to_string(),
            law: JointLaw::reference(),
        }
    }
}

/// One explicit distribution checked by the companion divergence checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceCase {
    /// Short label used in logs and reports.
    pub label: String,
    /// Threshold for `D(R || R_X R_Y)`.
    pub rate: String,
    /// Threshold for `D(R || P)`.
    pub upperbound: String,
    /// Entries of `R(x, y)`, row-major, as exact hexadecimal fractions.
    pub rxy: [String; 9],
}

impl DivergenceCase {
    fn from_literals(label: &str, rate: &str, upperbound: &str, rxy: [&str; 9]) -> Self {
        Self {
            label: label.to_string(),
            rate: rate.to_string(),
            upperbound: upperbound.to_string(),
            rxy: rxy.map(str::to_string),
        }
    }
}

/// Constants for the companion divergence checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceConfig {
    /// Significant bits carried by every scalar.
    pub precision: u32,
    /// The fixed joint law.
    pub law: JointLaw,
    /// Distributions to check, in order.
    pub cases: Vec<DivergenceCase>,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        let case_a = DivergenceCase::from_literals(
            "A",
            "0x0.079d",           // 3898 / 2^17
            "0x0.d02a7208f52317", // 58593464420737815 / 2^56
            [
                "0x0.00d18e2d53dba4",
                "0x0.6c6ebcb6c6ea40",
                "0x0.6c6ebcb6c6ea40",
                "0x0.006ff71d804e2a",
                "0x0.03d405476786bd",
                "0x0.0ee47fcda75307",
                "0x0.006ff71d804e2a",
                "0x0.0ee47fcda75307",
                "0x0.03d405476786bd",
            ],
        );
        let case_b = DivergenceCase::from_literals(
            "B",
            "0x0.07c8",           // 3984 / 2^17
            "0x0.cf6aa03d0f0253", // 58382556630811219 / 2^56
            [
                "0x0.0184ae0a6be14a",
                "0x0.35ba25f4e1fd7f",
                "0x0.870eb8aa072ec5",
                "0x0.02598735ff8940",
                "0x0.057e6f74c876f3",
                "0x0.35ba25f4e1fd7f",
                "0x0.00422176958a36",
                "0x0.02598735ff8940",
                "0x0.0184ae0a6be14a",
            ],
        );
        Self {
            precision: 64,
            law: JointLaw::reference(),
            cases: vec![case_a, case_b],
        }
    }
}
