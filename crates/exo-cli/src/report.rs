use std::error::Error;
use std::fs;
use std::path::Path;

use exo_bnb::RunSummary;
use exo_core::{DivergenceConfig, InputProvenance, VerifierConfig};
use exo_div::CaseReport;
use serde::Serialize;

/// Written after a successful `lowerbound` run.
#[derive(Debug, Serialize)]
pub struct LowerboundReport<'a> {
    pub command: &'static str,
    pub config: &'a VerifierConfig,
    pub script: InputProvenance,
    pub summary: RunSummary,
}

/// Written after a successful `upperbound` run.
#[derive(Debug, Serialize)]
pub struct UpperboundReport<'a> {
    pub command: &'static str,
    pub config: &'a DivergenceConfig,
    pub cases: Vec<CaseReport>,
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
