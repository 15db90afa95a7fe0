use std::cmp::Ordering;
use std::io::Write;

use exo_core::{DivergenceCase, DivergenceConfig, ErrorInfo, ExoError, COMPLETION_MARKER};
use exo_num::{Engine, Float, Round};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fractional digits printed for each divergence.
pub const OUTPUT_DIGITS: usize = 20;

fn case_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Invariant(ErrorInfo::new(code, message))
}

fn certification_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Certification(ErrorInfo::new(code, message))
}

/// A case whose literals have been parsed and whose entries form a PMF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCase {
    /// Name used in diagnostics.
    pub label: String,
    /// Bound on `D(R || R_X R_Y)`.
    pub rate: Float,
    /// Bound on `D(R || P)`.
    pub upperbound: Float,
    /// `R(x, y)`, row-major.
    pub rxy: [Float; 9],
}

/// Certified divergences of one case, rounded up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case label.
    pub label: String,
    /// Upper bound on `D(R || R_X R_Y)`.
    pub mutual_information: String,
    /// Upper bound on `D(R || P)`.
    pub law_divergence: String,
}

/// Checks explicit distributions against the fixed law.
#[derive(Debug, Clone)]
pub struct DivergenceChecker {
    engine: Engine,
    /// `P(x, y)` rounded down, row-major.
    law: [Float; 9],
}

impl DivergenceChecker {
    /// Builds the checker and rounds the law down once.
    pub fn new(config: &DivergenceConfig) -> Result<Self, ExoError> {
        let engine = Engine::new(config.precision)?;
        config.law.validate()?;
        let mut law: [Float; 9] = Default::default();
        for (cell, slot) in law.iter_mut().enumerate() {
            *slot = engine.from_ratio(
                i64::from(config.law.weight(cell)),
                i64::from(config.law.denominator),
                Round::Down,
            )?;
        }
        Ok(Self { engine, law })
    }

    /// Parses a case, requiring every entry in `(0, 1)` and an exact total of one.
    pub fn parse_case(&self, case: &DivergenceCase) -> Result<ParsedCase, ExoError> {
        let rate = self.unit_literal(&case.rate, "rate")?;
        let upperbound = self.unit_literal(&case.upperbound, "upperbound")?;
        let mut rxy: [Float; 9] = Default::default();
        for (cell, (slot, text)) in rxy.iter_mut().zip(&case.rxy).enumerate() {
            *slot = self
                .unit_literal(text, "rxy")
                .map_err(|err| err.with_context("cell", cell))?;
        }
        let total = rxy.iter().fold(Float::zero(), |acc, entry| acc.exact_add(entry));
        if total != Float::one() {
            return Err(case_error("D002", "distribution does not sum to one")
                .with_context("case", &case.label)
                .with_context("total", total));
        }
        Ok(ParsedCase {
            label: case.label.clone(),
            rate,
            upperbound,
            rxy,
        })
    }

    /// `D(R || R_X R_Y)` rounded up; must stay below the case's rate.
    pub fn mutual_information(&self, case: &ParsedCase) -> Result<Float, ExoError> {
        let engine = &self.engine;
        let mut rx: [Float; 3] = Default::default();
        let mut ry: [Float; 3] = Default::default();
        for (cell, entry) in case.rxy.iter().enumerate() {
            rx[cell / 3] = engine.add_exact(&rx[cell / 3], entry)?;
            ry[cell % 3] = engine.add_exact(&ry[cell % 3], entry)?;
        }
        let mut sum = Float::zero();
        for (cell, entry) in case.rxy.iter().enumerate() {
            let product = engine.mul(&rx[cell / 3], &ry[cell % 3], Round::Down);
            sum = engine.add(&sum, &self.relative_entropy_term(entry, &product)?, Round::Up);
        }
        debug!(case = %case.label, value = %sum, "mutual information");
        if sum.cmp(&case.rate) != Ordering::Less {
            return Err(certification_error("C010", "mutual information is not below rate")
                .with_context("case", &case.label)
                .with_context("value", sum.to_decimal_fixed(OUTPUT_DIGITS, Round::Up))
                .with_context("rate", &case.rate));
        }
        Ok(sum)
    }

    /// `D(R || P)` rounded up; must stay below the case's upper bound.
    pub fn law_divergence(&self, case: &ParsedCase) -> Result<Float, ExoError> {
        let mut sum = Float::zero();
        for (entry, p) in case.rxy.iter().zip(&self.law) {
            sum = self
                .engine
                .add(&sum, &self.relative_entropy_term(entry, p)?, Round::Up);
        }
        debug!(case = %case.label, value = %sum, "law divergence");
        if sum.cmp(&case.upperbound) != Ordering::Less {
            return Err(certification_error("C011", "law divergence is not below upperbound")
                .with_context("case", &case.label)
                .with_context("value", sum.to_decimal_fixed(OUTPUT_DIGITS, Round::Up))
                .with_context("upperbound", &case.upperbound));
        }
        Ok(sum)
    }

    /// Checks every case in order, writing each divergence as soon as it is
    /// certified and the completion marker at the end.
    pub fn run<W: Write>(
        &self,
        cases: &[DivergenceCase],
        out: &mut W,
    ) -> Result<Vec<CaseReport>, ExoError> {
        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            let parsed = self.parse_case(case)?;
            let mutual_information =
                self.mutual_information(&parsed)?.to_decimal_fixed(OUTPUT_DIGITS, Round::Up);
            writeln!(out, "{mutual_information}")?;
            let law_divergence =
                self.law_divergence(&parsed)?.to_decimal_fixed(OUTPUT_DIGITS, Round::Up);
            writeln!(out, "{law_divergence}")?;
            info!(case = %case.label, "divergence case verified");
            reports.push(CaseReport {
                label: case.label.clone(),
                mutual_information,
                law_divergence,
            });
        }
        writeln!(out, "{COMPLETION_MARKER}")?;
        out.flush()?;
        Ok(reports)
    }

    /// `r · log(r / q)` with the quotient, logarithm and product rounded up.
    fn relative_entropy_term(&self, r: &Float, q: &Float) -> Result<Float, ExoError> {
        let engine = &self.engine;
        let log_ratio = engine.ln(&engine.div(r, q, Round::Up)?, Round::Up)?;
        Ok(engine.mul(r, &log_ratio, Round::Up))
    }

    fn unit_literal(&self, text: &str, name: &str) -> Result<Float, ExoError> {
        let value = self.engine.parse(text)?;
        if !value.is_positive() || value.cmp_i64(1) != Ordering::Less {
            return Err(case_error("D001", "value must lie strictly between 0 and 1")
                .with_context("name", name)
                .with_context("value", text));
        }
        Ok(value)
    }
}
