//! Leaf certificate: a Rényi-type lower bound on the error exponent over
//! one region, rounded so the computed `value` never exceeds the true one.

use std::cmp::Ordering;

use exo_core::{ErrorInfo, ExoError, VerifierConfig};
use exo_num::{Engine, Float, Round};
use tracing::trace;

use crate::region::{Region, Side, FIXED_POINT_EXPONENT};
use crate::script::VerifyRecord;
use crate::vertices::extreme_points;

fn certification_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Certification(ErrorInfo::new(code, message))
}

fn parameter_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Script(ErrorInfo::new(code, message))
}

/// Evaluates and checks leaf certificates against fixed constants.
#[derive(Debug, Clone)]
pub struct BoundEvaluator {
    engine: Engine,
    rate: Float,
    lowerbound: Float,
    /// `log P(x, y)` rounded up, row-major.
    log_law: [Float; 9],
}

impl BoundEvaluator {
    /// Parses the constants and precomputes `log P(x, y)`.
    pub fn new(config: &VerifierConfig) -> Result<Self, ExoError> {
        let engine = Engine::new(config.precision)?;
        let rate = parse_unit_constant(&engine, "rate", &config.rate)?;
        let lowerbound = parse_unit_constant(&engine, "lowerbound", &config.lowerbound)?;
        config.law.validate()?;

        let mut log_law: [Float; 9] = Default::default();
        for (cell, slot) in log_law.iter_mut().enumerate() {
            let p = engine.from_ratio(
                i64::from(config.law.weight(cell)),
                i64::from(config.law.denominator),
                Round::Up,
            )?;
            *slot = engine.ln(&p, Round::Up)?;
        }
        Ok(Self {
            engine,
            rate,
            lowerbound,
            log_law,
        })
    }

    /// The arithmetic context.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Threshold every certified value must exceed.
    pub fn lowerbound(&self) -> &Float {
        &self.lowerbound
    }

    /// Checks `0.001 < alpha < 0.999` and `0 <= beta < 9`, returning `1 - alpha`.
    pub fn check_parameters(&self, record: &VerifyRecord) -> Result<Float, ExoError> {
        let scaled = record.alpha.exact_mul(&Float::from_i64(1000));
        if scaled.cmp_i64(1) != Ordering::Greater || scaled.cmp_i64(999) != Ordering::Less {
            return Err(parameter_error("S020", "alpha outside (0.001, 0.999)")
                .with_context("alpha", &record.alpha));
        }
        for (cell, beta) in record.beta.iter().enumerate() {
            if beta.is_negative() || beta.cmp_i64(9) != Ordering::Less {
                return Err(parameter_error("S021", "beta outside [0, 9)")
                    .with_context("cell", cell)
                    .with_context("beta", beta));
            }
        }
        let alpha = self.engine.exact(record.alpha.clone())?;
        for beta in &record.beta {
            self.engine.exact(beta.clone())?;
        }
        self.engine.sub_exact(&Float::one(), &alpha)
    }

    /// Computes the certified lower bound `value` for `region`.
    pub fn evaluate(&self, region: &Region, record: &VerifyRecord) -> Result<Float, ExoError> {
        let engine = &self.engine;
        let one_minus_alpha = self.check_parameters(record)?;
        let alpha = &record.alpha;

        let d = self.min_weighted_mass(region, record, &one_minus_alpha)?;

        // M = exp(alpha · log Σ exp(log(exp(alpha · log P) + beta) / alpha))
        let mut sum = Float::zero();
        for (log_p, beta) in self.log_law.iter().zip(&record.beta) {
            let term = engine.exp(&engine.mul(log_p, alpha, Round::Up), Round::Up)?;
            let term = engine.ln(&engine.add(&term, beta, Round::Up), Round::Up)?;
            let term = engine.exp(&engine.div(&term, alpha, Round::Up)?, Round::Up)?;
            sum = engine.add(&sum, &term, Round::Up);
        }
        let log_sum = engine.ln(&sum, Round::Up)?;
        let m = engine.exp(&engine.mul(&log_sum, alpha, Round::Up), Round::Up)?;
        trace!(d = %d, m = %m, "leaf masses");

        // value = -(log(M - D) + (1 - alpha) · rate) / alpha
        let gap = engine.sub(&m, &d, Round::Up);
        if !gap.is_positive() {
            return Err(certification_error("C002", "M - D is not positive")
                .with_context("m", m)
                .with_context("d", d));
        }
        let numerator = engine.add(
            &engine.ln(&gap, Round::Up)?,
            &engine.mul(&one_minus_alpha, &self.rate, Round::Up),
            Round::Up,
        );
        Ok(engine.neg(&engine.div(&numerator, alpha, Round::Up)?))
    }

    /// Evaluates and requires `value > lowerbound`.
    pub fn certify(&self, region: &Region, record: &VerifyRecord) -> Result<Float, ExoError> {
        let value = self.evaluate(region, record)?;
        if value <= self.lowerbound {
            return Err(certification_error("C001", "certified value does not exceed lowerbound")
                .with_context("value", value.to_decimal_fixed(20, Round::Down))
                .with_context("lowerbound", &self.lowerbound));
        }
        Ok(value)
    }

    /// `D`, the minimum over vertex pairs of `Σ (q_x q_y)^(1 - alpha) beta`,
    /// rounded down.
    fn min_weighted_mass(
        &self,
        region: &Region,
        record: &VerifyRecord,
        one_minus_alpha: &Float,
    ) -> Result<Float, ExoError> {
        let engine = &self.engine;
        let x_vertices = extreme_points(region, Side::X)?;
        let y_vertices = extreme_points(region, Side::Y)?;
        let mut minimum: Option<Float> = None;
        for qx in &x_vertices {
            for qy in &y_vertices {
                let mut sum = Float::zero();
                for (cell, beta) in record.beta.iter().enumerate() {
                    let (fx, fy) = (qx[cell / 3], qy[cell % 3]);
                    if fx == 0 || fy == 0 || beta.is_zero() {
                        continue;
                    }
                    let q = Float::from_i64(fx * fy).mul_pow2(-2 * i64::from(FIXED_POINT_EXPONENT));
                    let log_q = engine.ln(&q, Round::Down)?;
                    let exponent = engine.mul(&log_q, one_minus_alpha, Round::Down);
                    let term = engine.mul(&engine.exp(&exponent, Round::Down)?, beta, Round::Down);
                    sum = engine.add(&sum, &term, Round::Down);
                }
                minimum = Some(match minimum {
                    Some(current) => engine.min(&current, &sum),
                    None => sum,
                });
            }
        }
        minimum.ok_or_else(|| {
            ExoError::Invariant(ErrorInfo::new("V002", "region has no extreme points"))
        })
    }
}

fn parse_unit_constant(engine: &Engine, name: &str, text: &str) -> Result<Float, ExoError> {
    let value = engine.parse(text)?;
    if !value.is_positive() || value.cmp_i64(1) != Ordering::Less {
        return Err(ExoError::Invariant(
            ErrorInfo::new("CFG010", "constant must lie strictly between 0 and 1")
                .with_context("name", name)
                .with_context("value", text),
        ));
    }
    Ok(value)
}
