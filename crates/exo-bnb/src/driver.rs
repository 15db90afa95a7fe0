//! Depth-first traversal of the proof script over an explicit region stack.

use std::io::{BufRead, Write};

use exo_core::{ExoError, COMPLETION_MARKER};
use exo_num::{Float, Round};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::evaluator::BoundEvaluator;
use crate::region::Region;
use crate::script::{ProofRecord, ScriptReader, VerifyRecord};

/// Fractional digits printed for each certified value.
pub const OUTPUT_DIGITS: usize = 20;

/// Checks one leaf and returns its certified value.
pub trait LeafCertifier {
    /// Certifies `region` with the parameters of `record`.
    fn certify_leaf(&mut self, region: &Region, record: &VerifyRecord) -> Result<Float, ExoError>;
}

impl LeafCertifier for BoundEvaluator {
    fn certify_leaf(&mut self, region: &Region, record: &VerifyRecord) -> Result<Float, ExoError> {
        self.certify(region, record)
    }
}

/// Counters collected over one complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Regions popped from the stack.
    pub regions: u64,
    /// Split records applied.
    pub splits: u64,
    /// Leaves reached; each was certified or exported.
    pub certified: u64,
    /// Largest number of pending regions seen.
    pub peak_stack_depth: usize,
    /// Smallest certified value, rounded down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_bound: Option<String>,
    /// Non-empty lines left after the last region.
    pub trailing_records: usize,
}

/// Owns the pending-region stack and dispatches script records.
#[derive(Debug)]
pub struct Driver<C> {
    certifier: C,
}

impl<C: LeafCertifier> Driver<C> {
    /// Wraps a leaf certifier.
    pub fn new(certifier: C) -> Self {
        Self { certifier }
    }

    /// Borrows the certifier.
    pub fn certifier(&self) -> &C {
        &self.certifier
    }

    /// Runs the script from the unit region until no region remains.
    ///
    /// Each certified value is written on its own line, followed by the
    /// completion marker. The first failure stops the run and no marker is
    /// written.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        script: &mut ScriptReader<R>,
        out: &mut W,
    ) -> Result<RunSummary, ExoError> {
        let mut weakest: Option<Float> = None;
        let certifier = &mut self.certifier;
        let mut summary = walk_script(script, |leaf| {
            let value = certifier.certify_leaf(leaf.region, leaf.record)?;
            let rendered = value.to_decimal_fixed(OUTPUT_DIGITS, Round::Down);
            debug!(line = leaf.line, depth = leaf.depth, value = %rendered, "leaf certified");
            writeln!(out, "{rendered}")?;
            if weakest.as_ref().map_or(true, |current| value < *current) {
                weakest = Some(value);
            }
            Ok(())
        })?;
        writeln!(out, "{COMPLETION_MARKER}")?;
        out.flush()?;

        summary.weakest_bound =
            weakest.map(|value| value.to_decimal_fixed(OUTPUT_DIGITS, Round::Down));
        info!(
            regions = summary.regions,
            splits = summary.splits,
            certified = summary.certified,
            peak_stack_depth = summary.peak_stack_depth,
            "proof script verified"
        );
        Ok(summary)
    }
}

/// A tightened leaf region together with the verify record that closes it.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    /// One-based script line of the verify record.
    pub line: usize,
    /// Regions still pending when the leaf was reached.
    pub depth: usize,
    /// The tightened region.
    pub region: &'a Region,
    /// Parameters read for the region.
    pub record: &'a VerifyRecord,
}

/// Replays the script's traversal from the unit region, handing every leaf
/// to `on_leaf` in script order.
///
/// Splits push the upper child first so the lower child is visited next.
/// Errors from `on_leaf` are tagged with the line of the verify record.
/// Records left after the last region are counted and logged, not rejected.
pub fn walk_script<R, F>(
    script: &mut ScriptReader<R>,
    mut on_leaf: F,
) -> Result<RunSummary, ExoError>
where
    R: BufRead,
    F: FnMut(Leaf<'_>) -> Result<(), ExoError>,
{
    let mut summary = RunSummary::default();
    let mut stack = vec![Region::unit()];
    summary.peak_stack_depth = stack.len();

    while let Some(region) = stack.pop() {
        summary.regions += 1;
        let region = region
            .tightened()
            .map_err(|err| err.with_context("line", script.line_number() + 1))?;
        match script.next_record()? {
            ProofRecord::Split(slot) => {
                let (lower, upper) = region
                    .split(slot)
                    .map_err(|err| err.with_context("line", script.line_number()))?;
                stack.push(upper);
                stack.push(lower);
                debug!(line = script.line_number(), depth = stack.len(), slot = %slot, "split");
                summary.splits += 1;
                summary.peak_stack_depth = summary.peak_stack_depth.max(stack.len());
            }
            ProofRecord::Verify(record) => {
                let line = script.line_number();
                let leaf = Leaf { line, depth: stack.len(), region: &region, record: &record };
                on_leaf(leaf).map_err(|err| err.with_context("line", line))?;
                summary.certified += 1;
            }
        }
    }

    summary.trailing_records = script.drain_remaining()?;
    if summary.trailing_records > 0 {
        warn!(
            records = summary.trailing_records,
            "proof script has records after the last region"
        );
    }
    Ok(summary)
}
