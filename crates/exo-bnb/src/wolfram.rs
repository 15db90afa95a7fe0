//! Export of a proof script as Wolfram Language `verify` statements.
//!
//! Every leaf becomes one statement carrying its parameters and the joint
//! laws at all pairs of extreme points, all as exact fractions, so the
//! script can be re-checked in a computer algebra system.

use std::io::{BufRead, Write};

use exo_core::ExoError;
use exo_num::Float;
use tracing::info;

use crate::driver::{walk_script, RunSummary};
use crate::region::{Region, Side, FIXED_POINT_EXPONENT};
use crate::script::{ScriptReader, VerifyRecord};
use crate::vertices::{extreme_points, Vertex};

/// Last line of every export.
pub const WOLFRAM_TRAILER: &str = "Print[\"finish\"];";

/// Renders the `verify[...]` statement for one tightened leaf.
///
/// The third argument lists, for each X vertex and then each Y vertex in
/// ascending order, the nine products `qx[i] * qy[j]` in row-major order.
pub fn leaf_statement(region: &Region, record: &VerifyRecord) -> Result<String, ExoError> {
    let xs = extreme_points(region, Side::X)?;
    let ys = extreme_points(region, Side::Y)?;
    let mut laws = Vec::with_capacity(xs.len() * ys.len());
    for qx in &xs {
        for qy in &ys {
            laws.push(joint_law(qx, qy));
        }
    }
    let betas: Vec<String> = record.beta.iter().map(Float::to_fraction_string).collect();
    Ok(format!(
        "verify[{},\n{{{{{}}}}},\n{{{{{}}}}}];\n\n",
        record.alpha.to_fraction_string(),
        betas.join("},\n{"),
        laws.join("},\n{"),
    ))
}

fn joint_law(qx: &Vertex, qy: &Vertex) -> String {
    let mut cells = Vec::with_capacity(9);
    for x in qx {
        for y in qy {
            let cell = Float::from_i64(x * y).mul_pow2(-2 * i64::from(FIXED_POINT_EXPONENT));
            cells.push(cell.to_fraction_string());
        }
    }
    cells.join(",")
}

/// Walks the script and writes one statement per leaf, then the trailer.
///
/// No leaf is evaluated; the traversal still enforces every structural and
/// script-format check.
pub fn export_wolfram<R: BufRead, W: Write>(
    script: &mut ScriptReader<R>,
    out: &mut W,
) -> Result<RunSummary, ExoError> {
    let summary = walk_script(script, |leaf| {
        let statement = leaf_statement(leaf.region, leaf.record)?;
        out.write_all(statement.as_bytes())?;
        Ok(())
    })?;
    writeln!(out, "{WOLFRAM_TRAILER}")?;
    out.flush()?;
    info!(
        regions = summary.regions,
        statements = summary.certified,
        "proof script exported"
    );
    Ok(summary)
}
