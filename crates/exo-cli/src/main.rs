use std::error::Error;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use exo_bnb::{export_wolfram, BoundEvaluator, Driver, ScriptReader};
use exo_core::{DivergenceConfig, ExoError, InputProvenance, VerifierConfig};
use exo_div::DivergenceChecker;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod report;

use report::{write_json, LowerboundReport, UpperboundReport};

#[derive(Parser, Debug)]
#[command(name = "exo", about = "Certificate checkers for the error-exponent bounds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify the branch-and-bound proof script for the lower bound.
    Lowerbound(LowerboundArgs),
    /// Check the shipped distributions for the upper bound.
    Upperbound(UpperboundArgs),
    /// Rewrite the proof script as Wolfram Language `verify` statements.
    ExportWl(ExportWlArgs),
}

#[derive(ClapArgs, Debug)]
struct LowerboundArgs {
    /// Proof script to verify.
    #[arg(long, default_value = "input.txt")]
    script: PathBuf,
    /// Write a JSON run report here after a successful run.
    #[arg(long)]
    json_report: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct UpperboundArgs {
    /// Write a JSON run report here after a successful run.
    #[arg(long)]
    json_report: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ExportWlArgs {
    /// Proof script to export.
    #[arg(long, default_value = "input.txt")]
    script: PathBuf,
    /// Destination of the statements.
    #[arg(long, default_value = "input.wl")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Lowerbound(args) => run_lowerbound(&args),
        Command::Upperbound(args) => run_upperbound(&args),
        Command::ExportWl(args) => run_export_wl(&args),
    }
}

fn run_lowerbound(args: &LowerboundArgs) -> Result<(), Box<dyn Error>> {
    let config = VerifierConfig::default();
    let evaluator = BoundEvaluator::new(&config).map_err(report_failure)?;
    let mut script = ScriptReader::open(&args.script).map_err(report_failure)?;
    info!(script = %args.script.display(), precision = config.precision, "verifying proof script");

    let mut out = io::stdout().lock();
    let summary = Driver::new(evaluator)
        .run(&mut script, &mut out)
        .map_err(report_failure)?;

    if let Some(path) = &args.json_report {
        let bytes = fs::read(&args.script)?;
        let report = LowerboundReport {
            command: "lowerbound",
            config: &config,
            script: InputProvenance::from_bytes(args.script.display().to_string(), &bytes),
            summary,
        };
        write_json(path, &report)?;
        info!(path = %path.display(), "run report written");
    }
    Ok(())
}

fn run_upperbound(args: &UpperboundArgs) -> Result<(), Box<dyn Error>> {
    let config = DivergenceConfig::default();
    let checker = DivergenceChecker::new(&config).map_err(report_failure)?;
    info!(cases = config.cases.len(), precision = config.precision, "checking divergences");

    let mut out = io::stdout().lock();
    let cases = checker.run(&config.cases, &mut out).map_err(report_failure)?;

    if let Some(path) = &args.json_report {
        let report = UpperboundReport {
            command: "upperbound",
            config: &config,
            cases,
        };
        write_json(path, &report)?;
        info!(path = %path.display(), "run report written");
    }
    Ok(())
}

fn run_export_wl(args: &ExportWlArgs) -> Result<(), Box<dyn Error>> {
    let mut script = ScriptReader::open(&args.script).map_err(report_failure)?;
    let file = fs::File::create(&args.out).map_err(|err| report_failure(err.into()))?;
    info!(script = %args.script.display(), out = %args.out.display(), "exporting proof script");

    let mut out = BufWriter::new(file);
    export_wolfram(&mut script, &mut out).map_err(report_failure)?;
    Ok(())
}

/// Logs a fatal check failure with its class before it unwinds to `main`.
fn report_failure(err: ExoError) -> ExoError {
    error!(class = ?err.class(), code = %err.info().code, "{err}");
    err
}
