//! Target strength sweep runner
//!
//! Loads a JSON sweep configuration, solves it and writes the shaped output
//! as JSON.
//!
//! Usage:
//!   cargo run --release --bin ts-sweep -- --config sweep.json
//!   cargo run --release --bin ts-sweep -- --config sweep.json --parallel --threads 8

use anyhow::Context;
use clap::Parser;
use math_echo_sweep::{ExecutionMode, SweepConfig, SweepOutput};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ts-sweep")]
#[command(about = "Acoustic target strength over a parameter sweep", long_about = None)]
struct Args {
    /// Path to JSON sweep configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Output JSON file path (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run on a worker pool regardless of the configuration
    #[arg(short, long)]
    parallel: bool,

    /// Number of workers in parallel mode (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = SweepConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.parallel {
        config.execution.mode = ExecutionMode::Parallel;
    }
    if args.threads.is_some() {
        config.execution.workers = args.threads;
    }

    let result = config.run()?;
    let failures: Vec<_> = result
        .results
        .failures()
        .map(|(row, err)| json!({ "row": row, "error": err.to_string() }))
        .collect();
    let ts = match &result.output {
        SweepOutput::Scalar(ts) => json!(ts),
        SweepOutput::Series(values) => json!(values),
        SweepOutput::Table(table) => serde_json::to_value(table)?,
        SweepOutput::Grid(grid) => serde_json::to_value(grid)?,
    };
    let report = json!({
        "model": config.model,
        "rows": result.results.len(),
        "ts": ts,
        "failures": failures,
        "unconverged_rows": result.results.unconverged_rows(),
    });
    let text = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Wrote {} rows ({} failed) to {}",
                result.results.len(),
                result.results.failure_count(),
                path.display()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}
