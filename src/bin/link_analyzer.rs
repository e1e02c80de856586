//! Analyze the generator logs of a finished experiment run.
//!
//! Parses every log matching the run's naming convention, computes per-bucket
//! link utilization and Jain's Fairness Index, and writes JSON and text
//! reports.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;

use fairlink::analysis::{
    generate_json_report, generate_text_report, metric_points, parse_experiment_logs, summarize,
    AnalysisReport,
};

/// Compute utilization and fairness metrics from generator logs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the generator log files
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Experiment name the logs were recorded under
    #[arg(short, long)]
    experiment: String,

    /// Run duration in seconds, as encoded in the log file names
    #[arg(short = 't', long)]
    duration: u64,

    /// Shared link capacity in Mbits/sec (the sink link's capacity)
    #[arg(long)]
    capacity: f64,

    /// Keep records reported past the nominal duration instead of trimming
    /// them
    #[arg(long)]
    keep_trailing: bool,

    /// Output path for the JSON report
    #[arg(long, default_value = "analysis.json")]
    json_output: PathBuf,

    /// Output path for the text report
    #[arg(long, default_value = "analysis.txt")]
    text_output: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if args.capacity <= 0.0 {
        color_eyre::eyre::bail!("--capacity must be positive (got {})", args.capacity);
    }

    info!(
        "Analyzing '{}' ({} s) in {}",
        args.experiment,
        args.duration,
        args.directory.display()
    );

    let mut series = parse_experiment_logs(&args.directory, &args.experiment, args.duration)
        .wrap_err("Failed to ingest experiment logs")?;
    if !args.keep_trailing {
        series.truncate_after(args.duration as f64);
    }

    if series.is_empty() {
        log::warn!("No report lines found; the reports will be empty");
    }

    let points = metric_points(&series, args.capacity);
    let summary = summarize(&points, series.flow_count());

    info!(
        "Average link utilization: {:.1}%",
        summary.mean_utilization_percent
    );
    info!("Average fairness index: {:.3}", summary.mean_fairness_index);

    let report = AnalysisReport::new(
        &args.experiment,
        args.duration,
        args.capacity,
        &args.directory,
        points,
        summary,
    );
    generate_json_report(&report, &args.json_output)?;
    generate_text_report(&report, &args.text_output)?;

    Ok(())
}
