use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;

use fairlink::config::load_config;
use fairlink::driver::{run_experiment, Gate, RunOptions};
use fairlink::fabric::{LocalFabric, SimFabric};

/// Drive concurrent throughput tests across an emulated shared link
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the experiment configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Working directory for generator log files
    #[arg(short, long, default_value = ".")]
    working_dir: PathBuf,

    /// Fabric adapter to run against
    #[arg(long, value_enum, default_value_t = FabricKind::Local)]
    fabric: FabricKind,

    /// End the run after the nominal duration instead of waiting for the
    /// operator
    #[arg(long)]
    non_interactive: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FabricKind {
    /// Local OS processes, no emulation (requires an external substrate for
    /// meaningful shaping)
    Local,
    /// In-memory simulated fabric (plumbing dry run)
    Sim,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Loading experiment configuration from {:?}", args.config);
    let config = load_config(&args.config)?;

    std::fs::create_dir_all(&args.working_dir)
        .wrap_err_with(|| format!("Failed to create working directory '{}'", args.working_dir.display()))?;

    let topology = config.star_topology();
    let opts = RunOptions {
        experiment: config.experiment.name.clone(),
        duration_secs: config.duration_secs(),
        working_dir: args.working_dir.clone(),
        gate: if args.non_interactive {
            Gate::Timed
        } else {
            Gate::Interactive
        },
    };

    info!(
        "Starting experiment '{}': {} generators, {} s",
        opts.experiment, topology.generator_count, opts.duration_secs
    );

    match args.fabric {
        FabricKind::Local => {
            let mut fabric = LocalFabric::new();
            run_experiment(&mut fabric, &topology, &opts)?;
        }
        FabricKind::Sim => {
            let mut fabric = SimFabric::new();
            run_experiment(&mut fabric, &topology, &opts)?;
        }
    }

    info!(
        "Logs written to {}; analyze with: link-analyzer -d {} -e {} -t {} --capacity {}",
        args.working_dir.display(),
        args.working_dir.display(),
        opts.experiment,
        opts.duration_secs,
        topology.sink_link.capacity_mbit
    );
    Ok(())
}
