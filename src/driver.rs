//! Experiment driver.
//!
//! Starts the sink's listening role, fires off every generator's
//! bounded-duration traffic run without blocking between starts, waits at the
//! operator gate, then terminates everything and tears the fabric down.
//!
//! Generator starts are issued back-to-back with no synchronization barrier;
//! the resulting start-skew is bounded by the time to issue N commands and is
//! accepted by design (early time buckets are lower-confidence). A single
//! generator failing to start is logged and the run continues with fewer
//! flows. Teardown runs on every exit path, exactly once.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::{eyre, Context, Result};

use crate::analysis::log_file_name;
use crate::fabric::{BackgroundHandle, Fabric};
use crate::topology::StarTopology;

/// How the driver decides when to end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Hold the run open until the operator sends a line (or EOF) on stdin.
    Interactive,
    /// Sleep for the run duration plus a grace period, then terminate.
    Timed,
    /// Terminate right after dispatch. For plumbing checks and tests.
    Immediate,
}

/// Per-run driver options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Experiment name, encoded into every generator's log file name.
    pub experiment: String,
    /// Traffic run length handed to each generator.
    pub duration_secs: u64,
    /// Directory the generators write their log files into.
    pub working_dir: PathBuf,
    pub gate: Gate,
}

/// Extra time granted past the nominal duration before termination signals
/// go out, covering report flushing and slow generator exits.
const TIMED_GATE_GRACE: Duration = Duration::from_secs(2);

/// Ensures `Fabric::stop` runs exactly once on every exit path, including
/// unwinding.
struct TeardownGuard<'a> {
    fabric: &'a mut dyn Fabric,
    done: bool,
}

impl<'a> TeardownGuard<'a> {
    fn new(fabric: &'a mut dyn Fabric) -> Self {
        Self { fabric, done: false }
    }

    fn finish(mut self) -> Result<()> {
        self.done = true;
        self.fabric.stop().context("Fabric teardown failed")
    }
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = self.fabric.stop() {
                log::warn!("Fabric teardown during unwind failed: {}", e);
            }
        }
    }
}

/// Run one experiment against an already-declared topology.
///
/// Builds the topology on the fabric, starts it, drives the measurement, and
/// tears the fabric down regardless of how the run went.
pub fn run_experiment(
    fabric: &mut dyn Fabric,
    topology: &StarTopology,
    opts: &RunOptions,
) -> Result<()> {
    let built = topology.build(fabric)?;
    fabric.start().context("Failed to start fabric")?;

    let guard = TeardownGuard::new(fabric);

    let sink = guard
        .fabric
        .host(&built.sink_label)
        .ok_or_else(|| eyre!("sink host {} missing after fabric start", built.sink_label))?;
    let sink_addr = sink.address();

    // The sink's listening role starts once, before any generator.
    let mut sink_handle = sink
        .execute("iperf -s")
        .context("Failed to start sink listener")?;
    log::info!("Sink {} listening on {}", built.sink_label, sink_addr);

    // Fire-and-forget dispatch, no barrier between starts.
    let mut generator_handles: Vec<Box<dyn BackgroundHandle>> = Vec::new();
    for label in &built.generator_labels {
        let log_path = opts
            .working_dir
            .join(log_file_name(&opts.experiment, opts.duration_secs, label));
        let command = format!(
            "iperf -c {} -i 1 -t {} > {} 2>&1",
            sink_addr,
            opts.duration_secs,
            log_path.display()
        );

        let Some(host) = guard.fabric.host(label) else {
            log::warn!("Generator host {} missing, skipping", label);
            continue;
        };
        match host.execute(&command) {
            Ok(handle) => generator_handles.push(handle),
            Err(e) => {
                // The run continues with fewer flows.
                log::warn!("Failed to start generator on {}: {}", label, e);
            }
        }
    }
    log::info!(
        "Started {}/{} generators against {}",
        generator_handles.len(),
        built.generator_labels.len(),
        sink_addr
    );

    wait_at_gate(opts);

    // Termination signals go out before fabric teardown begins, generators
    // first, whether or not they exited naturally at the nominal duration.
    for handle in generator_handles.iter_mut() {
        if let Err(e) = handle.terminate() {
            log::warn!("Failed to terminate a generator: {}", e);
        }
    }
    if let Err(e) = sink_handle.terminate() {
        log::warn!("Failed to terminate sink listener: {}", e);
    }

    guard.finish()?;
    log::info!("Experiment '{}' complete", opts.experiment);
    Ok(())
}

fn wait_at_gate(opts: &RunOptions) {
    match opts.gate {
        Gate::Interactive => {
            log::info!(
                "Run in progress ({} s nominal). Press Enter to end the experiment.",
                opts.duration_secs
            );
            let mut line = String::new();
            // EOF or a read error ends the gate the same way a newline does;
            // teardown still follows.
            if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
                log::warn!("Stdin gate interrupted: {}", e);
            }
        }
        Gate::Timed => {
            let wait = Duration::from_secs(opts.duration_secs) + TIMED_GATE_GRACE;
            log::info!("Waiting {:?} for the run to finish", wait);
            std::thread::sleep(wait);
        }
        Gate::Immediate => {}
    }
}
