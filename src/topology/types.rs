//! Topology type definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shaping profile of a single link to the shared switch.
///
/// Immutable once the fabric is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkProfile {
    /// Link capacity in Mbits/sec.
    pub capacity_mbit: f64,
    /// One-way delay.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Loss probability in percent.
    pub loss_percent: f64,
}

impl LinkProfile {
    /// Default sink-side link: the asymmetric bottleneck toward the
    /// measurement point.
    pub fn default_sink() -> Self {
        Self {
            capacity_mbit: 500.0,
            delay: Duration::from_millis(2),
            loss_percent: 0.1,
        }
    }

    /// Default generator-side link, shared by all generators.
    pub fn default_generator() -> Self {
        Self {
            capacity_mbit: 10.0,
            delay: Duration::from_micros(500),
            loss_percent: 0.1,
        }
    }
}

impl Default for LinkProfile {
    fn default() -> Self {
        Self::default_generator()
    }
}

/// Role of a host in the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostRole {
    /// Terminates all generator traffic; the measurement reference point.
    Sink,
    /// Produces bounded-duration traffic toward the sink.
    Generator,
}

impl HostRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostRole::Sink => "sink",
            HostRole::Generator => "generator",
        }
    }
}
