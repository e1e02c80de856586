//! Star topology construction.
//!
//! One switch, one sink, N generators, one link per host to the switch. The
//! total declared generator capacity is allowed to exceed the sink link's
//! capacity: that oversubscription is what utilization and fairness measure.

use color_eyre::eyre::{Context, Result};

use super::types::LinkProfile;
use crate::fabric::Fabric;

/// Declarative description of the experiment's star network.
#[derive(Debug, Clone, PartialEq)]
pub struct StarTopology {
    /// Number of generator hosts (h2..h{N+1}).
    pub generator_count: usize,
    /// Profile of the sink's link; may differ from the generators'.
    pub sink_link: LinkProfile,
    /// Profile shared by every generator link.
    pub generator_link: LinkProfile,
}

impl Default for StarTopology {
    fn default() -> Self {
        Self {
            generator_count: 50,
            sink_link: LinkProfile::default_sink(),
            generator_link: LinkProfile::default_generator(),
        }
    }
}

/// Labels of the hosts a build declared.
#[derive(Debug, Clone)]
pub struct BuiltTopology {
    pub sink_label: String,
    pub generator_labels: Vec<String>,
}

impl StarTopology {
    pub const SWITCH_LABEL: &'static str = "s1";
    pub const SINK_LABEL: &'static str = "h1";

    /// Declare the topology on the given fabric.
    ///
    /// Fails fatally on any fabric error (including label collisions with
    /// pre-existing nodes); nothing has been started at that point.
    pub fn build(&self, fabric: &mut dyn Fabric) -> Result<BuiltTopology> {
        fabric
            .create_switch(Self::SWITCH_LABEL)
            .context("Failed to create shared switch")?;

        fabric
            .create_host(Self::SINK_LABEL)
            .context("Failed to create sink host")?;
        fabric
            .create_link(Self::SINK_LABEL, Self::SWITCH_LABEL, &self.sink_link)
            .context("Failed to create sink link")?;

        let mut generator_labels = Vec::with_capacity(self.generator_count);
        for i in 0..self.generator_count {
            let label = format!("h{}", i + 2);
            fabric
                .create_host(&label)
                .with_context(|| format!("Failed to create generator host {}", label))?;
            fabric
                .create_link(&label, Self::SWITCH_LABEL, &self.generator_link)
                .with_context(|| format!("Failed to create link for {}", label))?;
            generator_labels.push(label);
        }

        log::info!(
            "Declared star topology: 1 sink ({} Mbits/sec link), {} generators ({} Mbits/sec links)",
            self.sink_link.capacity_mbit,
            self.generator_count,
            self.generator_link.capacity_mbit
        );

        Ok(BuiltTopology {
            sink_label: Self::SINK_LABEL.to_string(),
            generator_labels,
        })
    }
}
