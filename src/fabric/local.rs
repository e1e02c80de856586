//! Local-process fabric adapter.
//!
//! Dispatches host commands as real OS processes on the local machine via
//! `sh -c`. It performs no network emulation — every "host" resolves to
//! loopback and links are accepted but not enforced — so it is only useful
//! when an external substrate supplies the actual capacity/delay/loss
//! enforcement, or for plumbing smoke runs.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::process::{Child, Command, Stdio};

use color_eyre::eyre::{eyre, Context, Result};

use super::{BackgroundHandle, Fabric, FabricHost};
use crate::topology::LinkProfile;

#[derive(Debug)]
struct LocalHost {
    label: String,
}

impl FabricHost for LocalHost {
    fn label(&self) -> &str {
        &self.label
    }

    fn address(&self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn execute(&self, command: &str) -> Result<Box<dyn BackgroundHandle>> {
        log::debug!("Running on {}: {}", self.label, command);
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn command on {}: {}", self.label, command))?;
        Ok(Box::new(LocalHandle { child: Some(child) }))
    }
}

struct LocalHandle {
    child: Option<Child>,
}

impl BackgroundHandle for LocalHandle {
    fn terminate(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            // The process may already have exited at its natural duration.
            if child.try_wait().context("Failed to poll child process")?.is_none() {
                child.kill().context("Failed to kill child process")?;
            }
            child.wait().context("Failed to reap child process")?;
        }
        Ok(())
    }
}

/// Fabric adapter that runs commands locally without emulation.
#[derive(Default)]
pub struct LocalFabric {
    hosts: HashMap<String, LocalHost>,
    switches: Vec<String>,
    started: bool,
}

impl LocalFabric {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fabric for LocalFabric {
    fn create_switch(&mut self, label: &str) -> Result<()> {
        if self.switches.iter().any(|s| s == label) || self.hosts.contains_key(label) {
            return Err(eyre!("duplicate node label: {}", label));
        }
        self.switches.push(label.to_string());
        Ok(())
    }

    fn create_host(&mut self, label: &str) -> Result<()> {
        if self.hosts.contains_key(label) || self.switches.iter().any(|s| s == label) {
            return Err(eyre!("duplicate node label: {}", label));
        }
        self.hosts.insert(
            label.to_string(),
            LocalHost {
                label: label.to_string(),
            },
        );
        Ok(())
    }

    fn create_link(&mut self, a: &str, b: &str, profile: &LinkProfile) -> Result<()> {
        // No enforcement locally; logged so an operator sees what the run
        // assumes about the substrate.
        log::debug!(
            "Link {} <-> {} ({} Mbits/sec, {:?} delay, {}% loss) not enforced by LocalFabric",
            a,
            b,
            profile.capacity_mbit,
            profile.delay,
            profile.loss_percent
        );
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        log::info!("LocalFabric up: {} hosts on loopback, no emulation", self.hosts.len());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn host(&self, label: &str) -> Option<&dyn FabricHost> {
        self.hosts.get(label).map(|h| h as &dyn FabricHost)
    }
}
