//! In-memory simulated fabric.
//!
//! Records every declaration, dispatch, and termination instead of touching
//! the network, and can inject dispatch failures per host. Exists so driver
//! semantics (non-blocking dispatch, termination-before-teardown, teardown
//! exactly once) are testable without an emulation substrate.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result};

use super::{BackgroundHandle, Fabric, FabricHost};
use crate::topology::LinkProfile;

/// Shared observation log, inspected by tests after a run.
#[derive(Debug, Default)]
pub struct SimLog {
    /// Commands dispatched, as (host label, command line).
    pub commands: Vec<(String, String)>,
    /// Labels whose handles have been terminated, in termination order.
    pub terminated: Vec<String>,
    /// Number of times `stop()` was called.
    pub stop_calls: usize,
    /// Declared links as (a, b, capacity in Mbits/sec).
    pub links: Vec<(String, String, f64)>,
}

#[derive(Debug)]
struct SimHost {
    label: String,
    address: IpAddr,
    fail_dispatch: bool,
    log: Arc<Mutex<SimLog>>,
}

impl FabricHost for SimHost {
    fn label(&self) -> &str {
        &self.label
    }

    fn address(&self) -> IpAddr {
        self.address
    }

    fn execute(&self, command: &str) -> Result<Box<dyn BackgroundHandle>> {
        if self.fail_dispatch {
            return Err(eyre!("simulated dispatch failure on {}", self.label));
        }
        self.log
            .lock()
            .unwrap()
            .commands
            .push((self.label.clone(), command.to_string()));
        Ok(Box::new(SimHandle {
            label: self.label.clone(),
            terminated: false,
            log: Arc::clone(&self.log),
        }))
    }
}

struct SimHandle {
    label: String,
    terminated: bool,
    log: Arc<Mutex<SimLog>>,
}

impl BackgroundHandle for SimHandle {
    fn terminate(&mut self) -> Result<()> {
        if !self.terminated {
            self.terminated = true;
            self.log.lock().unwrap().terminated.push(self.label.clone());
        }
        Ok(())
    }
}

/// Simulated fabric for tests.
#[derive(Default)]
pub struct SimFabric {
    hosts: HashMap<String, SimHost>,
    switches: Vec<String>,
    next_host_octet: u8,
    started: bool,
    stopped: bool,
    log: Arc<Mutex<SimLog>>,
}

impl SimFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `execute` on the given host fail.
    pub fn fail_dispatch_for(&mut self, label: &str) {
        if let Some(host) = self.hosts.get_mut(label) {
            host.fail_dispatch = true;
        }
    }

    /// Handle to the observation log.
    pub fn log(&self) -> Arc<Mutex<SimLog>> {
        Arc::clone(&self.log)
    }
}

impl Fabric for SimFabric {
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
        self.next_host_octet = self
            .next_host_octet
            .checked_add(1)
            .ok_or_else(|| eyre!("simulated subnet exhausted"))?;
        self.hosts.insert(
            label.to_string(),
            SimHost {
                label: label.to_string(),
                address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, self.next_host_octet)),
                fail_dispatch: false,
                log: Arc::clone(&self.log),
            },
        );
        Ok(())
    }

    fn create_link(&mut self, a: &str, b: &str, profile: &LinkProfile) -> Result<()> {
        let known = |l: &str| self.hosts.contains_key(l) || self.switches.iter().any(|s| s == l);
        if !known(a) || !known(b) {
            return Err(eyre!("link references unknown node: {} <-> {}", a, b));
        }
        self.log
            .lock()
            .unwrap()
            .links
            .push((a.to_string(), b.to_string(), profile.capacity_mbit));
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.lock().unwrap().stop_calls += 1;
        self.stopped = true;
        Ok(())
    }

    fn host(&self, label: &str) -> Option<&dyn FabricHost> {
        self.hosts.get(label).map(|h| h as &dyn FabricHost)
    }
}
