//! Capability boundary to the network-emulation substrate.
//!
//! The experiment driver never talks to an emulator directly; it depends on
//! the [`Fabric`] trait, which declares hosts, links to the shared switch,
//! and background command execution on hosts. The substrate that actually
//! enforces capacity, delay, and loss lives behind an adapter implementing
//! these traits.
//!
//! Two adapters ship with the crate: [`SimFabric`], an in-memory fabric for
//! tests, and [`LocalFabric`], which dispatches real OS processes on the
//! local machine without any emulation.

pub mod local;
pub mod sim;

use std::net::IpAddr;

use color_eyre::eyre::Result;

use crate::topology::LinkProfile;

pub use local::LocalFabric;
pub use sim::SimFabric;

/// A background process started on a fabric host.
///
/// Dropping a handle does not terminate the process; the driver terminates
/// every handle explicitly before fabric teardown.
pub trait BackgroundHandle: Send {
    /// Signal the process to stop. Safe to call more than once.
    fn terminate(&mut self) -> Result<()>;
}

/// A host inside the fabric.
pub trait FabricHost {
    fn label(&self) -> &str;

    /// The host's assigned address, fixed once the fabric has started.
    fn address(&self) -> IpAddr;

    /// Start a command on this host without waiting for it to finish.
    fn execute(&self, command: &str) -> Result<Box<dyn BackgroundHandle>>;
}

/// The network-emulation substrate.
///
/// Construction calls (`create_*`) are only valid before [`Fabric::start`];
/// [`Fabric::stop`] is idempotent and must succeed even if some hosts never
/// ran anything.
pub trait Fabric {
    /// Declare the shared switch all links attach to.
    fn create_switch(&mut self, label: &str) -> Result<()>;

    /// Declare a host. Fails on a duplicate label.
    fn create_host(&mut self, label: &str) -> Result<()>;

    /// Declare a link between two previously created nodes.
    fn create_link(&mut self, a: &str, b: &str, profile: &LinkProfile) -> Result<()>;

    /// Bring the declared network up.
    fn start(&mut self) -> Result<()>;

    /// Tear the network down. Idempotent.
    fn stop(&mut self) -> Result<()>;

    /// Look up a host by label once the fabric is up.
    fn host(&self, label: &str) -> Option<&dyn FabricHost>;
}
