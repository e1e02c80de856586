//! Network topology module.
//!
//! Declarative description of the shared-bottleneck star network and its
//! construction against a fabric.

pub mod types;
pub mod star;

// Re-export key types for easier access
pub use types::{HostRole, LinkProfile};
pub use star::{BuiltTopology, StarTopology};
