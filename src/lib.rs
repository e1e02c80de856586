//! # Fairlink - shared-bottleneck throughput experiments and fairness analysis
//!
//! This library drives many concurrent bounded-duration throughput tests
//! across one emulated shared link and derives per-time-bucket link
//! utilization and Jain's Fairness Index from the generators' interval
//! reports.
//!
//! ## Architecture
//!
//! - `config`: experiment configuration structures and YAML parsing
//! - `topology`: declarative star topology (one sink, N generators, one
//!   shared switch) and its construction against a fabric
//! - `fabric`: capability boundary to the network-emulation substrate, with
//!   a simulated adapter for tests and a local-process adapter
//! - `driver`: starts the sink and all generators, waits at the operator
//!   gate, terminates everything, and guarantees fabric teardown
//! - `analysis`: log ingestion, unit normalization, the metrics engine, and
//!   report generation
//!
//! The emulation substrate itself (hosts, links, enforced capacity/delay/
//! loss) and the traffic-generation tool are external collaborators: the
//! driver only depends on the `fabric` traits and on the generators'
//! interval-report log format.
//!
//! ## Measurement model
//!
//! Records from different generators are aligned by the reported interval
//! end, not by wall clock. Generator starts are issued back-to-back without
//! a barrier, so a small start-skew leaks into the bucket alignment; early
//! buckets are lower-confidence by design.
//!
//! ## Error Handling
//!
//! The library uses `color_eyre` for error reporting with context. Fabric
//! errors abort a run; individual generator dispatch failures and unreadable
//! log files degrade to missing data instead of propagating.

pub mod analysis;
pub mod config;
pub mod driver;
pub mod fabric;
pub mod topology;
