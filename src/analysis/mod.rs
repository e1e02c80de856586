//! Measurement analysis for shared-link experiments.
//!
//! Turns the per-generator interval-report logs of a run into a normalized
//! time series and derives per-bucket link utilization and Jain's Fairness
//! Index from it.

pub mod types;
pub mod units;
pub mod log_parser;
pub mod metrics;
pub mod report;

pub use types::*;
pub use log_parser::{log_file_name, parse_experiment_logs, parse_log_file};
pub use metrics::{fairness, metric_points, summarize, utilization};
pub use report::{generate_json_report, generate_text_report, AnalysisReport};
