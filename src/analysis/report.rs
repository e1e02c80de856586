//! Report generation for a measurement run.
//!
//! Produces a machine-readable JSON report and a human-readable text report
//! from the computed metric points. Plot rendering is left to external
//! consumers of the JSON output.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use super::types::{MetricPoint, RunSummary};

/// Full analysis output for one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub points: Vec<MetricPoint>,
    pub summary: RunSummary,
}

/// Context captured alongside the metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub experiment: String,
    pub duration_secs: u64,
    pub capacity_mbit: f64,
    pub log_directory: String,
    pub analysis_timestamp: String,
}

impl AnalysisReport {
    pub fn new(
        experiment: &str,
        duration_secs: u64,
        capacity_mbit: f64,
        log_directory: &Path,
        points: Vec<MetricPoint>,
        summary: RunSummary,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                experiment: experiment.to_string(),
                duration_secs,
                capacity_mbit,
                log_directory: log_directory.display().to_string(),
                analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            },
            points,
            summary,
        }
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Render the human-readable text report.
pub fn render_text_report(report: &AnalysisReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(72));
    lines.push("              SHARED-LINK UTILIZATION AND FAIRNESS ANALYSIS".to_string());
    lines.push("=".repeat(72));
    lines.push(String::new());

    lines.push(format!("Analysis Date:  {}", report.metadata.analysis_timestamp));
    lines.push(format!("Experiment:     {}", report.metadata.experiment));
    lines.push(format!("Run Duration:   {} s", report.metadata.duration_secs));
    lines.push(format!("Link Capacity:  {} Mbits/sec", report.metadata.capacity_mbit));
    lines.push(format!("Log Directory:  {}", report.metadata.log_directory));
    lines.push(format!("Flows:          {}", report.summary.flow_count));
    lines.push(String::new());

    lines.push(format!(
        "{:>10}  {:>16}  {:>14}",
        "Time (s)", "Utilization (%)", "Fairness"
    ));
    for point in &report.points {
        lines.push(format!(
            "{:>10.1}  {:>16.1}  {:>14.3}",
            point.bucket.as_secs(),
            point.utilization_percent,
            point.fairness_index
        ));
    }
    lines.push(String::new());

    lines.push(format!(
        "Average link utilization: {:.1}%",
        report.summary.mean_utilization_percent
    ));
    lines.push(format!(
        "Average fairness index:   {:.3}",
        report.summary.mean_fairness_index
    ));
    lines.push(String::new());

    lines.join("\n")
}

/// Generate human-readable text report
pub fn generate_text_report(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}
