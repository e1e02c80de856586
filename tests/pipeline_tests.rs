//! End-to-end pipeline tests: generator logs on disk through ingestion,
//! metrics, and report generation.

use std::fs;
use std::path::Path;

use fairlink::analysis::{
    generate_json_report, generate_text_report, log_file_name, metric_points,
    parse_experiment_logs, summarize, AnalysisReport, TimeBucket,
};

const EXPERIMENT: &str = "HighDelay";
const DURATION: u64 = 60;

fn write_log(dir: &Path, label: &str, content: &str) {
    let path = dir.join(log_file_name(EXPERIMENT, DURATION, label));
    fs::write(path, content).unwrap();
}

#[test]
fn test_two_flow_scenario_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();

    // Two generators against a 10 Mbits/sec bottleneck: equal shares at t=1,
    // a skewed 8/2 split at t=2.
    write_log(
        dir.path(),
        "h2",
        "\
------------------------------------------------------------
Client connecting to 10.0.0.1, TCP port 5001
------------------------------------------------------------
[  3]  0.0- 1.0 sec   640 KBytes  5.00 Mbits/sec
[  3]  1.0- 2.0 sec  1.00 MBytes  8.00 Mbits/sec
",
    );
    write_log(
        dir.path(),
        "h3",
        "\
[  3]  0.0- 1.0 sec   640 KBytes  5.00 Mbits/sec
[  3]  1.0- 2.0 sec   256 KBytes  2.00 Mbits/sec
",
    );

    let series = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();
    assert_eq!(series.flow_count(), 2);

    let points = metric_points(&series, 10.0);
    assert_eq!(points.len(), 2);

    assert_eq!(points[0].bucket, TimeBucket::from_secs(1.0));
    assert_eq!(points[0].utilization_percent, 100.0);
    assert_eq!(points[0].fairness_index, 1.0);

    assert_eq!(points[1].bucket, TimeBucket::from_secs(2.0));
    assert_eq!(points[1].utilization_percent, 100.0);
    assert!((points[1].fairness_index - 100.0 / 136.0).abs() < 1e-9);

    let summary = summarize(&points, series.flow_count());
    assert_eq!(summary.mean_utilization_percent, 100.0);
    assert_eq!(summary.bucket_count, 2);
    assert_eq!(summary.flow_count, 2);
}

#[test]
fn test_noisy_and_missing_logs_degrade_to_missing_data() {
    let dir = tempfile::tempdir().unwrap();

    write_log(
        dir.path(),
        "h2",
        "[  3]  0.0- 1.0 sec  1.25 MBytes  10.0 Mbits/sec\n",
    );
    // A generator that never connected leaves only noise.
    write_log(dir.path(), "h3", "read failed: Connection refused\n");
    // And one that never started leaves an empty file.
    write_log(dir.path(), "h4", "");
    // Unrelated files in the directory are ignored.
    fs::write(dir.path().join("notes.txt"), "scratch").unwrap();
    fs::write(
        dir.path().join("OtherRun_60_iperf_h2.log"),
        "[  3]  0.0- 1.0 sec  9.99 MBytes  99.9 Mbits/sec\n",
    )
    .unwrap();

    let series = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();

    // Only h2 contributes; h3 and h4 are absent, not errors.
    assert_eq!(series.flow_count(), 1);
    let records = series.records_for("h2").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bandwidth_mbit, 10.0);
}

#[test]
fn test_reparsing_yields_identical_series() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "h2",
        "\
[  3]  0.0- 1.0 sec   512 KBytes   4194 Kbits/sec
[  3]  1.0- 2.0 sec  1.25 MBytes  10.5 Mbits/sec
",
    );

    let first = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();
    let second = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();

    assert_eq!(first.records_for("h2"), second.records_for("h2"));
}

#[test]
fn test_trailing_records_trimmed_at_duration() {
    let dir = tempfile::tempdir().unwrap();
    write_log(
        dir.path(),
        "h2",
        "\
[  3]  59.0-60.0 sec  1.25 MBytes  10.5 Mbits/sec
[  3]  60.0-61.0 sec   128 KBytes  1.05 Mbits/sec
",
    );

    let mut series = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();
    series.truncate_after(DURATION as f64);

    let records = series.records_for("h2").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].interval_end, 60.0);
}

#[test]
fn test_reports_written_for_empty_run() {
    let dir = tempfile::tempdir().unwrap();

    let series = parse_experiment_logs(dir.path(), EXPERIMENT, DURATION).unwrap();
    assert!(series.is_empty());

    let points = metric_points(&series, 500.0);
    let summary = summarize(&points, 0);
    assert_eq!(summary.mean_fairness_index, 0.0);

    let report = AnalysisReport::new(EXPERIMENT, DURATION, 500.0, dir.path(), points, summary);
    let json_path = dir.path().join("analysis.json");
    let text_path = dir.path().join("analysis.txt");
    generate_json_report(&report, &json_path).unwrap();
    generate_text_report(&report, &text_path).unwrap();

    let json = fs::read_to_string(&json_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["summary"]["bucket_count"], 0);
    assert!(fs::read_to_string(&text_path)
        .unwrap()
        .contains("Average fairness index:   0.000"));
}
