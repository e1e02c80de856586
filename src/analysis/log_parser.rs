//! Log ingestion for traffic-generator interval reports.
//!
//! Each generator writes a plain-text log, one line per reporting interval.
//! The format is noisy: banner lines, connection headers, and refused-
//! connection errors are interleaved with the report lines, and a generator
//! that never got going may leave an empty or missing file. Ingestion skips
//! everything that is not a report line and treats unreadable files as empty
//! rather than failing the analysis.
//!
//! Report-line grammar (whitespace-tokenized):
//!
//! ```text
//! ... <start>-<end> sec <value> <size-unit> <value> <rate-unit> ...
//! ```
//!
//! The `<start>-<end>` interval marker may arrive as one token (`0.0-60.0`)
//! or, for single-digit end times, split after the dash (`0.0-` `1.0`). A
//! line qualifies only if the marker is immediately followed by the `sec`
//! token; everything else is skipped silently.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use rayon::prelude::*;
use regex::Regex;

use super::types::{NormalizedRecord, TimeSeries};
use super::units::{normalize_rate, normalize_size};

/// The log file name a generator writes to, deterministically encoding the
/// experiment, run duration, and host label.
pub fn log_file_name(experiment: &str, duration_secs: u64, label: &str) -> String {
    format!("{}_{}_iperf_{}.log", experiment, duration_secs, label)
}

/// Regex matching log files produced for the given experiment and duration,
/// capturing the host label.
fn log_name_pattern(experiment: &str, duration_secs: u64) -> Regex {
    Regex::new(&format!(
        r"^{}_{}_iperf_(h\d+)\.log$",
        regex::escape(experiment),
        duration_secs
    ))
    .expect("Invalid log name pattern")
}

/// The interval marker and measured fields extracted from one report line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReportFields {
    interval_end: f64,
    transfer_mbytes: f64,
    bandwidth_mbit: f64,
}

/// Locate the interval marker among the tokens, returning the end time and
/// the index of the `sec` token.
///
/// Handles both the joined form (`0.0-60.0 sec`) and the split form the tool
/// emits for short end times (`0.0- 1.0 sec`).
fn find_interval_marker(tokens: &[&str]) -> Option<(f64, usize)> {
    for (i, token) in tokens.iter().enumerate() {
        let Some((start, rest)) = token.split_once('-') else {
            continue;
        };
        if start.parse::<f64>().is_err() {
            continue;
        }
        if rest.is_empty() {
            // Split form: end time is the next token, "sec" the one after.
            if let (Some(end_tok), Some(&"sec")) = (tokens.get(i + 1), tokens.get(i + 2)) {
                if let Ok(end) = end_tok.parse::<f64>() {
                    return Some((end, i + 2));
                }
            }
        } else if tokens.get(i + 1) == Some(&"sec") {
            if let Ok(end) = rest.parse::<f64>() {
                return Some((end, i + 1));
            }
        }
    }
    None
}

/// Parse a single line against the report grammar.
///
/// Returns `None` for any line that does not fully match; callers skip those.
fn parse_report_line(line: &str) -> Option<ReportFields> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (interval_end, sec_idx) = find_interval_marker(&tokens)?;

    let transfer_value: f64 = tokens.get(sec_idx + 1)?.parse().ok()?;
    let transfer_mbytes = normalize_size(transfer_value, tokens.get(sec_idx + 2)?)?;

    let bandwidth_value: f64 = tokens.get(sec_idx + 3)?.parse().ok()?;
    let bandwidth_mbit = normalize_rate(bandwidth_value, tokens.get(sec_idx + 4)?)?;

    Some(ReportFields {
        interval_end,
        transfer_mbytes,
        bandwidth_mbit,
    })
}

/// Parse one generator's report stream into normalized records.
///
/// Non-matching lines are skipped; an empty stream yields an empty sequence.
pub fn parse_reader<R: BufRead>(reader: R, label: &str) -> Vec<NormalizedRecord> {
    let mut records = Vec::new();

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => continue, // Skip undecodable lines
        };

        if let Some(fields) = parse_report_line(&line) {
            records.push(NormalizedRecord {
                label: label.to_string(),
                interval_end: fields.interval_end,
                transfer_mbytes: fields.transfer_mbytes,
                bandwidth_mbit: fields.bandwidth_mbit,
            });
        }
    }

    records
}

/// Parse a single generator log file.
pub fn parse_log_file(path: &Path, label: &str) -> Result<Vec<NormalizedRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    let reader = BufReader::with_capacity(64 * 1024, file);
    Ok(parse_reader(reader, label))
}

/// Parse every generator log of an experiment run into one time series.
///
/// Files are discovered by the naming convention and parsed in parallel;
/// results are merged by label afterwards, so parse order does not matter.
/// A file that cannot be read contributes zero records: partial data
/// collection is the expected steady state of this kind of run.
pub fn parse_experiment_logs(dir: &Path, experiment: &str, duration_secs: u64) -> Result<TimeSeries> {
    let pattern = log_name_pattern(experiment, duration_secs);

    let mut log_files: Vec<(String, std::path::PathBuf)> = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(caps) = pattern.captures(name) {
            log_files.push((caps[1].to_string(), entry.path()));
        }
    }
    log_files.sort();

    log::info!("Parsing {} generator logs in parallel...", log_files.len());

    let parsed: Vec<(String, Vec<NormalizedRecord>)> = log_files
        .par_iter()
        .filter_map(|(label, path)| match parse_log_file(path, label) {
            Ok(records) => {
                log::debug!("Parsed {}: {} records", path.display(), records.len());
                Some((label.clone(), records))
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let mut series = TimeSeries::new();
    for (label, records) in parsed {
        if records.is_empty() {
            // A generator that never produced output is absent from the
            // analysis, not an error.
            log::debug!("No report lines for {}", label);
            continue;
        }
        series.insert(label, records);
    }

    log::info!(
        "Parsed {} flows, {} time buckets",
        series.flow_count(),
        series.buckets().len()
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE_LOG: &str = "\
------------------------------------------------------------
Client connecting to 10.0.0.1, TCP port 5001
TCP window size: 85.3 KByte (default)
------------------------------------------------------------
[  3] local 10.0.0.2 port 43210 connected with 10.0.0.1 port 5001
[ ID] Interval       Transfer     Bandwidth
[  3]  0.0- 1.0 sec   640 KBytes  5.24 Mbits/sec
[  3]  1.0- 2.0 sec  1.25 MBytes  10.5 Mbits/sec
[  3]  2.0- 3.0 sec   512 KBytes   4194 Kbits/sec
read failed: Connection refused
[  3]  0.0-60.0 sec  75.1 MBytes  10.5 Mbits/sec
";

    #[test]
    fn test_parse_report_line_joined_marker() {
        let fields = parse_report_line("[  3]  0.0-60.0 sec  75.1 MBytes  10.5 Mbits/sec").unwrap();
        assert_eq!(fields.interval_end, 60.0);
        assert_eq!(fields.transfer_mbytes, 75.1);
        assert_eq!(fields.bandwidth_mbit, 10.5);
    }

    #[test]
    fn test_parse_report_line_split_marker() {
        let fields = parse_report_line("[  3]  0.0- 1.0 sec   640 KBytes  5.24 Mbits/sec").unwrap();
        assert_eq!(fields.interval_end, 1.0);
        assert!((fields.transfer_mbytes - 640.0 / 1024.0).abs() < 1e-9);
        assert_eq!(fields.bandwidth_mbit, 5.24);
    }

    #[test]
    fn test_parse_report_line_normalizes_kbits() {
        let fields = parse_report_line("[  3]  2.0- 3.0 sec   512 KBytes   4194 Kbits/sec").unwrap();
        assert!((fields.bandwidth_mbit - 4.194).abs() < 1e-9);
    }

    #[test]
    fn test_non_report_lines_are_skipped() {
        assert!(parse_report_line("[ ID] Interval       Transfer     Bandwidth").is_none());
        assert!(parse_report_line("read failed: Connection refused").is_none());
        assert!(parse_report_line("").is_none());
        // Marker present but fields missing
        assert!(parse_report_line("[  3]  0.0- 1.0 sec").is_none());
        // Unknown unit tag
        assert!(parse_report_line("[  3]  0.0- 1.0 sec  1.0 MBytes  1.0 MPackets/sec").is_none());
    }

    #[test]
    fn test_parse_reader_skips_noise() {
        let records = parse_reader(Cursor::new(SAMPLE_LOG), "h2");
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.label == "h2"));
        assert_eq!(records[0].interval_end, 1.0);
        assert_eq!(records[3].interval_end, 60.0);
    }

    #[test]
    fn test_parse_reader_is_idempotent() {
        let first = parse_reader(Cursor::new(SAMPLE_LOG), "h2");
        let second = parse_reader(Cursor::new(SAMPLE_LOG), "h2");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_reader_empty_input() {
        let records = parse_reader(Cursor::new(""), "h2");
        assert!(records.is_empty());
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name("HighDelay", 60, "h7"), "HighDelay_60_iperf_h7.log");
    }

    #[test]
    fn test_log_name_pattern() {
        let pattern = log_name_pattern("HighDelay", 60);
        let caps = pattern.captures("HighDelay_60_iperf_h23.log").unwrap();
        assert_eq!(&caps[1], "h23");
        assert!(pattern.captures("HighDelay_30_iperf_h2.log").is_none());
        assert!(pattern.captures("OtherRun_60_iperf_h2.log").is_none());
        assert!(pattern.captures("HighDelay_60_iperf_h2.log.bak").is_none());
    }
}
