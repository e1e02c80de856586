//! Core data types for the measurement-and-analysis pipeline.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// A time bucket keyed on the interval-end time of a report line, quantized
/// to milliseconds so it can key ordered maps.
///
/// Buckets align records across flows by reported interval end, not by wall
/// clock. Flows started back-to-back carry a small start-skew into the same
/// bucket; early buckets are therefore lower-confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeBucket(u64);

impl TimeBucket {
    /// Quantize an interval-end time in seconds.
    pub fn from_secs(secs: f64) -> Self {
        TimeBucket((secs * 1000.0).round() as u64)
    }

    /// The bucket's interval-end time in seconds.
    pub fn as_secs(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.as_secs())
    }
}

/// One reporting interval from one generator, with size and rate already
/// converted to canonical units (MBytes, Mbits/sec).
///
/// Produced exclusively by log ingestion and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Generator label, e.g. "h7".
    pub label: String,
    /// End of the reporting window in seconds, monotonic within a run.
    pub interval_end: f64,
    /// Bytes transferred during the interval, in MBytes.
    pub transfer_mbytes: f64,
    /// Mean bandwidth over the interval, in Mbits/sec.
    pub bandwidth_mbit: f64,
}

impl NormalizedRecord {
    /// The time bucket this record falls into.
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::from_secs(self.interval_end)
    }
}

/// All normalized records of a run, grouped per generator label.
///
/// Each label's records are kept ordered by interval end. The series is the
/// sole input to the metrics engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    records: HashMap<String, Vec<NormalizedRecord>>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one generator's records, keeping the per-label ordering.
    pub fn insert(&mut self, label: String, mut records: Vec<NormalizedRecord>) {
        records.sort_by(|a, b| {
            a.interval_end
                .partial_cmp(&b.interval_end)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.records.entry(label).or_default().extend(records);
    }

    /// Drop all records past the given interval-end time.
    ///
    /// Generators keep reporting slightly past the nominal run length; the
    /// analyzer trims those trailing buckets.
    pub fn truncate_after(&mut self, cutoff_secs: f64) {
        for records in self.records.values_mut() {
            records.retain(|r| r.interval_end <= cutoff_secs);
        }
        self.records.retain(|_, records| !records.is_empty());
    }

    /// Labels with at least one record.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Records for a single label, ordered by interval end.
    pub fn records_for(&self, label: &str) -> Option<&[NormalizedRecord]> {
        self.records.get(label).map(Vec::as_slice)
    }

    /// Iterate every record across all labels.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.values().flatten()
    }

    /// Every distinct time bucket observed across all labels, in order.
    pub fn buckets(&self) -> BTreeSet<TimeBucket> {
        self.iter().map(NormalizedRecord::bucket).collect()
    }

    /// Bandwidths (Mbits/sec) reported at a bucket, one entry per flow
    /// active in that bucket.
    pub fn bandwidths_at(&self, bucket: TimeBucket) -> Vec<f64> {
        self.iter()
            .filter(|r| r.bucket() == bucket)
            .map(|r| r.bandwidth_mbit)
            .collect()
    }

    /// Number of flows contributing records.
    pub fn flow_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Derived statistics for one time bucket.
///
/// Recomputed from the full series whenever the record set changes, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub bucket: TimeBucket,
    pub utilization_percent: f64,
    pub fairness_index: f64,
}

/// Per-run aggregate: arithmetic means across all observed buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mean_utilization_percent: f64,
    pub mean_fairness_index: f64,
    pub bucket_count: usize,
    pub flow_count: usize,
}
