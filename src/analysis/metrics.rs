//! Link utilization and fairness metrics.
//!
//! Pure functions over a [`TimeSeries`]; both metrics are recomputed from the
//! full series, never updated incrementally.

use std::collections::BTreeMap;

use super::types::{MetricPoint, RunSummary, TimeBucket, TimeSeries};

/// Link utilization per time bucket, as a percentage of the given capacity.
///
/// `100 * Σ bandwidth / capacity`, clamped at 100: measured throughput can
/// transiently exceed nominal capacity through buffering and TCP burstiness,
/// and the metric stays interpretable as "percent of link saturated".
/// Capacity is in Mbits/sec and must be positive.
pub fn utilization(series: &TimeSeries, capacity_mbit: f64) -> BTreeMap<TimeBucket, f64> {
    let mut result = BTreeMap::new();
    for bucket in series.buckets() {
        let total: f64 = series.bandwidths_at(bucket).iter().sum();
        let percent = (100.0 * total / capacity_mbit).min(100.0);
        result.insert(bucket, percent);
    }
    result
}

/// Jain's Fairness Index across the flows active at a single bucket.
///
/// `(Σ b_i)² / (n · Σ b_i²)`, range (0, 1], 1 = perfectly fair. Defined as 0
/// when no flow reported or all flows reported zero, so downstream
/// aggregation never sees NaN.
pub fn jains_index(bandwidths: &[f64]) -> f64 {
    let n = bandwidths.len();
    let sum: f64 = bandwidths.iter().sum();
    let sum_of_squares: f64 = bandwidths.iter().map(|b| b * b).sum();

    if n == 0 || sum_of_squares == 0.0 {
        0.0
    } else {
        (sum * sum) / (n as f64 * sum_of_squares)
    }
}

/// Jain's Fairness Index per time bucket.
pub fn fairness(series: &TimeSeries) -> BTreeMap<TimeBucket, f64> {
    let mut result = BTreeMap::new();
    for bucket in series.buckets() {
        result.insert(bucket, jains_index(&series.bandwidths_at(bucket)));
    }
    result
}

/// Both metrics merged per bucket, ordered by bucket.
pub fn metric_points(series: &TimeSeries, capacity_mbit: f64) -> Vec<MetricPoint> {
    let utilization = utilization(series, capacity_mbit);
    let fairness = fairness(series);

    utilization
        .into_iter()
        .map(|(bucket, utilization_percent)| MetricPoint {
            bucket,
            utilization_percent,
            // Both maps are keyed on the same bucket set.
            fairness_index: fairness[&bucket],
        })
        .collect()
}

/// Arithmetic mean of each metric across all observed buckets.
pub fn summarize(points: &[MetricPoint], flow_count: usize) -> RunSummary {
    let bucket_count = points.len();
    let (util_sum, fair_sum) = points.iter().fold((0.0, 0.0), |(u, f), p| {
        (u + p.utilization_percent, f + p.fairness_index)
    });

    if bucket_count == 0 {
        RunSummary {
            mean_utilization_percent: 0.0,
            mean_fairness_index: 0.0,
            bucket_count: 0,
            flow_count,
        }
    } else {
        RunSummary {
            mean_utilization_percent: util_sum / bucket_count as f64,
            mean_fairness_index: fair_sum / bucket_count as f64,
            bucket_count,
            flow_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::NormalizedRecord;

    fn series(records: &[(&str, f64, f64)]) -> TimeSeries {
        let mut s = TimeSeries::new();
        for (label, end, bw) in records {
            s.insert(
                label.to_string(),
                vec![NormalizedRecord {
                    label: label.to_string(),
                    interval_end: *end,
                    transfer_mbytes: bw / 8.0,
                    bandwidth_mbit: *bw,
                }],
            );
        }
        s
    }

    #[test]
    fn test_jains_index_single_flow() {
        assert_eq!(jains_index(&[7.3]), 1.0);
        assert_eq!(jains_index(&[0.001]), 1.0);
    }

    #[test]
    fn test_jains_index_fallbacks() {
        assert_eq!(jains_index(&[]), 0.0);
        assert_eq!(jains_index(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_jains_index_textbook_values() {
        assert_eq!(jains_index(&[10.0, 10.0, 10.0, 10.0]), 1.0);
        assert_eq!(jains_index(&[10.0, 0.0, 0.0, 0.0]), 0.25);
    }

    #[test]
    fn test_utilization_clamped() {
        let s = series(&[("h2", 1.0, 80.0), ("h3", 1.0, 90.0)]);
        let util = utilization(&s, 100.0);
        assert_eq!(util[&TimeBucket::from_secs(1.0)], 100.0);
    }

    #[test]
    fn test_utilization_monotone_in_inputs() {
        let lower = series(&[("h2", 1.0, 3.0), ("h3", 1.0, 4.0)]);
        let higher = series(&[("h2", 1.0, 5.0), ("h3", 1.0, 4.0)]);
        let bucket = TimeBucket::from_secs(1.0);
        assert!(utilization(&lower, 100.0)[&bucket] <= utilization(&higher, 100.0)[&bucket]);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Two generators: {5,5} at t=1 and {8,2} at t=2 against capacity 10.
        let s = series(&[
            ("h2", 1.0, 5.0),
            ("h3", 1.0, 5.0),
            ("h2", 2.0, 8.0),
            ("h3", 2.0, 2.0),
        ]);

        let points = metric_points(&s, 10.0);
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].bucket, TimeBucket::from_secs(1.0));
        assert_eq!(points[0].utilization_percent, 100.0);
        assert_eq!(points[0].fairness_index, 1.0);

        assert_eq!(points[1].bucket, TimeBucket::from_secs(2.0));
        assert_eq!(points[1].utilization_percent, 100.0);
        assert!((points[1].fairness_index - 100.0 / 136.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize() {
        let points = vec![
            MetricPoint {
                bucket: TimeBucket::from_secs(1.0),
                utilization_percent: 100.0,
                fairness_index: 1.0,
            },
            MetricPoint {
                bucket: TimeBucket::from_secs(2.0),
                utilization_percent: 50.0,
                fairness_index: 0.5,
            },
        ];
        let summary = summarize(&points, 2);
        assert_eq!(summary.mean_utilization_percent, 75.0);
        assert_eq!(summary.mean_fairness_index, 0.75);
        assert_eq!(summary.bucket_count, 2);
        assert_eq!(summary.flow_count, 2);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], 0);
        assert_eq!(summary.mean_utilization_percent, 0.0);
        assert_eq!(summary.mean_fairness_index, 0.0);
        assert_eq!(summary.bucket_count, 0);
    }
}
