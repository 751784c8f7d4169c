//! Per-region latency and uptime statistics.
//!
//! `compute` is a pure single pass per requested region over the loaded
//! table. Regions with no matching records are left out of the report.

use crate::record::TelemetryTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Threshold applied when the caller does not supply one.
pub const DEFAULT_THRESHOLD_MS: f64 = 180.0;

/// Decimal places kept for latency figures
const LATENCY_DECIMALS: i32 = 2;
/// Decimal places kept for uptime figures
const UPTIME_DECIMALS: i32 = 3;

/// Statistics for a single region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub avg_latency: f64,
    pub p95_latency: f64,
    pub avg_uptime: f64,
    /// Observations with latency strictly above the threshold
    pub breaches: u64,
}

/// Region identifier to its statistics, in first-requested order.
pub type RegionReport = IndexMap<String, RegionStats>;

/// Compute statistics for each requested region.
///
/// An absent table always yields an empty report. Duplicate region ids are
/// recomputed and overwrite the same entry. The threshold is not validated.
pub fn compute(
    table: Option<&TelemetryTable>,
    regions: &[String],
    threshold_ms: f64,
) -> RegionReport {
    let mut report = RegionReport::new();

    let Some(table) = table else {
        return report;
    };

    for region in regions {
        if let Some(stats) = region_stats(table, region, threshold_ms) {
            report.insert(region.clone(), stats);
        }
    }

    report
}

/// Statistics for one region, or `None` when it has no records.
pub fn region_stats(
    table: &TelemetryTable,
    region: &str,
    threshold_ms: f64,
) -> Option<RegionStats> {
    let mut latencies = Vec::new();
    let mut uptimes = Vec::new();
    for record in table.for_region(region) {
        latencies.push(record.latency_ms);
        uptimes.push(record.uptime);
    }

    if latencies.is_empty() {
        return None;
    }

    let breaches = latencies.iter().filter(|&&l| l > threshold_ms).count() as u64;
    let avg_latency = mean(&latencies);
    let avg_uptime = mean(&uptimes);

    latencies.sort_by(|a, b| a.total_cmp(b));
    let p95_latency = percentile(&latencies, 95.0);

    Some(RegionStats {
        avg_latency: round_to(avg_latency, LATENCY_DECIMALS),
        p95_latency: round_to(p95_latency, LATENCY_DECIMALS),
        avg_uptime: round_to(avg_uptime, UPTIME_DECIMALS),
        breaches,
    })
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile `q` (0..=100) of an ascending slice, linearly interpolated
/// between the two closest ranks.
///
/// rank = q/100 * (n - 1). Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Round to `decimals` places: nearest representable decimal, exact binary
/// ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let places = decimals.max(0) as usize;
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TelemetryRecord;
    use approx::assert_relative_eq;

    fn regions(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn sample_table() -> TelemetryTable {
        TelemetryTable::new(vec![
            TelemetryRecord::new("us-east", 100.0, 0.99),
            TelemetryRecord::new("us-east", 300.0, 0.95),
            TelemetryRecord::new("eu-west", 50.0, 1.0),
        ])
    }

    #[test]
    fn test_reference_scenario() {
        let table = sample_table();
        let report = compute(
            Some(&table),
            &regions(&["us-east", "eu-west", "ap-south"]),
            DEFAULT_THRESHOLD_MS,
        );

        assert_eq!(report.len(), 2);
        assert!(!report.contains_key("ap-south"));

        let us = &report["us-east"];
        assert_eq!(us.avg_latency, 200.0);
        assert_eq!(us.p95_latency, 290.0);
        assert_eq!(us.avg_uptime, 0.97);
        assert_eq!(us.breaches, 1);

        let eu = &report["eu-west"];
        assert_eq!(eu.avg_latency, 50.0);
        assert_eq!(eu.p95_latency, 50.0);
        assert_eq!(eu.avg_uptime, 1.0);
        assert_eq!(eu.breaches, 0);
    }

    #[test]
    fn test_absent_table_is_empty() {
        let report = compute(None, &regions(&["us-east", "eu-west"]), 0.0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_no_regions_is_empty() {
        let table = sample_table();
        assert!(compute(Some(&table), &[], DEFAULT_THRESHOLD_MS).is_empty());
    }

    #[test]
    fn test_keys_subset_of_requested_and_present() {
        let table = sample_table();
        let requested = regions(&["eu-west", "nowhere", "", "US-EAST"]);
        let report = compute(Some(&table), &requested, DEFAULT_THRESHOLD_MS);

        let keys: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["eu-west"]);
    }

    #[test]
    fn test_breaches_strict_inequality() {
        let table = TelemetryTable::new(vec![
            TelemetryRecord::new("r", 180.0, 1.0),
            TelemetryRecord::new("r", 180.01, 1.0),
            TelemetryRecord::new("r", 10.0, 1.0),
        ]);
        let report = compute(Some(&table), &regions(&["r"]), 180.0);
        assert_eq!(report["r"].breaches, 1);
    }

    #[test]
    fn test_negative_threshold_counts_everything() {
        let table = TelemetryTable::new(vec![
            TelemetryRecord::new("r", 0.0, 1.0),
            TelemetryRecord::new("r", 12.0, 1.0),
            TelemetryRecord::new("r", 500.0, 1.0),
        ]);
        let report = compute(Some(&table), &regions(&["r"]), -1.0);
        assert_eq!(report["r"].breaches, 3);
    }

    #[test]
    fn test_duplicate_regions_overwrite_identically() {
        let table = sample_table();
        let once = compute(Some(&table), &regions(&["us-east"]), DEFAULT_THRESHOLD_MS);
        let twice = compute(Some(&table), &regions(&["us-east", "us-east"]), DEFAULT_THRESHOLD_MS);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_record_p95_is_value() {
        let table = TelemetryTable::new(vec![TelemetryRecord::new("solo", 123.0, 0.5)]);
        let stats = region_stats(&table, "solo", DEFAULT_THRESHOLD_MS).unwrap();
        assert_eq!(stats.p95_latency, 123.0);
        assert_eq!(stats.avg_latency, 123.0);
    }

    #[test]
    fn test_p95_ignores_input_order() {
        let table = TelemetryTable::new(
            [50.0, 10.0, 40.0, 20.0, 30.0]
                .iter()
                .map(|&l| TelemetryRecord::new("r", l, 1.0))
                .collect(),
        );
        // rank = 0.95 * 4 = 3.8 -> 40 + 0.8 * 10
        let stats = region_stats(&table, "r", DEFAULT_THRESHOLD_MS).unwrap();
        assert_eq!(stats.p95_latency, 48.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
        // rank = 0.95 * 9 = 8.55
        assert_relative_eq!(percentile(&sorted, 95.0), 9.55, epsilon = 1e-9);
        assert_relative_eq!(percentile(&sorted, 50.0), 5.5, epsilon = 1e-9);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 10.0);
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(123.4567, 2), 123.46);
        assert_eq!(round_to(0.9666, 3), 0.967);
        assert_eq!(round_to(0.9664, 3), 0.966);
        assert_eq!(round_to(-2.345678, 2), -2.35);
    }

    #[test]
    fn test_rounding_exact_ties_to_even() {
        assert_eq!(round_to(1.125, 2), 1.12);
        assert_eq!(round_to(100.125, 2), 100.12);
        assert_eq!(round_to(1.375, 2), 1.38);
        // 2.675 is stored just below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
        // 0.9995 is stored just above the tie
        assert_eq!(round_to(0.9995, 3), 1.0);
        assert_eq!(round_to(0.0625, 3), 0.062);
    }

    #[test]
    fn test_tied_average_latency() {
        let table = TelemetryTable::new(vec![
            TelemetryRecord::new("r", 1.0, 0.999),
            TelemetryRecord::new("r", 1.25, 1.0),
        ]);
        let stats = region_stats(&table, "r", DEFAULT_THRESHOLD_MS).unwrap();
        assert_eq!(stats.avg_latency, 1.12);
    }

    #[test]
    fn test_report_keeps_request_order() {
        let table = sample_table();
        let report = compute(
            Some(&table),
            &regions(&["us-east", "ap-south", "eu-west", "us-east"]),
            DEFAULT_THRESHOLD_MS,
        );

        let keys: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["us-east", "eu-west"]);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("\"us-east\"").unwrap() < json.find("\"eu-west\"").unwrap());
    }

    #[test]
    fn test_rounding_applied_to_report() {
        let table = TelemetryTable::new(vec![
            TelemetryRecord::new("r", 123.4567, 0.9666),
            TelemetryRecord::new("r", 123.4567, 0.9666),
        ]);
        let stats = region_stats(&table, "r", DEFAULT_THRESHOLD_MS).unwrap();
        assert_eq!(stats.avg_latency, 123.46);
        assert_eq!(stats.p95_latency, 123.46);
        assert_eq!(stats.avg_uptime, 0.967);
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = RegionStats {
            avg_latency: 200.0,
            p95_latency: 290.0,
            avg_uptime: 0.97,
            breaches: 1,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "avg_latency": 200.0,
                "p95_latency": 290.0,
                "avg_uptime": 0.97,
                "breaches": 1
            })
        );
    }
}
