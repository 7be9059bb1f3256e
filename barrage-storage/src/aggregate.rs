//! Aggregation of per-request results into an attack report

use std::collections::BTreeMap;
use std::time::Duration;

use barrage_core::{AttackReport, AttackResult, ByteMetrics, LatencyMetrics, TaskId};
use chrono::{DateTime, Utc};

/// Build the report for one attack from all of its results.
///
/// Percentiles use the nearest-rank method. An attack without results
/// yields an all-zero report stamped at the Unix epoch.
pub fn build_report(id: &TaskId, results: &[AttackResult]) -> AttackReport {
    let requests = results.len() as u64;

    let mut latencies: Vec<Duration> = results.iter().map(|r| r.latency).collect();
    latencies.sort_unstable();
    let total: Duration = latencies.iter().sum();

    let earliest = results.iter().map(|r| r.timestamp).min().unwrap_or_default();
    let latest = results.iter().map(|r| r.timestamp).max().unwrap_or_default();
    let end = results
        .iter()
        .map(|r| r.timestamp + chrono::Duration::from_std(r.latency).unwrap_or_else(|_| chrono::Duration::zero()))
        .max()
        .unwrap_or_default();
    let duration = elapsed(earliest, latest);
    let wait = elapsed(latest, end);

    let mut status_codes = BTreeMap::new();
    let mut errors: Vec<String> = Vec::new();
    let mut successes = 0u64;
    for result in results {
        *status_codes.entry(result.code.to_string()).or_insert(0) += 1;
        if result.is_success() {
            successes += 1;
        }
        if !result.error.is_empty() && !errors.contains(&result.error) {
            errors.push(result.error.clone());
        }
    }

    AttackReport {
        id: id.clone(),
        latencies: LatencyMetrics {
            total,
            mean: mean(total, requests),
            p50: percentile(&latencies, 0.50),
            p95: percentile(&latencies, 0.95),
            p99: percentile(&latencies, 0.99),
            max: latencies.last().copied().unwrap_or_default(),
        },
        bytes_in: bytes(results.iter().map(|r| r.bytes_in), requests),
        bytes_out: bytes(results.iter().map(|r| r.bytes_out), requests),
        earliest,
        latest,
        end,
        duration,
        wait,
        requests,
        rate: if duration.is_zero() {
            0.0
        } else {
            requests as f64 / duration.as_secs_f64()
        },
        success: ratio(successes, requests),
        status_codes,
        errors,
    }
}

fn elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or_default()
}

fn mean(total: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((total.as_nanos() / u128::from(count)) as u64)
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn bytes(values: impl Iterator<Item = u64>, count: u64) -> ByteMetrics {
    let total: u64 = values.sum();
    ByteMetrics {
        total,
        mean: ratio(total, count),
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
