//! Per-request results and the aggregated attack report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::task::TaskId;

/// Outcome of a single request issued during an attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Attack name the request belongs to
    pub attack: String,
    /// Sequence number within the attack, starting at 0
    pub seq: u64,
    /// HTTP status code, 0 when no response was received
    pub code: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "crate::serde_nanos")]
    pub latency: Duration,
    pub bytes_out: u64,
    pub bytes_in: u64,
    #[serde(default)]
    pub error: String,
}

impl AttackResult {
    /// A request counts as successful with a 2xx/3xx code and no error
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.code) && self.error.is_empty()
    }
}

/// Latency distribution of an attack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    #[serde(with = "crate::serde_nanos")]
    pub total: Duration,
    #[serde(with = "crate::serde_nanos")]
    pub mean: Duration,
    #[serde(rename = "50th", with = "crate::serde_nanos")]
    pub p50: Duration,
    #[serde(rename = "95th", with = "crate::serde_nanos")]
    pub p95: Duration,
    #[serde(rename = "99th", with = "crate::serde_nanos")]
    pub p99: Duration,
    #[serde(with = "crate::serde_nanos")]
    pub max: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByteMetrics {
    pub total: u64,
    pub mean: f64,
}

/// Aggregated statistics for one completed attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub id: TaskId,
    pub latencies: LatencyMetrics,
    #[serde(default)]
    pub bytes_in: ByteMetrics,
    #[serde(default)]
    pub bytes_out: ByteMetrics,
    /// Timestamp of the first request
    pub earliest: DateTime<Utc>,
    /// Timestamp of the last request
    pub latest: DateTime<Utc>,
    /// Time the last response was received
    pub end: DateTime<Utc>,
    /// Time spent issuing requests (`latest - earliest`)
    #[serde(with = "crate::serde_nanos")]
    pub duration: Duration,
    /// Time spent waiting for the last response (`end - latest`)
    #[serde(with = "crate::serde_nanos")]
    pub wait: Duration,
    pub requests: u64,
    /// Sustained request rate in requests per second
    pub rate: f64,
    /// Fraction of successful requests, 0.0 to 1.0
    pub success: f64,
    #[serde(default)]
    pub status_codes: BTreeMap<String, u64>,
    #[serde(default)]
    pub errors: Vec<String>,
}
