//! Every metric Barrage exports, declared once

use std::fmt;

/// Histogram buckets for request latency, in milliseconds
pub const LATENCY_BUCKETS_MS: [f64; 6] = [0.0, 20.0, 50.0, 100.0, 500.0, 1000.0];

const ATTACK_LABELS: &[&str] = &["id", "rate", "duration"];
const STATUS_CODE_LABELS: &[&str] = &["id", "rate", "duration", "code"];
const HISTOGRAM_LABELS: &[&str] = &["id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricId {
    ReqCnt,
    ReqRt,
    ReqDur,
    ReqAttck,
    ReqWait,
    ReqLatMean,
    ReqLat50th,
    ReqLat95th,
    ReqLat99th,
    ReqLatMax,
    ResSuccessRatio,
    ReqStsCode,
    Histogram,
}

impl MetricId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::ReqCnt => "reqCnt",
            MetricId::ReqRt => "reqRt",
            MetricId::ReqDur => "reqDur",
            MetricId::ReqAttck => "reqAttck",
            MetricId::ReqWait => "reqWait",
            MetricId::ReqLatMean => "reqLatMean",
            MetricId::ReqLat50th => "reqLat50th",
            MetricId::ReqLat95th => "reqLat95th",
            MetricId::ReqLat99th => "reqLat99th",
            MetricId::ReqLatMax => "reqLatMax",
            MetricId::ResSuccessRatio => "resSuccessRatio",
            MetricId::ReqStsCode => "reqStsCode",
            MetricId::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collector kind, with whatever parameters the kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram { buckets: &'static [f64] },
    Summary { quantiles: &'static [f64] },
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
            MetricKind::Histogram { .. } => "histogram",
            MetricKind::Summary { .. } => "summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub id: MetricId,
    /// Exported name, without the subsystem prefix
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

const fn gauge(
    id: MetricId,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> MetricDescriptor {
    MetricDescriptor {
        id,
        name,
        help,
        kind: MetricKind::Gauge,
        labels,
    }
}

static STANDARD_METRICS: [MetricDescriptor; 13] = [
    gauge(
        MetricId::ReqCnt,
        "requests_total",
        "Number of requests issued during the attack.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqDur,
        "request_duration_total",
        "Time taken by the attack including the wait for the last response, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqRt,
        "requests_rate",
        "Request rate sustained during the attack period.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqAttck,
        "request_duration_attack",
        "Time taken issuing all requests, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqWait,
        "request_duration_wait",
        "Time spent waiting for the last response, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqLatMean,
        "request_latencies_mean",
        "Mean latency of all requests in the attack, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqLat50th,
        "request_latencies_50thpercentile",
        "50th percentile latency of all requests in the attack, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqLat95th,
        "request_latencies_mean_95thpercentile",
        "95th percentile latency of all requests in the attack, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqLat99th,
        "request_latencies_mean_99thpercentile",
        "99th percentile latency of all requests in the attack, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqLatMax,
        "request_latencies_max",
        "Maximum latency of all requests in the attack, in milliseconds.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ResSuccessRatio,
        "response_success_ratio",
        "Fraction of requests whose responses did not error.",
        ATTACK_LABELS,
    ),
    gauge(
        MetricId::ReqStsCode,
        "request_status_code",
        "Number of responses per HTTP status code.",
        STATUS_CODE_LABELS,
    ),
    MetricDescriptor {
        id: MetricId::Histogram,
        name: "request_duration_histogram",
        help: "Distribution of request latencies, in milliseconds.",
        kind: MetricKind::Histogram {
            buckets: &LATENCY_BUCKETS_MS,
        },
        labels: HISTOGRAM_LABELS,
    },
];

/// The standard catalog, in registration order
pub fn standard_metrics() -> &'static [MetricDescriptor] {
    &STANDARD_METRICS
}

pub fn descriptor(id: MetricId) -> Option<&'static MetricDescriptor> {
    STANDARD_METRICS.iter().find(|d| d.id == id)
}
