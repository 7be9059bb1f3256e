//! Metrics for Barrage attacks
//!
//! Attack reports are projected onto Prometheus collectors on every scrape:
//!
//! - [`catalog`] declares every exported metric once
//! - [`registrar`] builds and registers one collector per descriptor
//! - [`projector`] joins tasks with their reports and updates collectors
//! - [`exposition`] renders the registry in the text scrape format

pub mod catalog;
pub mod error;
pub mod exposition;
pub mod projector;
pub mod registrar;

pub use catalog::{MetricDescriptor, MetricId, MetricKind, LATENCY_BUCKETS_MS};
pub use error::MetricsError;
pub use projector::{milliseconds, ProjectionSummary, ReportMetricsProjector};
pub use registrar::{AttackMetrics, Collector, MetricRegistrar};
