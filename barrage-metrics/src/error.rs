//! Metrics error types

use barrage_interfaces::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    /// A collector could not be registered, usually a duplicate name
    #[error("Failed to register metric {name}: {source}")]
    Registration {
        name: &'static str,
        #[source]
        source: prometheus::Error,
    },

    #[error("Metric {name} has unsupported kind {kind}")]
    UnsupportedKind {
        name: &'static str,
        kind: &'static str,
    },

    #[error("No {kind} collector bound for {id}")]
    MissingCollector {
        id: &'static str,
        kind: &'static str,
    },

    #[error("Failed to decode stored report: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to encode metrics: {0}")]
    Exposition(#[source] prometheus::Error),
}
