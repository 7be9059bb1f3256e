//! Report store and result sink interfaces

use async_trait::async_trait;
use barrage_core::TaskId;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Report not found: {0}")]
    NotFound(TaskId),

    #[error("Malformed results for {id}: {message}")]
    Malformed { id: TaskId, message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

/// Read side of the report store.
///
/// Values are returned raw (JSON bytes); decoding is the caller's concern.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Every stored report
    async fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Per-request samples of one attack, one raw result per entry.
    /// An attack without samples yields an empty list.
    async fn get_histogram_samples(&self, id: &TaskId) -> Result<Vec<Vec<u8>>, StoreError>;
}

/// Receives the encoded results of an attack that ran to completion
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn submit(&self, id: &TaskId, encoded: Vec<u8>) -> Result<(), StoreError>;

    /// Drop whatever was stored for `id`. Unknown ids are not an error.
    async fn discard(&self, id: &TaskId) -> Result<(), StoreError>;
}
