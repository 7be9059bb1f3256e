//! Error types for attack execution

use barrage_core::ValidationError;
use barrage_interfaces::StoreError;
use thiserror::Error;

/// Attack execution errors.
///
/// These never reach the caller of `Task::run`; the driver logs them and
/// leaves the task in a terminal status.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Attack engine returned no result stream")]
    EmptyStream,

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid attack parameters: {0}")]
    InvalidParams(#[from] ValidationError),

    #[error("Failed to store results: {0}")]
    Sink(#[from] StoreError),
}
