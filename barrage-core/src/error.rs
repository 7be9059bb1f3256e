//! Core error types for Barrage

use thiserror::Error;

use crate::task::{TaskId, TaskStatus};

/// Core error type for all Barrage errors
#[derive(Debug, Error)]
pub enum BarrageError {
    /// Task lifecycle errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Barrage
pub type Result<T> = std::result::Result<T, BarrageError>;

/// Task lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The requested status change is not allowed from the current status.
    /// The task is left untouched.
    #[error("cannot {operation} task {id} with status {status}")]
    InvalidStateTransition {
        id: TaskId,
        operation: &'static str,
        status: TaskStatus,
    },

    #[error("Task not found: {0}")]
    NotFound(TaskId),
}

impl TaskError {
    pub fn invalid_transition(id: &TaskId, operation: &'static str, status: TaskStatus) -> Self {
        TaskError::InvalidStateTransition {
            id: id.clone(),
            operation,
            status,
        }
    }
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid duration '{value}' for {field}: {message}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Invalid target url '{0}'")]
    InvalidUrl(String),

    #[error("Invalid status filter '{0}'")]
    InvalidStatus(String),

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let id = TaskId::from("t1");
        let err = TaskError::invalid_transition(&id, "run", TaskStatus::Completed);
        assert_eq!(err.to_string(), "cannot run task t1 with status completed");

        let wrapped: BarrageError = err.into();
        assert!(matches!(wrapped, BarrageError::Task(_)));
    }
}
