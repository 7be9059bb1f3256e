//! Core domain models and types for Barrage
//!
//! This crate holds the vocabulary shared by every other crate in the
//! workspace: task identifiers and status, attack parameters, per-request
//! results and the aggregated attack report. It has no async runtime
//! dependency.

pub mod error;
pub mod params;
pub mod report;
pub mod serde_nanos;
pub mod task;

// Re-export commonly used types at the crate root
pub use error::{BarrageError, Result, TaskError, ValidationError};
pub use params::{AttackOpts, AttackParams, AttackTarget};
pub use report::{AttackReport, AttackResult, ByteMetrics, LatencyMetrics};
pub use task::{AttackInfo, TaskId, TaskStatus};
