//! Barrage Execution Engine
//!
//! This crate owns the attack task lifecycle: the [`Task`] state machine,
//! its cancellable [`AttackContext`], the [`AttackRunner`] that drives one
//! attack's result stream, and the in-memory [`Dispatcher`] that keeps
//! track of submitted tasks.

pub mod context;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod runner;
pub mod task;

// Re-export main types
pub use context::AttackContext;
pub use dispatcher::Dispatcher;
pub use encoder::{JsonLinesEncoder, ResultEncoder};
pub use error::ExecutionError;
pub use runner::AttackRunner;
pub use task::Task;
