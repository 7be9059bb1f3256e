//! # Barrage Interfaces
//!
//! Traits at the edges of the Barrage core. The lifecycle and metrics
//! crates only ever talk to these, never to a concrete engine, registry or
//! store:
//!
//! - [`AttackEngine`] - produces the per-request result stream of an attack
//! - [`TaskRegistry`] - lists known tasks by status
//! - [`ReportStore`] - raw stored reports and per-request samples
//! - [`ResultSink`] - receives a finished attack's encoded results

pub mod engine;
pub mod registry;
pub mod store;

pub use engine::{AttackEngine, ResultStream};
pub use registry::{TaskFilter, TaskRegistry};
pub use store::{ReportStore, ResultSink, StoreError};
