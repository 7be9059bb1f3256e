//! Storage for Barrage attack results
//!
//! Provides the in-memory [`InMemoryReportStore`], which accepts the
//! encoded result stream of a finished attack, aggregates it into an
//! [`AttackReport`](barrage_core::AttackReport) and serves reports and
//! per-request samples back to readers.

pub mod aggregate;
pub mod memory;

pub use aggregate::build_report;
pub use memory::InMemoryReportStore;
