//! Barrage server
//!
//! Runs HTTP load-test attacks, keeps their reports and exposes them as
//! Prometheus metrics:
//!
//! - `POST /api/v1/attack` submits an attack, `GET /api/v1/attack` lists them
//! - `POST /api/v1/attack/{id}/cancel` cancels a running attack
//! - `GET /api/v1/report` returns the stored reports
//! - `GET /metrics` projects reports onto collectors and serves the scrape

pub mod app;
pub mod context;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod startup;

pub use app::create_app;
pub use context::AppContext;
pub use engine::HttpAttackEngine;
pub use errors::{RestError, RestResult};
pub use startup::Server;
