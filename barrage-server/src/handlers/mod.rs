//! Route handlers

pub mod attack;
pub mod health;
pub mod metrics;
pub mod report;

use serde::Deserialize;

pub use attack::{cancel_attack, create_attack, get_attack, list_attacks, purge_attack};
pub use health::health_check;
pub use metrics::scrape_metrics;
pub use report::{get_report, list_reports};

/// `?status=` filter shared by listing and scraping
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}
