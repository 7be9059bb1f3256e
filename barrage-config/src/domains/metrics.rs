//! Metrics exposition configuration

use crate::error::ConfigResult;
use crate::validation::{validate_metric_name, Validatable};
use barrage_core::TaskStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prefix of every exported metric name
    pub subsystem: String,

    /// Scrape path
    pub path: String,

    /// Status used when a scrape does not ask for one
    pub default_status: TaskStatus,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            subsystem: "barrage".to_string(),
            path: "/metrics".to_string(),
            default_status: TaskStatus::Completed,
        }
    }
}

impl Validatable for MetricsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_metric_name(&self.subsystem, "subsystem", self.domain_name())?;

        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(self.validation_error(format!(
                "path must be an absolute path below the root, got '{}'",
                self.path
            )));
        }

        if self.path.contains(['{', '}', '*']) {
            return Err(self.validation_error("path cannot contain route parameters"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "metrics"
    }
}
