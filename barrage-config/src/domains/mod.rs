//! Domain-specific configuration modules

pub mod engine;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod utils;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Root configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BarrageConfig {
    pub server: server::ServerConfig,

    pub logging: logging::LoggingConfig,

    pub metrics: metrics::MetricsConfig,

    pub engine: engine::EngineConfig,
}

impl BarrageConfig {
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.logging.validate()?;
        self.metrics.validate()?;
        self.engine.validate()?;

        let path = self.metrics.path.trim_end_matches('/');
        if path == "/health" || path == "/api" || path.starts_with("/api/") {
            return Err(ConfigError::ValidationError(format!(
                "metrics path {} collides with an API route",
                self.metrics.path
            )));
        }

        Ok(())
    }

    /// Default configuration rendered as YAML
    pub fn generate_sample() -> String {
        serde_yaml::to_string(&BarrageConfig::default())
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
