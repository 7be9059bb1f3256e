//! Configuration loading and environment variable handling

use crate::domains::BarrageConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Loads YAML configuration and applies prefixed environment overrides
pub struct ConfigLoader {
    prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: "BARRAGE".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load a YAML file, then apply environment overrides and validate
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<BarrageConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: BarrageConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env(&self) -> ConfigResult<BarrageConfig> {
        let mut config = BarrageConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<BarrageConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn apply_env_overrides(&self, config: &mut BarrageConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server)?;
        self.apply_logging_overrides(&mut config.logging)?;
        self.apply_metrics_overrides(&mut config.metrics)?;
        self.apply_engine_overrides(&mut config.engine)?;
        Ok(())
    }

    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Ok(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Ok(port) = self.get_env_var("SERVER_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SERVER_PORT: {}", e)))?;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn apply_metrics_overrides(
        &self,
        config: &mut crate::domains::metrics::MetricsConfig,
    ) -> ConfigResult<()> {
        if let Ok(subsystem) = self.get_env_var("METRICS_SUBSYSTEM") {
            config.subsystem = subsystem;
        }

        if let Ok(path) = self.get_env_var("METRICS_PATH") {
            config.path = path;
        }

        if let Ok(status) = self.get_env_var("METRICS_DEFAULT_STATUS") {
            config.default_status = status.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid METRICS_DEFAULT_STATUS: {}", e))
            })?;
        }

        Ok(())
    }

    fn apply_engine_overrides(
        &self,
        config: &mut crate::domains::engine::EngineConfig,
    ) -> ConfigResult<()> {
        if let Ok(buffer) = self.get_env_var("ENGINE_RESULT_BUFFER") {
            config.result_buffer = buffer.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid ENGINE_RESULT_BUFFER: {}", e))
            })?;
        }

        if let Ok(user_agent) = self.get_env_var("ENGINE_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(())
    }

    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
