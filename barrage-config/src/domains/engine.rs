//! Attack engine configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the per-attack result channel
    pub result_buffer: usize,

    pub user_agent: String,

    /// TCP connect timeout for attack requests
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub connect_timeout: Duration,

    /// Accept invalid TLS certificates from the target
    #[serde(default = "crate::domains::utils::default_false")]
    pub insecure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_buffer: 1024,
            user_agent: format!("barrage/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(10),
            insecure: false,
        }
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.result_buffer, "result_buffer", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;

        if self.connect_timeout.is_zero() {
            return Err(self.validation_error("connect_timeout must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "engine"
    }
}
