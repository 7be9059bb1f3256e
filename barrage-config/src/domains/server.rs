//! HTTP server configuration

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for handling one API request
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_shutdown_grace")]
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_address, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        validate_port_range(self.port, "port", self.domain_name())?;

        if self.socket_addr().is_err() {
            return Err(self.validation_error(format!(
                "{}:{} is not a valid socket address",
                self.bind_address, self.port
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(self.validation_error("request_timeout must be greater than 0"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_validation() {
        let mut config = ServerConfig {
            bind_address: "not an address".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.bind_address = "0.0.0.0".to_string();
        config.port = 0;
        assert!(config.validate().is_err());

        config.port = 9090;
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
