//! Configuration validation trait and field helpers

use crate::error::{ConfigError, ConfigResult};

pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Domain name used in error reports
    fn domain_name(&self) -> &'static str;

    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

pub fn validate_port_range(port: u16, field_name: &str, domain: &str) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be 0", field_name),
        });
    }

    if port <= 1023 {
        tracing::warn!("{} port {} is in the reserved range (1-1023)", field_name, port);
    }

    Ok(())
}

/// Prometheus metric name segment: `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn validate_metric_name(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} '{}' is not a valid metric name", field_name, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_string() {
        assert!(validate_required_string("x", "field", "test").is_ok());
        assert!(validate_required_string("  ", "field", "test").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1usize, "field", "test").is_ok());
        assert!(validate_positive(0usize, "field", "test").is_err());
    }

    #[test]
    fn test_validate_port_range() {
        assert!(validate_port_range(8080, "port", "server").is_ok());
        assert!(validate_port_range(0, "port", "server").is_err());
    }

    #[test]
    fn test_validate_metric_name() {
        assert!(validate_metric_name("barrage", "subsystem", "metrics").is_ok());
        assert!(validate_metric_name("_load_test2", "subsystem", "metrics").is_ok());
        assert!(validate_metric_name("", "subsystem", "metrics").is_err());
        assert!(validate_metric_name("2fast", "subsystem", "metrics").is_err());
        assert!(validate_metric_name("load-test", "subsystem", "metrics").is_err());
    }
}
