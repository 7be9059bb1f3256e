//! Domain-driven configuration for Barrage
//!
//! Configuration is split by functional domain, loaded from YAML with
//! `BARRAGE_` environment overrides, and validated per domain.

pub mod error;
pub mod loader;
pub mod validation;

pub mod domains;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

pub use domains::{
    engine::EngineConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    metrics::MetricsConfig,
    server::ServerConfig,
    BarrageConfig,
};

pub use domains::utils::serde_duration;
