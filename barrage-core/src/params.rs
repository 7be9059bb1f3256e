//! Attack parameters as submitted, and the parsed options handed to engines

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ValidationError;
use crate::task::TaskId;

/// The single target every request of an attack is sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTarget {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Immutable per-attack input, owned by the task that runs it.
///
/// `duration` and `timeout` are kept as the submitted strings (`"10s"`,
/// `"1m30s"`); the duration string is exported unchanged as a metric label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub target: AttackTarget,
    /// Requests per second
    pub rate: u32,
    pub duration: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_workers")]
    pub workers: u64,
    #[serde(default = "default_connections")]
    pub connections: usize,
    #[serde(default = "default_redirects")]
    pub redirects: i32,
    #[serde(default = "default_true")]
    pub keepalive: bool,
    #[serde(default = "default_true")]
    pub http2: bool,
    #[serde(default)]
    pub h2c: bool,
    /// Maximum number of response body bytes to read, -1 for unlimited
    #[serde(default = "default_max_body")]
    pub max_body: i64,
}

impl AttackParams {
    /// Minimal parameters with engine defaults
    pub fn new(url: impl Into<String>, rate: u32, duration: impl Into<String>) -> Self {
        Self {
            name: None,
            target: AttackTarget {
                method: default_method(),
                url: url.into(),
                headers: BTreeMap::new(),
                body: None,
            },
            rate,
            duration: duration.into(),
            timeout: default_timeout(),
            workers: default_workers(),
            connections: default_connections(),
            redirects: default_redirects(),
            keepalive: true,
            http2: true,
            h2c: false,
            max_body: default_max_body(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Parsed, engine-facing form of [`AttackParams`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOpts {
    pub name: String,
    pub target: AttackTarget,
    pub rate: u32,
    pub duration: Duration,
    pub timeout: Duration,
    pub workers: u64,
    pub connections: usize,
    pub redirects: i32,
    pub keepalive: bool,
    pub http2: bool,
    pub h2c: bool,
    pub max_body: i64,
}

impl AttackOpts {
    /// Parse the submitted parameters. The attack name falls back to the task id.
    pub fn from_params(id: &TaskId, params: &AttackParams) -> Result<Self, ValidationError> {
        if params.rate == 0 {
            return Err(ValidationError::NotPositive { field: "rate" });
        }
        url::Url::parse(&params.target.url)
            .map_err(|_| ValidationError::InvalidUrl(params.target.url.clone()))?;

        Ok(Self {
            name: params.name.clone().unwrap_or_else(|| id.to_string()),
            target: params.target.clone(),
            rate: params.rate,
            duration: parse_duration("duration", &params.duration)?,
            timeout: parse_duration("timeout", &params.timeout)?,
            workers: params.workers,
            connections: params.connections,
            redirects: params.redirects,
            keepalive: params.keepalive,
            http2: params.http2,
            h2c: params.h2c,
            max_body: params.max_body,
        })
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ValidationError> {
    humantime::parse_duration(value).map_err(|e| ValidationError::InvalidDuration {
        field,
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_workers() -> u64 {
    10
}

fn default_connections() -> usize {
    10_000
}

fn default_redirects() -> i32 {
    10
}

fn default_max_body() -> i64 {
    -1
}

fn default_true() -> bool {
    true
}
