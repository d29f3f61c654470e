//! Client configuration.
//!
//! Built with the builder methods or read from `LOCALMIND_*` environment
//! variables.

use std::time::Duration;
use thiserror::Error;

use crate::models::Endpoint;
use crate::sse::DEFAULT_MAX_FRAME_BYTES;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

const ENV_API_BASE: &str = "LOCALMIND_API_BASE";
const ENV_MODE: &str = "LOCALMIND_MODE";
const ENV_IDLE_TIMEOUT: &str = "LOCALMIND_IDLE_TIMEOUT_SECS";
const ENV_MAX_FRAME_BYTES: &str = "LOCALMIND_MAX_FRAME_BYTES";

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Settings for talking to the research server.
///
/// # Example
///
/// ```ignore
/// use localmind::config::ClientConfig;
/// use localmind::models::Endpoint;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://10.0.0.5:8000")
///     .with_endpoint(Endpoint::Rag);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL, without trailing slash
    pub base_url: String,
    /// Which streaming route answers queries
    pub endpoint: Endpoint,
    /// Silence after which the stream is treated as failed; `None` waits forever
    pub idle_timeout: Option<Duration>,
    /// Cap on a single buffered frame; `None` is unbounded
    pub max_frame_bytes: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: Endpoint::Research,
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
            max_frame_bytes: Some(DEFAULT_MAX_FRAME_BYTES),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_frame_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_frame_bytes = limit;
        self
    }

    /// Read configuration from the process environment.
    ///
    /// A timeout or frame cap of `0` disables the corresponding limit.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }

        if let Some(mode) = lookup(ENV_MODE) {
            let endpoint = mode
                .parse::<Endpoint>()
                .map_err(|message| ConfigError::InvalidValue {
                    var: ENV_MODE,
                    message,
                })?;
            config = config.with_endpoint(endpoint);
        }

        if let Some(secs) = parse_number(&lookup, ENV_IDLE_TIMEOUT)? {
            config = config.with_idle_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }

        if let Some(bytes) = parse_number(&lookup, ENV_MAX_FRAME_BYTES)? {
            config = config.with_max_frame_bytes((bytes > 0).then_some(bytes as usize));
        }

        Ok(config)
    }
}

fn parse_number<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.max_frame_bytes, Some(1024 * 1024));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LOCALMIND_API_BASE", "http://10.0.0.5:8000/"),
            ("LOCALMIND_MODE", "rag"),
            ("LOCALMIND_IDLE_TIMEOUT_SECS", "5"),
            ("LOCALMIND_MAX_FRAME_BYTES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.endpoint, Endpoint::Rag);
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.max_frame_bytes, None);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config =
            ClientConfig::from_lookup(lookup(&[("LOCALMIND_IDLE_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.idle_timeout, None);
    }

    #[test]
    fn test_invalid_number() {
        let err = ClientConfig::from_lookup(lookup(&[("LOCALMIND_IDLE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "LOCALMIND_IDLE_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "LOCALMIND_IDLE_TIMEOUT_SECS must be a non-negative integer, got 'soon'"
        );
    }

    #[test]
    fn test_invalid_mode() {
        let err = ClientConfig::from_lookup(lookup(&[("LOCALMIND_MODE", "chat")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "LOCALMIND_MODE", .. }));
    }
}
