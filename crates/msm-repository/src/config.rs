//! Configuration for the HTTP repository.

use crate::error::{RepositoryError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Connection settings for the manager REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Base URL every collection path is appended to
    pub api_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Field holding the id when the backend returns objects instead of ids
    pub id_field: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            id_field: "id".to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MSM_API_URL`: base URL (default: "http://localhost:8080/api")
    /// - `MSM_REQUEST_TIMEOUT_MS`: request timeout (default: 30000)
    /// - `MSM_CONNECT_TIMEOUT_MS`: connect timeout (default: 10000)
    /// - `MSM_ID_FIELD`: id field of object responses (default: "id")
    ///
    /// # Errors
    /// - `RepositoryError::Config` if a timeout is not a number
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_url = std::env::var("MSM_API_URL").unwrap_or(defaults.api_url);
        let request_timeout_ms = env_millis("MSM_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?;
        let connect_timeout_ms = env_millis("MSM_CONNECT_TIMEOUT_MS", defaults.connect_timeout_ms)?;
        let id_field = std::env::var("MSM_ID_FIELD").unwrap_or(defaults.id_field);

        Ok(Self {
            api_url,
            request_timeout_ms,
            connect_timeout_ms,
            id_field,
        })
    }

    /// Set the base URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the id field used for object responses
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Request timeout as duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Connect timeout as duration
    #[inline]
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// - `RepositoryError::Config` for an empty or non-HTTP base URL
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(RepositoryError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.id_field.is_empty() {
            return Err(RepositoryError::Config("id_field must not be empty".to_string()));
        }
        Ok(())
    }
}

fn env_millis(var: &str, default: u64) -> Result<u64> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| RepositoryError::Config(format!("invalid {var}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RepositoryConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn builder_overrides() {
        let config = RepositoryConfig::new()
            .with_api_url("https://manager.example/api")
            .with_request_timeout(Duration::from_millis(1500))
            .with_id_field("address");

        assert_eq!(config.api_url, "https://manager.example/api");
        assert_eq!(config.request_timeout_ms, 1500);
        assert_eq!(config.id_field, "address");
    }

    #[test]
    fn rejects_non_http_url() {
        let config = RepositoryConfig::new().with_api_url("ftp://nope");
        assert!(matches!(config.validate(), Err(RepositoryError::Config(_))));
    }

    #[test]
    fn partial_input_uses_defaults() {
        let config: RepositoryConfig =
            serde_json::from_str(r#"{"api_url": "http://10.0.0.1:8080"}"#).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.1:8080");
        assert_eq!(config.id_field, "id");
    }
}
