//! Synchronizer configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Invalid synchronizer configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {message}")]
pub struct ConfigError {
    /// Offending environment variable
    pub var: &'static str,
    /// Parse error
    pub message: String,
}

/// Settings shared by all synchronizers of a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum number of mirrored parent collections
    pub cache_capacity: u64,
    /// Expire mirrored collections after this many seconds (0 = never)
    pub cache_ttl_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 10_000,
            cache_ttl_secs: 0,
        }
    }
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MSM_CACHE_CAPACITY`: mirrored collections (default: 10000)
    /// - `MSM_CACHE_TTL_SECS`: mirror expiry, 0 disables (default: 0)
    ///
    /// # Errors
    /// - `ConfigError` if a variable is not a number
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            cache_capacity: env_u64("MSM_CACHE_CAPACITY", defaults.cache_capacity)?,
            cache_ttl_secs: env_u64("MSM_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
        })
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache expiry
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Cache expiry, if enabled
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

fn env_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError {
            var,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_disabled_by_default() {
        assert_eq!(SyncConfig::new().cache_ttl(), None);
    }

    #[test]
    fn ttl_builder() {
        let config = SyncConfig::new()
            .with_cache_capacity(50)
            .with_cache_ttl(Duration::from_secs(90));
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(90)));
    }
}
