//! Harmonizer configuration
//!
//! Sources are layered: built-in defaults, then an optional file, then
//! environment variables prefixed with `HARMONIZE` using `__` as the nesting
//! separator (for example `HARMONIZE__CACHE__TTL_SECONDS=600`).

use crate::Result;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "HARMONIZE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonizerConfig {
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
}

/// Result cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            cleanup_interval_seconds: 60,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl HarmonizerConfig {
    /// Load from `.env` (if present) and `HARMONIZE__*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_with_file(None::<&Path>)
    }

    /// Load from an optional config file, overridden by environment variables.
    pub fn load_with_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.as_ref()).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse a TOML document; omitted fields keep their defaults.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarmonizerConfig::default();

        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.cache.cleanup_interval(), Duration::from_secs(60));
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_from_toml_overrides_and_keeps_defaults() {
        let config = HarmonizerConfig::from_toml(
            r#"
            [cache]
            ttl_seconds = 3
            cleanup_interval_seconds = 1

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 3);
        assert_eq!(config.cache.cleanup_interval_seconds, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            HarmonizerConfig::from_toml("").unwrap(),
            HarmonizerConfig::default()
        );
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let err = HarmonizerConfig::from_toml("[cache]\nttl_seconds = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_required_file() {
        let err = HarmonizerConfig::load_with_file(Some("/nonexistent/harmonize.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
