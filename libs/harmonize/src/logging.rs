//! Logging initialization for binaries embedding the harmonizer
//!
//! The library itself only emits `tracing` events; this sets up a subscriber
//! for hosts that do not install their own. Supports JSON or human-readable
//! output and `RUST_LOG` overrides of the configured level.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber built from `config`.
///
/// Fails with [`Error::Logging`] if the level directive is invalid or a
/// global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| Error::Logging(e.to_string()))?;

    tracing::info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}

/// `RUST_LOG` when set, otherwise the configured level.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| Error::Logging(e.to_string()))
}
