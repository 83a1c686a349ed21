//! # DormHub Configuration System
//!
//! Layered configuration for the status engine, the resource caches and the
//! periodic status monitor.
//!
//! ## Layering
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults (the `Default` impls in this module)
//! 2. `config/dormhub.{toml,yaml,json}`
//! 3. `config/dormhub-{environment}.{toml,yaml,json}`
//! 4. `DORMHUB__SECTION__KEY` environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dormhub_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let grace = manager.config().engine.grace_period_days;
//! # Ok(())
//! # }
//! ```

pub mod cache_config;
pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub use cache_config::{CacheConfig, CacheTypeConfig};
pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Status engine thresholds
    pub engine: EngineConfig,

    /// Resource-class cache settings
    pub cache: CacheConfig,

    /// Periodic booking status check
    pub monitor: MonitorConfig,
}

/// Status engine thresholds, all in days.
///
/// Values are used as given; the engine does not reject negative or inverted
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days after checkout before an active booking escalates to `overdue`
    pub grace_period_days: i64,
    /// Days before checkout when a checkout reminder is recommended
    pub reminder_days: i64,
    /// Days after checkout before a booking is force-closed
    pub auto_complete_after_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period_days: 3,
            reminder_days: 7,
            auto_complete_after_days: 30,
        }
    }
}

/// Periodic status monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl AppConfig {
    /// Validate the merged configuration.
    ///
    /// Intervals must be non-zero. Engine thresholds are only warned about.
    pub fn validate(&self) -> ConfigResult<()> {
        self.cache.validate()?;

        if self.monitor.enabled && self.monitor.interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "monitor.interval_seconds",
                "0",
                "monitor interval must be greater than 0",
            ));
        }

        let engine = &self.engine;
        if engine.grace_period_days < 0
            || engine.reminder_days < 0
            || engine.auto_complete_after_days < 0
        {
            warn!(
                grace_period_days = engine.grace_period_days,
                reminder_days = engine.reminder_days,
                auto_complete_after_days = engine.auto_complete_after_days,
                "Negative engine threshold configured"
            );
        }
        if engine.auto_complete_after_days < engine.grace_period_days {
            warn!(
                grace_period_days = engine.grace_period_days,
                auto_complete_after_days = engine.auto_complete_after_days,
                "Auto-complete threshold is shorter than the grace period; overdue tier is unreachable"
            );
        }

        Ok(())
    }
}
