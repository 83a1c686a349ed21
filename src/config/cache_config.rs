//! Cache Configuration Management
//!
//! TTL and capacity settings for each resource-class cache, with presets for
//! production, development and test environments.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::error::{ConfigResult, ConfigurationError};

/// Configuration for the resource-class caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// General API responses
    pub general: CacheTypeConfig,
    /// Room listings and availability
    pub rooms: CacheTypeConfig,
    /// Invoices and payment state
    pub payments: CacheTypeConfig,
    /// Tenant profiles
    pub tenants: CacheTypeConfig,
    pub cleanup_interval_seconds: u64,
}

/// Configuration for a specific type of cached data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTypeConfig {
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl CacheTypeConfig {
    pub const fn new(ttl_seconds: u64, max_entries: usize) -> Self {
        Self {
            ttl_seconds,
            max_entries,
        }
    }

    /// Get TTL as Duration
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    /// Default configuration suitable for production
    fn default() -> Self {
        Self {
            enabled: true,
            general: CacheTypeConfig::new(300, 1000),
            rooms: CacheTypeConfig::new(600, 500),
            payments: CacheTypeConfig::new(60, 500),
            tenants: CacheTypeConfig::new(300, 500),
            cleanup_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    /// Test-optimized configuration with rapid invalidation
    pub fn for_test() -> Self {
        Self {
            enabled: true,
            general: CacheTypeConfig::new(1, 100),
            rooms: CacheTypeConfig::new(1, 50),
            payments: CacheTypeConfig::new(1, 50),
            tenants: CacheTypeConfig::new(1, 50),
            cleanup_interval_seconds: 1,
        }
    }

    /// Development configuration with short TTLs so edits show up quickly
    pub fn for_development() -> Self {
        Self {
            enabled: true,
            general: CacheTypeConfig::new(30, 500),
            rooms: CacheTypeConfig::new(60, 200),
            payments: CacheTypeConfig::new(10, 200),
            tenants: CacheTypeConfig::new(30, 200),
            cleanup_interval_seconds: 30,
        }
    }

    /// Preset for a named environment
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "test" => Self::for_test(),
            "development" => Self::for_development(),
            _ => Self::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get cleanup interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!(
            enabled = self.enabled,
            general_ttl_seconds = self.general.ttl_seconds,
            rooms_ttl_seconds = self.rooms.ttl_seconds,
            payments_ttl_seconds = self.payments.ttl_seconds,
            tenants_ttl_seconds = self.tenants.ttl_seconds,
            cleanup_interval_seconds = self.cleanup_interval_seconds,
            "Cache configuration"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cleanup_interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.cleanup_interval_seconds",
                "0",
                "cleanup interval must be greater than 0",
            ));
        }

        for (name, class) in [
            ("general", &self.general),
            ("rooms", &self.rooms),
            ("payments", &self.payments),
            ("tenants", &self.tenants),
        ] {
            if class.ttl_seconds == 0 {
                warn!(cache = name, "Cache TTL is 0 - caching effectively disabled");
            }
            if class.max_entries == 0 {
                warn!(cache = name, "Cache max entries is 0 - caching effectively disabled");
            }
        }

        Ok(())
    }
}
