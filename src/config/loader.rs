//! Configuration Loader
//!
//! Environment-aware configuration loading. Detects the environment, layers the
//! base and environment-specific files over built-in defaults, applies
//! `DORMHUB__` environment variable overrides and validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::{AppConfig, CacheConfig};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_STEM: &str = "dormhub";
const ENV_PREFIX: &str = "DORMHUB";
const ENV_SEPARATOR: &str = "__";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = environment,
            grace_period_days = config.engine.grace_period_days,
            reminder_days = config.engine.reminder_days,
            auto_complete_after_days = config.engine.auto_complete_after_days,
            monitor_interval_seconds = config.monitor.interval_seconds,
            "Configuration loaded successfully"
        );
        config.cache.log_configuration();

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the runtime environment from `DORMHUB_ENV` or `APP_ENV`
    pub fn detect_environment() -> String {
        env::var("DORMHUB_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn build(config_directory: &Path, environment: &str) -> ConfigResult<AppConfig> {
        let defaults = AppConfig {
            cache: CacheConfig::for_environment(environment),
            ..AppConfig::default()
        };
        let defaults = Config::try_from(&defaults)
            .map_err(|e| ConfigurationError::load_error("built-in defaults", e))?;

        let base_file = config_directory.join(CONFIG_FILE_STEM);
        let env_file = config_directory.join(format!("{CONFIG_FILE_STEM}-{environment}"));

        let merged = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name(&base_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                ConfigurationError::load_error(config_directory.display().to_string(), e)
            })?;

        Ok(merged.try_deserialize()?)
    }
}
