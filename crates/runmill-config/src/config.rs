//! Configuration management for runmill

use runmill_foundation::{Result, RunError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language table configuration
    #[serde(default)]
    pub languages: LanguagesConfig,
    /// Build store configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language table configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// External TOML table replacing the embedded one
    pub file: Option<PathBuf>,
}

/// Build store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store file location; defaults to ~/.runmill/store.json
    pub path: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            // Launch result lines go to stdout on their own; logs default
            // to warnings only so they stay out of the way.
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from config files and the environment.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (RUNMILL__*)
    /// 2. First existing TOML file: ./runmill.toml, ~/.runmill/config.toml
    /// 3. Default values
    pub fn load() -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Toml},
            Figment,
        };

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        for path in Self::config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading TOML configuration");
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        let figment = figment.merge(Env::prefixed("RUNMILL__").split("__"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| RunError::config(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("runmill.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".runmill").join("config.toml"));
        }
        paths
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(RunError::config(format!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        // LogFormat enum ensures valid format values at compile time

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.languages.file.is_none());
        assert!(config.cache.path.is_none());
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = AppConfig::default();
        config.logging.level = "noisy".to_string();
        assert!(matches!(config.validate(), Err(RunError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_env_variables_override_defaults() {
        std::env::set_var("RUNMILL__LOGGING__LEVEL", "debug");
        std::env::set_var("RUNMILL__CACHE__PATH", "/tmp/runmill-test-store.json");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.cache.path,
            Some(PathBuf::from("/tmp/runmill-test-store.json"))
        );

        std::env::remove_var("RUNMILL__LOGGING__LEVEL");
        std::env::remove_var("RUNMILL__CACHE__PATH");
    }

    #[test]
    #[serial]
    fn test_invalid_env_level_is_rejected() {
        std::env::set_var("RUNMILL__LOGGING__LEVEL", "shout");

        let result = AppConfig::load();
        assert!(matches!(result, Err(RunError::Config(_))));

        std::env::remove_var("RUNMILL__LOGGING__LEVEL");
    }
}
