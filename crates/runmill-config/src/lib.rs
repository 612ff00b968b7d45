//! Configuration management and logging setup for runmill

pub mod config;
pub mod logging;

pub use config::{AppConfig, CacheConfig, LanguagesConfig, LogFormat, LoggingConfig};
