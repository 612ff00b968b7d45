//! Centralized logging initialization with environment variable support

use crate::{AppConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: standard Rust log filter (takes precedence over all)
/// - `LOG_FORMAT`: override format (json, pretty)
///
/// The `verbose` flag raises the base level to `debug`, matching `-v` on
/// the command line. Logs always go to stderr; stdout carries only the
/// launched program's output and the result lines.
pub fn initialize(config: &AppConfig, verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(tracing::Level::WARN)
    };

    // RUST_LOG takes precedence over the configured level
    let env_filter = EnvFilter::from_default_env().add_directive(log_level.into());

    // Check for LOG_FORMAT env override
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| match f.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "human" => Some(LogFormat::Pretty),
            _ => None,
        })
        .unwrap_or_else(|| config.logging.format.clone());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
