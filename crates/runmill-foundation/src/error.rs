//! Error handling for runmill
//!
//! [`RunError`] covers everything that can stop a launch before or while the
//! child processes are managed: resolution failures, table and configuration
//! problems, store I/O, and spawn failures. A compiler or program that starts
//! but exits nonzero is not an error here; those outcomes travel through the
//! launch report so the caller decides the final exit status.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type used throughout runmill
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RunError {
    /// The requested language token matched no name, alias, or extension
    #[error("Language '{0}' does not exist")]
    LanguageNotFound(String),

    /// A compile was requested for a language with no compile step
    #[error("Language '{0}' is not a compiled language")]
    NotCompiled(String),

    /// Run-only mode needs an artifact that has never been built
    #[error("No existing binary for {}", .0.display())]
    MissingArtifact(PathBuf),

    /// The input file is missing
    #[error("File {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The language table could not be read or parsed
    #[error("Failed to load language table: {0}")]
    Registry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The child process never started
    #[error("Failed to spawn '{program}'. Is '{program}' installed and in PATH? ({source})")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunError {
    /// Create a new registry load error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new spawn error
    pub fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RunError>;
