//! Foundation layer - shared error types and path helpers
//!
//! Every other runmill crate builds on this one. It owns the workspace-wide
//! [`RunError`] type and the small set of path derivations (artifact paths,
//! store keys) that the registry, cache, and engine all agree on.

pub mod error;
pub mod paths;

// Re-export commonly used types for convenience
pub use error::{Result, RunError};
