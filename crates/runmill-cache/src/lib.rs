//! Persistent build store for runmill
//!
//! The store is a flat JSON map from absolute source path to the
//! modification timestamp observed at the last successful compile. An entry
//! exists only if its path compiled successfully at least once; absence
//! means "never built", not "known fresh".

mod store;

pub use store::{default_store_path, mtime_seconds, BuildStore};
