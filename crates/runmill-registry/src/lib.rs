//! Language definition table and resolution
//!
//! A [`LanguageRegistry`] maps language names, aliases, and dotted file
//! extensions to [`LanguageDefinition`]s. The table ships embedded in the
//! binary and can be replaced wholesale by an external TOML file. Name and
//! alias lookup is case-insensitive; extension lookup is case-sensitive.

mod registry;
mod types;

pub use registry::{LanguageRegistry, EXECUTABLE};
pub use types::{LanguageDefinition, LanguageEntry, LanguageTable};
