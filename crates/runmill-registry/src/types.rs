//! Data structures for the language definition table

use serde::Deserialize;
use std::collections::HashMap;

/// Raw language table as authored in `languages.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageTable {
    /// Map of canonical language name to its definition
    pub languages: HashMap<String, LanguageEntry>,
}

/// Configuration for a single language, as it appears in the table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LanguageEntry {
    /// Dotted file extensions (".py") resolving to this language
    #[serde(default)]
    pub file_types: Vec<String>,

    /// Alternate names resolving to this language
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Whether a separate compile step exists
    #[serde(default)]
    pub compiled: bool,

    /// Compiler command template (only meaningful when `compiled`)
    #[serde(default)]
    pub compiler_command: String,

    /// Run command template
    pub run_command: String,

    /// Arguments appended to the compiler invocation unless overridden
    #[serde(default)]
    pub default_args: String,
}

/// A resolved language: its table entry plus the canonical name it was
/// registered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDefinition {
    pub name: String,
    pub file_types: Vec<String>,
    pub aliases: Vec<String>,
    pub compiled: bool,
    pub compiler_command: String,
    pub run_command: String,
    pub default_args: String,
}

impl LanguageDefinition {
    pub(crate) fn from_entry(name: &str, entry: LanguageEntry) -> Self {
        Self {
            name: name.to_string(),
            file_types: entry.file_types,
            aliases: entry.aliases,
            compiled: entry.compiled,
            compiler_command: entry.compiler_command,
            run_command: entry.run_command,
            default_args: entry.default_args,
        }
    }
}
