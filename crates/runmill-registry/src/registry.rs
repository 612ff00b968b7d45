//! Language registry loading and resolution

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use runmill_foundation::{Result, RunError};
use tracing::debug;

use crate::types::{LanguageDefinition, LanguageTable};

/// Name of the pseudo-language used for extensionless files with the
/// executable bit set.
pub const EXECUTABLE: &str = "executable";

/// Immutable lookup structure built once per invocation.
///
/// Names and aliases share one index; extensions live in another. A token
/// is tried against names first, then extensions, so a language named "sh"
/// shadows a hypothetical ".sh"-less lookup of the same spelling.
pub struct LanguageRegistry {
    by_name: HashMap<String, Arc<LanguageDefinition>>,
    by_extension: HashMap<String, Arc<LanguageDefinition>>,
}

impl LanguageRegistry {
    /// Load the registry from the embedded TOML table.
    pub fn embedded() -> Result<Self> {
        // Table is embedded at compile time
        const LANGUAGES_TOML: &str = include_str!("../languages.toml");

        Self::from_toml_str(LANGUAGES_TOML)
    }

    /// Build a registry from TOML text. Unknown keys in the table are
    /// tolerated so user tables can carry annotations.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: LanguageTable =
            toml::from_str(text).map_err(|e| RunError::registry(e.to_string()))?;
        Ok(Self::from_table(table))
    }

    /// Load a registry from an external TOML file, replacing the embedded
    /// table entirely.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RunError::registry(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    fn from_table(table: LanguageTable) -> Self {
        let mut by_name = HashMap::new();
        let mut by_extension = HashMap::new();

        for (name, entry) in table.languages {
            let definition = Arc::new(LanguageDefinition::from_entry(&name, entry));
            by_name.insert(name.to_lowercase(), Arc::clone(&definition));
            for alias in &definition.aliases {
                by_name.insert(alias.to_lowercase(), Arc::clone(&definition));
            }
            for extension in &definition.file_types {
                by_extension.insert(extension.clone(), Arc::clone(&definition));
            }
        }

        debug!(
            names = by_name.len(),
            extensions = by_extension.len(),
            "Loaded language registry"
        );

        Self { by_name, by_extension }
    }

    /// Resolve a file to its language. An explicit `language` token wins over
    /// the file's extension.
    pub fn resolve(
        &self,
        path: &Path,
        language: Option<&str>,
    ) -> Result<Arc<LanguageDefinition>> {
        match language {
            Some(token) => self.resolve_named(token),
            None => self.resolve_by_path(path),
        }
    }

    /// Look up an explicit language name, alias, or extension. Lookup is
    /// case-insensitive and retries with a leading dot toggled, so "py" and
    /// ".py" are interchangeable.
    pub fn resolve_named(&self, token: &str) -> Result<Arc<LanguageDefinition>> {
        let lowered = token.to_lowercase();
        if let Some(definition) = self.lookup(&lowered) {
            return Ok(definition);
        }

        let toggled = match lowered.strip_prefix('.') {
            Some(rest) => rest.to_string(),
            None => format!(".{lowered}"),
        };
        self.lookup(&toggled)
            .ok_or(RunError::LanguageNotFound(lowered))
    }

    fn lookup(&self, key: &str) -> Option<Arc<LanguageDefinition>> {
        self.by_name
            .get(key)
            .or_else(|| self.by_extension.get(key))
            .cloned()
    }

    /// Resolve from the file's extension. Extensionless files with the
    /// executable bit set fall back to the [`EXECUTABLE`] entry.
    fn resolve_by_path(&self, path: &Path) -> Result<Arc<LanguageDefinition>> {
        let extension = dotted_extension(path);
        if extension.is_empty() && is_executable(path) {
            if let Some(definition) = self.by_name.get(EXECUTABLE) {
                return Ok(Arc::clone(definition));
            }
        }
        self.by_extension
            .get(&extension)
            .cloned()
            .ok_or(RunError::LanguageNotFound(extension))
    }
}

/// The file's extension in the dotted form the table uses (".py"), or an
/// empty string when there is none.
fn dotted_extension(path: &Path) -> String {
    match path.extension() {
        Some(extension) => format!(".{}", extension.to_string_lossy()),
        None => String::new(),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded_table() {
        let registry = LanguageRegistry::embedded().expect("Failed to load embedded table");
        assert!(registry.resolve_named("python").is_ok());
        assert!(registry.resolve_named("c").is_ok());
    }

    #[test]
    fn test_resolve_by_extension() {
        let registry = LanguageRegistry::embedded().unwrap();
        let definition = registry.resolve(Path::new("/tmp/hello.py"), None).unwrap();
        assert_eq!(definition.name, "python");
        assert!(!definition.compiled);
    }

    #[test]
    fn test_extension_lookup_is_case_sensitive() {
        let registry = LanguageRegistry::embedded().unwrap();
        let result = registry.resolve(Path::new("/tmp/HELLO.PY"), None);
        assert!(matches!(result, Err(RunError::LanguageNotFound(_))));
    }

    #[test]
    fn test_resolve_named_is_case_insensitive() {
        let registry = LanguageRegistry::embedded().unwrap();
        assert_eq!(registry.resolve_named("PYTHON").unwrap().name, "python");
        assert_eq!(registry.resolve_named("Py").unwrap().name, "python");
    }

    #[test]
    fn test_resolve_named_toggles_leading_dot() {
        let registry = LanguageRegistry::embedded().unwrap();
        assert_eq!(registry.resolve_named(".py").unwrap().name, "python");
        assert_eq!(registry.resolve_named("py").unwrap().name, "python");
        // ".python" matches nothing directly; stripping the dot finds the name.
        assert_eq!(registry.resolve_named(".python").unwrap().name, "python");
        // "cxx" is neither a name nor an alias; adding the dot finds the extension.
        assert_eq!(registry.resolve_named("cxx").unwrap().name, "cpp");
    }

    #[test]
    fn test_explicit_language_wins_over_extension() {
        let registry = LanguageRegistry::embedded().unwrap();
        let definition = registry
            .resolve(Path::new("/tmp/hello.py"), Some("c"))
            .unwrap();
        assert_eq!(definition.name, "c");
    }

    #[test]
    fn test_unknown_language_reports_token() {
        let registry = LanguageRegistry::embedded().unwrap();
        match registry.resolve_named("Brainfudge") {
            Err(RunError::LanguageNotFound(token)) => assert_eq!(token, "brainfudge"),
            other => panic!("expected LanguageNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_table_replaces_embedded() {
        let registry = LanguageRegistry::from_toml_str(
            r#"
            [languages.zig]
            file-types = [".zig"]
            compiled = true
            compiler-command = "zig build-exe {file_path}"
            run-command = "{output_file}"
            "#,
        )
        .unwrap();
        assert_eq!(registry.resolve_named("zig").unwrap().name, "zig");
        assert!(registry.resolve_named("python").is_err());
    }

    #[test]
    fn test_malformed_table_is_rejected() {
        let result = LanguageRegistry::from_toml_str("[languages.broken]\nfile-types = 3");
        assert!(matches!(result, Err(RunError::Registry(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_extensionless_executable_resolves() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let registry = LanguageRegistry::embedded().unwrap();
        let definition = registry.resolve(&tool, None).unwrap();
        assert_eq!(definition.name, EXECUTABLE);
    }

    #[cfg(unix)]
    #[test]
    fn test_extensionless_without_exec_bit_is_unknown() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("notes");
        std::fs::write(&tool, "plain text").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();

        let registry = LanguageRegistry::embedded().unwrap();
        assert!(matches!(
            registry.resolve(&tool, None),
            Err(RunError::LanguageNotFound(_))
        ));
    }
}
