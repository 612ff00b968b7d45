//! Build store persistence (~/.runmill/store.json)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use runmill_foundation::{Result, RunError};
use tracing::debug;

/// Default store location (~/.runmill/store.json)
pub fn default_store_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        RunError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".runmill").join("store.json"))
}

/// The file's modification time as fractional seconds since the epoch.
/// Sub-second precision is kept so two edits within the same second still
/// produce distinct timestamps on filesystems that record them.
pub fn mtime_seconds(path: &Path) -> Result<f64> {
    let modified = fs::metadata(path)?.modified()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).unwrap_or_default();
    Ok(since_epoch.as_secs_f64())
}

/// Persistent map from absolute source path to the mtime recorded at the
/// last successful compile.
///
/// The backing file is read fully at open, mutated in memory, and rewritten
/// whole on every [`BuildStore::record_built`]. Concurrent invocations
/// sharing one store race benignly; the last writer wins.
pub struct BuildStore {
    path: PathBuf,
    entries: HashMap<String, f64>,
}

impl BuildStore {
    /// Open the store at `path`, creating an empty one (and its parent
    /// directory) on first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "{}")?;
            debug!(store = %path.display(), "Created empty build store");
        }

        let text = fs::read_to_string(&path)?;
        let entries: HashMap<String, f64> = serde_json::from_str(&text)?;

        Ok(Self { path, entries })
    }

    /// The recorded mtime for `path`, if it was ever built.
    pub fn entry(&self, path: &Path) -> Option<f64> {
        self.entries.get(&store_key(path)).copied()
    }

    /// Whether `path` must be recompiled: true when no entry exists or the
    /// stored timestamp differs from the file's current mtime.
    ///
    /// The comparison is strict equality, not ordering. An entry is fresh
    /// only while the current mtime equals the recorded one; an mtime moved
    /// backward to exactly the recorded value reads as fresh.
    pub fn is_stale(&self, path: &Path) -> Result<bool> {
        match self.entry(path) {
            None => Ok(true),
            Some(recorded) => Ok(mtime_seconds(path)? != recorded),
        }
    }

    /// Record a successful build of `path` at `mtime` and flush the whole
    /// store to disk before returning.
    pub fn record_built(&mut self, path: &Path, mtime: f64) -> Result<()> {
        self.entries.insert(store_key(path), mtime);
        self.flush()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string(&self.entries)?;
        fs::write(&self.path, text)?;
        debug!(
            store = %self.path.display(),
            entries = self.entries.len(),
            "Flushed build store"
        );
        Ok(())
    }
}

/// Store keys are the path's string form; callers absolutize before use so
/// the same file maps to the same key from any working directory.
fn store_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> BuildStore {
        BuildStore::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn test_open_creates_empty_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = BuildStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_missing_entry_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.c");
        fs::write(&source, "int main() {}").unwrap();

        let store = store_in(&dir);
        assert_eq!(store.entry(&source), None);
        assert!(store.is_stale(&source).unwrap());
    }

    #[test]
    fn test_recorded_mtime_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.c");
        fs::write(&source, "int main() {}").unwrap();

        let mut store = store_in(&dir);
        let mtime = mtime_seconds(&source).unwrap();
        store.record_built(&source, mtime).unwrap();

        assert_eq!(store.entry(&source), Some(mtime));
        assert!(!store.is_stale(&source).unwrap());
    }

    #[test]
    fn test_differing_mtime_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.c");
        fs::write(&source, "int main() {}").unwrap();

        let mut store = store_in(&dir);
        let mtime = mtime_seconds(&source).unwrap();
        store.record_built(&source, mtime + 1.0).unwrap();

        assert!(store.is_stale(&source).unwrap());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.c");
        fs::write(&source, "int main() {}").unwrap();
        let mtime = mtime_seconds(&source).unwrap();

        {
            let mut store = store_in(&dir);
            store.record_built(&source, mtime).unwrap();
        }

        let reopened = store_in(&dir);
        assert_eq!(reopened.entry(&source), Some(mtime));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_fractional_mtime_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hello.c");
        fs::write(&source, "int main() {}").unwrap();

        let mtime = 1_724_592_001.348_901_2_f64;
        {
            let mut store = store_in(&dir);
            store.record_built(&source, mtime).unwrap();
        }

        let reopened = store_in(&dir);
        assert_eq!(reopened.entry(&source), Some(mtime));
    }

    #[test]
    fn test_corrupt_store_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            BuildStore::open(&path),
            Err(RunError::Json(_))
        ));
    }

    #[test]
    fn test_default_store_path_location() {
        let path = default_store_path().unwrap();
        assert!(path.ends_with(".runmill/store.json"));
    }
}
