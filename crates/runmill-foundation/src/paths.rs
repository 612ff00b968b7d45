//! Path derivations shared across the workspace

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Derive the compiled-artifact path for a source file: the same directory
/// and file name with the final extension stripped. `src/hello.c` maps to
/// `src/hello`; a file with no extension maps to itself.
pub fn artifact_path(source: &Path) -> PathBuf {
    source.with_extension("")
}

/// Absolutize a path against the current working directory, collapsing `.`
/// and `..` components lexically. Symlinks are not resolved, so the same
/// invocation from the same directory always produces the same key.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };
    Ok(normalize(&joined))
}

/// Lexical cleanup of an absolute path. `..` at the root is clamped rather
/// than preserved.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path_strips_extension() {
        assert_eq!(artifact_path(Path::new("hello.c")), PathBuf::from("hello"));
        assert_eq!(
            artifact_path(Path::new("/tmp/project/main.cpp")),
            PathBuf::from("/tmp/project/main")
        );
    }

    #[test]
    fn test_artifact_path_strips_only_final_extension() {
        assert_eq!(
            artifact_path(Path::new("bundle.tar.gz")),
            PathBuf::from("bundle.tar")
        );
    }

    #[test]
    fn test_artifact_path_without_extension_is_identity() {
        assert_eq!(artifact_path(Path::new("/usr/bin/tool")), PathBuf::from("/usr/bin/tool"));
        assert_eq!(artifact_path(Path::new(".bashrc")), PathBuf::from(".bashrc"));
    }

    #[test]
    fn test_absolutize_keeps_absolute_paths() {
        let path = absolutize(Path::new("/tmp/hello.c")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/hello.c"));
    }

    #[test]
    fn test_absolutize_collapses_dot_components() {
        let path = absolutize(Path::new("/tmp/./a/../b/hello.c")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/b/hello.c"));
    }

    #[test]
    fn test_absolutize_clamps_parent_at_root() {
        let path = absolutize(Path::new("/../../etc/passwd")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/passwd"));
    }

    #[test]
    fn test_absolutize_anchors_relative_paths() {
        let cwd = env::current_dir().unwrap();
        let path = absolutize(Path::new("hello.c")).unwrap();
        assert_eq!(path, cwd.join("hello.c"));
    }
}
