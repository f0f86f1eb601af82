//! Path helpers.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Normalize a path to absolute form for reliable comparison.
///
/// Config paths are already canonicalized, so incoming paths (e.g., from the
/// file watcher) are canonicalized before comparison.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a path with forward slashes.
pub fn slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Path of `path` relative to `base` with forward slashes,
/// or the full path when it lies outside `base`.
///
/// `/proj/src/pages/index.json` relative to `/proj/src` → `pages/index.json`
pub fn rel_path(path: &Path, base: &Path) -> String {
    slash(path.strip_prefix(base).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.json"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_rel_path_inside_base() {
        assert_eq!(
            rel_path(Path::new("/proj/src/pages/index.json"), Path::new("/proj/src")),
            "pages/index.json"
        );
    }

    #[test]
    fn test_rel_path_outside_base() {
        assert_eq!(
            rel_path(Path::new("/other/index.json"), Path::new("/proj/src")),
            "/other/index.json"
        );
    }
}
