//! Pipeline error types.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving `pages.json`.
#[derive(Debug, Error)]
pub enum PagesError {
    #[error("can't find pages.config in `{}`, please create pages.config.(json5|jsonc|json|toml)", .root.display())]
    ConfigNotFound { root: PathBuf },

    #[error("failed to parse `{}`: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} route fragment(s) failed to load: {}", .0.len(), failed_paths(.0))]
    Fragments(Vec<PagesError>),

    #[error("IO error on `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize pages.json")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PagesError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Errors after which the process must stop.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }

    /// Path of the file this error is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::ConfigNotFound { root } => Some(root),
            Self::Parse { path, .. } | Self::Io { path, .. } => Some(path),
            Self::Fragments(_) | Self::Serialize(_) | Self::Config(_) => None,
        }
    }
}

fn failed_paths(errors: &[PagesError]) -> String {
    errors
        .iter()
        .filter_map(PagesError::path)
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = PagesError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_names_root() {
        let err = PagesError::ConfigNotFound {
            root: PathBuf::from("/project"),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("/project"));
    }

    #[test]
    fn test_fragments_lists_every_path() {
        let err = PagesError::Fragments(vec![
            PagesError::parse("/p/a.json", "bad"),
            PagesError::parse("/p/b.json", "worse"),
        ]);
        let display = err.to_string();
        assert!(display.starts_with("2 route fragment(s)"));
        assert!(display.contains("/p/a.json"));
        assert!(display.contains("/p/b.json"));
        assert!(!err.is_fatal());
    }
}
