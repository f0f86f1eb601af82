//! File category classification for watch mode.
//!
//! | Category   | On change            | Example Files                     |
//! |------------|----------------------|-----------------------------------|
//! | Page       | Full rebuild         | `src/pages/index/index.json5`     |
//! | Config     | Full rebuild         | `pages.config.json5`              |
//! | Output     | Ignored              | `src/pages.json`                  |
//! | Unknown    | Ignored              | `.DS_Store`, `*.vue`              |

use super::path::normalize_path;
use crate::{
    config::{MergeConfig, OUTPUT_NAME},
    pages::{PAGE_EXTENSIONS, user_config::CONFIG_NAME},
};
use std::path::Path;

/// Category of a changed file, used by the watcher to decide on a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    /// Route fragment inside a page or sub-package directory
    Page,
    /// User override document (`pages.config.*`)
    Config,
    /// The generated `pages.json`
    Output,
    /// Anything else
    Unknown,
}

impl FileCategory {
    /// Get the short name for this category (used in logs)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Config => "config",
            Self::Output => "output",
            Self::Unknown => "unknown",
        }
    }
}

/// Categorize a file path. The output document is checked first, since its
/// extension is also a page-source extension.
pub fn categorize_path(path: &Path, config: &MergeConfig) -> FileCategory {
    if is_output_file(path, config) {
        FileCategory::Output
    } else if is_page_source(path) {
        FileCategory::Page
    } else if is_config_file(path) {
        FileCategory::Config
    } else {
        FileCategory::Unknown
    }
}

/// Whether the extension is in the page-source allow-list.
pub fn is_page_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext))
}

/// Whether the file name looks like a user config source.
pub fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(CONFIG_NAME))
}

/// Whether the path is the generated document, either at the configured
/// output location or at `<root>/pages.json`.
pub fn is_output_file(path: &Path, config: &MergeConfig) -> bool {
    let path = normalize_path(path);
    let candidates = [
        config.output_path.clone(),
        config.get_root().join(OUTPUT_NAME),
    ];
    candidates
        .iter()
        .any(|candidate| path == *candidate || path == normalize_path(candidate))
}
