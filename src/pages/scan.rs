//! Page-source discovery.
//!
//! Walks a directory for files matching `**/*.{json5,jsonc,json}` and drops
//! anything matched by an exclude glob. Exclude patterns are tested against
//! the path relative to the scanned directory and against each of its parent
//! directories, so `node_modules` prunes the whole tree below it.

use super::{PAGE_EXTENSIONS, PagePath};
use crate::{
    config::{ConfigError, MergeConfig},
    utils::path::{rel_path, slash},
};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files found in one sub-package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPackageFiles {
    /// Directory as configured (relative to root)
    pub dir: PathBuf,
    pub files: Vec<PagePath>,
}

/// Lists page-source files under a directory.
#[derive(Debug, Clone)]
pub struct PathScanner {
    extensions: Vec<String>,
    exclude: Vec<Pattern>,
    /// Base for `PagePath::relative_path`
    base: PathBuf,
}

impl PathScanner {
    pub fn new(
        extensions: &[&str],
        exclude: &[String],
        base: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let exclude = exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|err| {
                    ConfigError::Validation(format!("[exclude] invalid pattern `{p}`: {err}"))
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
            exclude,
            base: base.into(),
        })
    }

    /// Scanner for the page-source allow-list with the configured excludes.
    pub fn from_config(config: &MergeConfig) -> Result<Self, ConfigError> {
        Self::new(PAGE_EXTENSIONS, &config.exclude, config.out_base())
    }

    /// Scan one directory. A missing directory yields no files.
    pub fn scan(&self, dir: &Path) -> Vec<PagePath> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(dir)
                    .map_or(true, |rel| rel.as_os_str().is_empty() || !self.is_excluded(rel))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.has_page_extension(e.path()))
            .map(|e| {
                let absolute_path = e.into_path();
                PagePath {
                    relative_path: rel_path(&absolute_path, &self.base),
                    absolute_path,
                }
            })
            .collect()
    }

    /// Scan several directories, concatenating results in order.
    pub fn scan_all(&self, dirs: impl IntoIterator<Item = PathBuf>) -> Vec<PagePath> {
        dirs.into_iter().flat_map(|dir| self.scan(&dir)).collect()
    }

    fn has_page_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn is_excluded(&self, rel: &Path) -> bool {
        let rel = slash(rel);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_with(&rel, MATCH_OPTIONS))
    }
}
