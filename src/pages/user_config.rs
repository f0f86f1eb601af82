//! Loading the user's `pages.config.*`.
//!
//! The first existing file in [`CONFIG_EXTENSIONS`] order wins. JSON-like
//! variants are parsed as JSON5, `toml` with the TOML parser.

use super::PagesConfig;
use crate::error::{PagesError, Result};
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Base name of the user config.
pub const CONFIG_NAME: &str = "pages.config";

/// Recognized extensions, in search order.
pub const CONFIG_EXTENSIONS: &[&str] = &["json5", "jsonc", "json", "toml"];

/// Every existing `pages.config.*` in `root`, in search order.
pub fn config_source_paths(root: &Path) -> Vec<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| root.join(format!("{CONFIG_NAME}.{ext}")))
        .filter(|path| path.is_file())
        .collect()
}

/// Path of the config that would be loaded.
pub fn find_user_config(root: &Path) -> Option<PathBuf> {
    config_source_paths(root).into_iter().next()
}

/// Load the user config from `root`.
///
/// # Errors
///
/// [`PagesError::ConfigNotFound`] if no candidate exists; parse and IO
/// errors name the offending file.
pub fn load_user_config(root: &Path) -> Result<(PathBuf, PagesConfig)> {
    let path = find_user_config(root).ok_or_else(|| PagesError::ConfigNotFound {
        root: root.to_path_buf(),
    })?;
    let content = fs::read_to_string(&path).map_err(|err| PagesError::io(&path, err))?;

    let document: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| PagesError::parse(&path, err))?,
        _ => json5::from_str(&content).map_err(|err| PagesError::parse(&path, err))?,
    };
    let config = PagesConfig::from_value(document).map_err(|err| PagesError::parse(&path, err))?;

    Ok((path, config))
}
