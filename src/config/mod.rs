//! Options management for `pages-merge.toml`.
//!
//! The options file is optional; every field has a default. CLI flags are
//! applied on top and all paths are resolved against the project root.
//!
//! # Example
//!
//! ```toml
//! dirs = ["src/pages"]
//! sub_packages = ["src/pages-sub", "src/pages-shop"]
//! sub_root_prefix = ""
//! exclude = ["node_modules", "**/__*__/**"]
//! out_dir = "src"
//! merge_pages = true
//! minify = false
//! home_page = ["pages/index/index"]
//! debug = "pages,hmr"
//!
//! [serve]
//! port = 5278
//! ```

pub mod defaults;
mod error;
mod serve;

pub use error::ConfigError;
pub use serve::ServeConfig;

use crate::{
    cli::{Cli, Commands},
    logger::DebugFilter,
    utils::path::normalize_path,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File name of the generated document inside `out_dir`.
pub const OUTPUT_NAME: &str = "pages.json";

// ============================================================================
// Debug Option
// ============================================================================

/// `debug = true` or `debug = "pages,hmr"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugOption {
    Flag(bool),
    Namespaces(String),
}

impl Default for DebugOption {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl DebugOption {
    pub fn filter(&self) -> DebugFilter {
        match self {
            Self::Flag(true) => DebugFilter::All,
            Self::Flag(false) => DebugFilter::Off,
            Self::Namespaces(names) => DebugFilter::parse(names),
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Resolved options, fixed for the lifetime of the process.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Absolute path to the options file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute path of the generated `pages.json`
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./").join(defaults::pages::out_dir()).join(OUTPUT_NAME))]
    pub output_path: PathBuf,

    /// Top-level page directories, relative to root
    #[serde(default = "defaults::pages::dirs")]
    #[educe(Default = defaults::pages::dirs())]
    pub dirs: Vec<PathBuf>,

    /// Sub-package directories, relative to root
    #[serde(default = "defaults::pages::sub_packages")]
    #[educe(Default = defaults::pages::sub_packages())]
    pub sub_packages: Vec<PathBuf>,

    /// Prefix joined with a sub-package directory name to form its `root`
    #[serde(default = "defaults::pages::sub_root_prefix")]
    #[educe(Default = defaults::pages::sub_root_prefix())]
    pub sub_root_prefix: String,

    /// Glob patterns excluded from scanning
    #[serde(default = "defaults::pages::exclude")]
    #[educe(Default = defaults::pages::exclude())]
    pub exclude: Vec<String>,

    /// Directory receiving `pages.json`, relative to root
    #[serde(default = "defaults::pages::out_dir")]
    #[educe(Default = defaults::pages::out_dir())]
    pub out_dir: PathBuf,

    /// Scan and merge page fragments; when false the user config passes through
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub merge_pages: bool,

    /// Write compact JSON
    #[serde(default = "defaults::r#false")]
    pub minify: bool,

    /// Home page candidates, checked in record order
    #[serde(default = "defaults::pages::home_page")]
    #[educe(Default = defaults::pages::home_page())]
    pub home_page: Vec<String>,

    /// Debug namespaces
    #[serde(default)]
    pub debug: DebugOption,

    /// Reload socket settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl MergeConfig {
    /// Parse options from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: MergeConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load options from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load options for the given CLI invocation; a missing file means defaults.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path and re-derive the output path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
        self.output_path = self.root.join(&self.out_dir).join(OUTPUT_NAME);
    }

    /// Resolve a configured directory against the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Base directory for `PagePath::relative_path`
    pub fn out_base(&self) -> PathBuf {
        self.root.join(&self.out_dir)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        Self::update_option(&mut self.out_dir, cli.out_dir.as_ref());
        Self::update_option(&mut self.minify, cli.minify.as_ref());
        if let Some(names) = &cli.debug {
            self.debug = DebugOption::Namespaces(names.clone());
        }

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        let root = normalize_path(cli.root.as_deref().unwrap_or(Path::new("./")));
        self.config_path = normalize_path(&root.join(&cli.config));
        self.set_root(&root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate option values
    pub fn validate(&self) -> Result<()> {
        if self.out_dir.is_absolute() {
            bail!(ConfigError::Validation(
                "[out_dir] must be relative to the project root".into()
            ));
        }

        if self.merge_pages && self.dirs.is_empty() {
            bail!(ConfigError::Validation(
                "[dirs] must not be empty when [merge_pages] is enabled".into()
            ));
        }

        for pattern in &self.exclude {
            if let Err(err) = glob::Pattern::new(pattern) {
                bail!(ConfigError::Validation(format!(
                    "[exclude] invalid pattern `{pattern}`: {err}"
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MergeConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.dirs, vec![PathBuf::from("src/pages")]);
        assert!(config.sub_packages.is_empty());
        assert_eq!(config.sub_root_prefix, "");
        assert_eq!(config.out_dir, PathBuf::from("src"));
        assert!(config.merge_pages);
        assert!(!config.minify);
        assert_eq!(config.home_page, vec!["pages/index", "pages/index/index"]);
        assert_eq!(config.debug, DebugOption::Flag(false));
        assert_eq!(config.output_path, PathBuf::from("./src/pages.json"));
    }

    #[test]
    fn test_empty_file_matches_defaults() {
        let config = MergeConfig::from_str("").unwrap();
        assert_eq!(config.dirs, MergeConfig::default().dirs);
        assert_eq!(config.exclude, defaults::pages::exclude());
        assert!(config.merge_pages);
    }

    #[test]
    fn test_full_options() {
        let config = MergeConfig::from_str(
            r#"
            dirs = ["src/views"]
            sub_packages = ["src/pkgA", "src/pkgB"]
            sub_root_prefix = "src"
            exclude = ["**/components/**"]
            out_dir = "app"
            merge_pages = false
            minify = true
            home_page = ["views/home"]
            debug = true
        "#,
        )
        .unwrap();

        assert_eq!(config.dirs, vec![PathBuf::from("src/views")]);
        assert_eq!(config.sub_packages.len(), 2);
        assert_eq!(config.sub_root_prefix, "src");
        assert_eq!(config.exclude, vec!["**/components/**"]);
        assert_eq!(config.out_dir, PathBuf::from("app"));
        assert!(!config.merge_pages);
        assert!(config.minify);
        assert_eq!(config.home_page, vec!["views/home"]);
        assert_eq!(config.debug.filter(), DebugFilter::All);
    }

    #[test]
    fn test_debug_namespaces() {
        let config = MergeConfig::from_str(r#"debug = "pages,hmr""#).unwrap();
        let filter = config.debug.filter();
        assert!(filter.enabled("pages"));
        assert!(!filter.enabled("options"));
    }

    #[test]
    fn test_set_root_updates_output_path() {
        let mut config = MergeConfig::default();
        config.out_dir = PathBuf::from("app");
        config.set_root(Path::new("/project"));

        assert_eq!(config.get_root(), Path::new("/project"));
        assert_eq!(config.output_path, PathBuf::from("/project/app/pages.json"));
        assert_eq!(config.out_base(), PathBuf::from("/project/app"));
        assert_eq!(
            config.resolve(Path::new("src/pages")),
            PathBuf::from("/project/src/pages")
        );
    }

    #[test]
    fn test_validate_rejects_bad_exclude() {
        let mut config = MergeConfig::default();
        config.exclude = vec!["[".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_dirs() {
        let mut config = MergeConfig::default();
        config.dirs.clear();
        assert!(config.validate().is_err());

        config.merge_pages = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result = MergeConfig::from_str(r#"pages_dir = "src""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(MergeConfig::from_str("dirs = [").is_err());
    }
}
