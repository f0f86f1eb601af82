//! Page metadata model and the steps that resolve it.
//!
//! # Architecture
//!
//! ```text
//! scan::PathScanner ──► fragment::read_fragments ──► merge::merge_page_meta_data
//!   (PagePath)            (rayon fan-out)               (bucket by `path`)
//!                                                             │
//!                           ┌─────────────────────────────────┴───────────┐
//!                           ▼                                             ▼
//!                  home::resolve_home_page                  subpackage::merge_sub_packages
//!                  home::sort_home_first                    (per sub-package root)
//! ```

pub mod fragment;
pub mod home;
pub mod merge;
pub mod scan;
pub mod subpackage;
pub mod user_config;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Extensions recognized as page-source fragments.
pub const PAGE_EXTENSIONS: &[&str] = &["json5", "jsonc", "json"];

const PAGES_KEY: &str = "pages";
const SUB_PACKAGES_KEY: &str = "subPackages";

/// `type` value that marks a page to be listed first.
pub const HOME_TYPE: &str = "home";

/// One discovered page-source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    /// Relative to `<root>/<out_dir>`, forward slashes (for display)
    pub relative_path: String,
    /// Read key
    pub absolute_path: PathBuf,
}

/// Route record for one page, keyed by `path`.
///
/// `style`, `type` and `home` take any JSON value; only an object `style`,
/// `type: "home"` and `home: true` carry meaning. Attributes other than the
/// ones modelled here are kept verbatim in `attrs`, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetaDatum {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Value>,

    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl PageMetaDatum {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self.home, Some(Value::Bool(true)))
    }

    pub fn is_home_type(&self) -> bool {
        matches!(&self.kind, Some(Value::String(kind)) if kind == HOME_TYPE)
    }
}

/// Sub-package entry declared in the user config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubPackage {
    #[serde(default)]
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageMetaDatum>>,
}

/// Resolved sub-package as written to `pages.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubPackageMeta {
    pub root: String,
    pub pages: Vec<PageMetaDatum>,
}

/// The user's override document (`pages.config.*`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageMetaDatum>>,

    #[serde(rename = "subPackages", default, skip_serializing_if = "Option::is_none")]
    pub sub_packages: Option<Vec<SubPackage>>,

    /// Everything else, copied into the output unchanged
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,

    /// Top-level keys in the order the file declares them
    #[serde(skip)]
    pub key_order: Vec<String>,
}

impl PagesConfig {
    /// Build from a parsed document, remembering its key order.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let key_order = value
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        let mut config: Self = serde_json::from_value(value)?;
        config.key_order = key_order;
        Ok(config)
    }
}

/// The generated `pages.json`.
///
/// Keys follow `key_order`, with `pages` and `subPackages` taking the
/// position they had in the user config. Passthrough keys missing from
/// `key_order` come next, then `pages` and `subPackages` if not yet written.
#[derive(Debug)]
pub struct PagesDocument<'a> {
    pub passthrough: Option<&'a Map<String, Value>>,
    pub key_order: &'a [String],
    pub pages: &'a [PageMetaDatum],
    pub sub_packages: &'a [SubPackageMeta],
}

impl PagesDocument<'_> {
    /// Two-space pretty JSON, or compact when `minify` is set.
    pub fn to_json(&self, minify: bool) -> serde_json::Result<String> {
        if minify {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        }
    }
}

impl Serialize for PagesDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let (mut pages_done, mut sub_done) = (false, false);

        for key in self.key_order {
            match key.as_str() {
                PAGES_KEY if !pages_done => {
                    map.serialize_entry(PAGES_KEY, self.pages)?;
                    pages_done = true;
                }
                SUB_PACKAGES_KEY if !sub_done => {
                    map.serialize_entry(SUB_PACKAGES_KEY, self.sub_packages)?;
                    sub_done = true;
                }
                _ => {
                    if let Some(value) = self.passthrough.and_then(|p| p.get(key)) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }

        for (key, value) in self.passthrough.into_iter().flatten() {
            if !self.key_order.contains(key) {
                map.serialize_entry(key, value)?;
            }
        }
        if !pages_done {
            map.serialize_entry(PAGES_KEY, self.pages)?;
        }
        if !sub_done {
            map.serialize_entry(SUB_PACKAGES_KEY, self.sub_packages)?;
        }

        map.end()
    }
}
