//! Merging generated route records with user overrides.
//!
//! Overrides are appended after the generated records, then every record is
//! grouped by `path` in first-seen order. Inside a group the first record is
//! the base and each later one is folded onto it with [`merge_record`]:
//!
//! ```text
//! generated { path: "a", style: { color: "red" } }
//! override  { path: "a", style: { size: 10 }, title: "T" }
//!        ──► { path: "a", style: { color: "red", size: 10 }, title: "T" }
//! ```
//!
//! `style` is merged key by key (one level deep) when both sides are objects,
//! otherwise the later `style` replaces the earlier one. Any other attribute present
//! on the later record replaces the earlier value, so overrides win.

use super::PageMetaDatum;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Fold `later` onto `base`, returning a new record.
pub fn merge_record(base: &PageMetaDatum, later: &PageMetaDatum) -> PageMetaDatum {
    let mut merged = base.clone();

    if let Some(style) = &later.style {
        match (&mut merged.style, style) {
            (Some(Value::Object(target)), Value::Object(source)) => {
                for (key, value) in source {
                    target.insert(key.clone(), value.clone());
                }
            }
            (slot, _) => *slot = Some(style.clone()),
        }
    }
    if later.kind.is_some() {
        merged.kind.clone_from(&later.kind);
    }
    if later.home.is_some() {
        merged.home.clone_from(&later.home);
    }
    for (key, value) in &later.attrs {
        merged.attrs.insert(key.clone(), value.clone());
    }

    merged
}

/// Merge generated records with overrides, one record per distinct `path`.
pub fn merge_page_meta_data(
    generated: Vec<PageMetaDatum>,
    overrides: &[PageMetaDatum],
) -> Vec<PageMetaDatum> {
    let mut merged: Vec<PageMetaDatum> = Vec::with_capacity(generated.len() + overrides.len());
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for record in generated.into_iter().chain(overrides.iter().cloned()) {
        match index.get(&record.path) {
            Some(&i) => merged[i] = merge_record(&merged[i], &record),
            None => {
                index.insert(record.path.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}
