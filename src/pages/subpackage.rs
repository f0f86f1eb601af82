//! Sub-package partitions.
//!
//! Every scanned sub-package directory becomes one `{ root, pages }` entry,
//! merged against the declared entry with the same `root`. Declared entries
//! with no scanned directory are kept as declared (duplicate paths folded
//! together), so purely declarative sub-packages survive.

use super::{PageMetaDatum, SubPackage, SubPackageMeta, merge::merge_page_meta_data};
use crate::utils::path::slash;
use rustc_hash::FxHashMap;
use std::path::Path;

/// `root` of a sub-package directory: the prefix joined with its base name.
///
/// `("src", "src/pages-shop")` → `src/pages-shop`, `("", "src/pkgA")` → `pkgA`
pub fn sub_package_root(prefix: &str, dir: &Path) -> String {
    let base = dir.file_name().map(Path::new).unwrap_or(dir);
    slash(&Path::new(prefix).join(base))
}

/// Merge scanned partitions (`(root, generated records)` in scan order) with
/// the declared sub-packages.
///
/// Output order: scanned roots first, then unmatched declared roots in
/// declaration order. A root scanned twice keeps its first position and the
/// later records.
pub fn merge_sub_packages(
    scanned: Vec<(String, Vec<PageMetaDatum>)>,
    declared: &[SubPackage],
) -> Vec<SubPackageMeta> {
    let mut result: Vec<SubPackageMeta> = Vec::with_capacity(scanned.len() + declared.len());
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for (root, generated) in scanned {
        let overrides = declared
            .iter()
            .find(|pkg| pkg.root == root)
            .and_then(|pkg| pkg.pages.as_deref())
            .unwrap_or_default();
        let pages = merge_page_meta_data(generated, overrides);

        match index.get(&root) {
            Some(&i) => result[i].pages = pages,
            None => {
                index.insert(root.clone(), result.len());
                result.push(SubPackageMeta { root, pages });
            }
        }
    }

    for pkg in declared {
        if pkg.root.is_empty() || index.contains_key(&pkg.root) {
            continue;
        }
        index.insert(pkg.root.clone(), result.len());
        result.push(SubPackageMeta {
            root: pkg.root.clone(),
            pages: merge_page_meta_data(Vec::new(), pkg.pages.as_deref().unwrap_or_default()),
        });
    }

    result
}
