//! Home page resolution.

use super::PageMetaDatum;
use crate::logger::Logger;
use serde_json::Value;
use std::path::PathBuf;

const NO_HOME_WARNING: &str = "No home page found, check the pages of pages.config, \
     add the page to the `home_page` option, or set `type: \"home\"` in its route fragment.";

/// Outcome of [`set_home_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomePage {
    /// A record already was the home page, or sub-packages own it.
    Existing,
    /// The record with this path was marked `home: true`.
    Assigned(String),
    NotFound,
}

/// Mark the home page in `pages`.
///
/// Short-circuits on the first rule that applies:
/// 1. a record has `home: true`, or its first path segment names one of
///    `sub_packages` (those pages live in their own partition): no change;
/// 2. the first record whose `path` is in `candidates` gets `home: true`;
/// 3. nothing matched.
pub fn set_home_page(
    pages: &mut [PageMetaDatum],
    candidates: &[String],
    sub_packages: &[PathBuf],
) -> HomePage {
    let sub_roots: Vec<&str> = sub_packages
        .iter()
        .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()))
        .collect();

    let has_home = pages.iter().any(|page| {
        let base = page.path.split('/').next().unwrap_or_default();
        page.is_home() || sub_roots.contains(&base)
    });
    if has_home {
        return HomePage::Existing;
    }

    match pages
        .iter_mut()
        .find(|page| candidates.iter().any(|c| *c == page.path))
    {
        Some(page) => {
            page.home = Some(Value::Bool(true));
            HomePage::Assigned(page.path.clone())
        }
        None => HomePage::NotFound,
    }
}

/// [`set_home_page`], warning once when no home page could be determined.
pub fn resolve_home_page(
    pages: &mut [PageMetaDatum],
    candidates: &[String],
    sub_packages: &[PathBuf],
    logger: &Logger,
) -> HomePage {
    let outcome = set_home_page(pages, candidates, sub_packages);
    match &outcome {
        HomePage::Existing => logger.debug("pages", "home page already set"),
        HomePage::Assigned(path) => logger.debug("pages", format_args!("home page: {path}")),
        HomePage::NotFound => logger.warn(NO_HOME_WARNING),
    }
    outcome
}

/// Move records with `type: "home"` to the front, keeping relative order
/// within both groups.
pub fn sort_home_first(pages: &mut [PageMetaDatum]) {
    pages.sort_by_key(|page| !page.is_home_type());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pages(paths: &[&str]) -> Vec<PageMetaDatum> {
        paths.iter().map(|p| PageMetaDatum::new(*p)).collect()
    }

    fn candidates(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn test_existing_home_is_left_alone() {
        let mut records = pages(&["a", "b"]);
        records[1].home = Some(json!(true));
        let before = records.clone();

        let outcome = set_home_page(&mut records, &candidates(&["a"]), &[]);

        assert_eq!(outcome, HomePage::Existing);
        assert_eq!(records, before);
    }

    #[test]
    fn test_candidate_gets_home_flag() {
        let mut records = pages(&["a", "b", "c"]);

        let outcome = set_home_page(&mut records, &candidates(&["x", "b"]), &[]);

        assert_eq!(outcome, HomePage::Assigned("b".into()));
        assert_eq!(records[1].home, Some(json!(true)));
        assert_eq!(records[0], PageMetaDatum::new("a"));
        assert_eq!(records[2], PageMetaDatum::new("c"));
    }

    #[test]
    fn test_first_matching_record_wins() {
        let mut records = pages(&["b", "a"]);

        let outcome = set_home_page(&mut records, &candidates(&["a", "b"]), &[]);

        assert_eq!(outcome, HomePage::Assigned("b".into()));
        assert_eq!(records[1].home, None);
    }

    #[test]
    fn test_sub_package_page_counts_as_home() {
        let mut records = pages(&["pkgA/list", "pages/other"]);
        let before = records.clone();

        let outcome = set_home_page(
            &mut records,
            &candidates(&["pages/other"]),
            &[PathBuf::from("src/pkgA")],
        );

        assert_eq!(outcome, HomePage::Existing);
        assert_eq!(records, before);
    }

    #[test]
    fn test_not_found_warns_once_and_mutates_nothing() {
        let mut records = pages(&["a", "b"]);
        let before = records.clone();
        let logger = Logger::default();

        let outcome = resolve_home_page(&mut records, &candidates(&["z"]), &[], &logger);

        assert_eq!(outcome, HomePage::NotFound);
        assert_eq!(records, before);
        assert_eq!(logger.warning_count(), 1);
    }

    #[test]
    fn test_non_boolean_home_is_not_a_home_page() {
        let mut records = pages(&["a", "b"]);
        records[0].home = Some(json!("yes"));

        let outcome = set_home_page(&mut records, &candidates(&["b"]), &[]);

        assert_eq!(outcome, HomePage::Assigned("b".into()));
        assert_eq!(records[0].home, Some(json!("yes")));
    }

    #[test]
    fn test_sort_home_first_is_stable() {
        let mut records: Vec<PageMetaDatum> = [
            json!({ "path": "a" }),
            json!({ "path": "h1", "type": "home" }),
            json!({ "path": "b" }),
            json!({ "path": "h2", "type": "home" }),
            json!({ "path": "c", "type": "page" }),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        sort_home_first(&mut records);

        let paths: Vec<_> = records.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["h1", "h2", "a", "b", "c"]);
    }
}
