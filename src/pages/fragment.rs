//! Route fragment reading.
//!
//! A fragment is a JSON5 document next to a page source that declares one or
//! more routes under `pages`:
//!
//! ```json5
//! // src/pages/index/index.json5
//! {
//!   pages: [
//!     { path: "pages/index/index", type: "home", style: { navigationBarTitleText: "Home" } },
//!   ],
//! }
//! ```
//!
//! Reads fan out on the rayon pool. A broken fragment does not stop its
//! siblings from loading; every failure is logged with its path and the
//! batch then fails as a whole with [`PagesError::Fragments`].

use super::{PageMetaDatum, PagePath};
use crate::{
    error::{PagesError, Result},
    logger::Logger,
};
use rayon::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

/// Parsed content of one fragment file. Keys other than `pages` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteFragment {
    pub pages: Vec<PageMetaDatum>,
}

/// Read and parse one fragment file.
pub fn read_fragment(path: &Path) -> Result<RouteFragment> {
    let content = fs::read_to_string(path).map_err(|err| PagesError::io(path, err))?;
    parse_fragment(&content, path)
}

/// Parse fragment text; `path` only labels errors.
pub fn parse_fragment(content: &str, path: &Path) -> Result<RouteFragment> {
    json5::from_str(content).map_err(|err| PagesError::parse(path, err))
}

/// Read all fragments and flatten their `pages`, keeping input order.
pub fn read_fragments(pages: &[PagePath], logger: &Logger) -> Result<Vec<PageMetaDatum>> {
    let results: Vec<Result<RouteFragment>> = pages
        .par_iter()
        .map(|page| read_fragment(&page.absolute_path))
        .collect();

    let mut records = Vec::new();
    let mut failures = Vec::new();

    for (page, result) in pages.iter().zip(results) {
        match result {
            Ok(fragment) => {
                logger.debug(
                    "pages",
                    format_args!("{}: {} route(s)", page.relative_path, fragment.pages.len()),
                );
                records.extend(fragment.pages);
            }
            Err(err) => {
                logger.error(&err);
                failures.push(err);
            }
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        Err(PagesError::Fragments(failures))
    }
}
