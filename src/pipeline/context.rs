//! Orchestration context shared by pipeline phases and hooks.

use crate::{
    config::MergeConfig,
    logger::Logger,
    pages::{
        PageMetaDatum, PagePath, PagesConfig, PagesDocument, SubPackageMeta, home::HomePage,
        scan::SubPackageFiles,
    },
};
use std::{path::PathBuf, sync::Arc};

/// State threaded through one pipeline run.
///
/// Hooks receive `&mut PageContext` between phases and may change any field;
/// later phases read whatever is there.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub options: Arc<MergeConfig>,
    pub logger: Logger,

    /// File the user config was loaded from
    pub user_config_path: Option<PathBuf>,
    pub pages_config: Option<PagesConfig>,

    pub pages_path: Vec<PagePath>,
    pub sub_pages_path: Vec<SubPackageFiles>,

    pub page_meta_data: Vec<PageMetaDatum>,
    pub sub_page_meta_data: Vec<SubPackageMeta>,
    pub home_page: Option<HomePage>,
}

impl PageContext {
    pub fn new(options: Arc<MergeConfig>, logger: Logger) -> Self {
        Self {
            options,
            logger,
            user_config_path: None,
            pages_config: None,
            pages_path: Vec::new(),
            sub_pages_path: Vec::new(),
            page_meta_data: Vec::new(),
            sub_page_meta_data: Vec::new(),
            home_page: None,
        }
    }

    /// Output path of this run
    pub fn output_path(&self) -> &PathBuf {
        &self.options.output_path
    }

    /// Document assembled from the current context state.
    pub fn document(&self) -> PagesDocument<'_> {
        PagesDocument {
            passthrough: self.pages_config.as_ref().map(|config| &config.passthrough),
            key_order: self
                .pages_config
                .as_ref()
                .map(|config| config.key_order.as_slice())
                .unwrap_or_default(),
            pages: &self.page_meta_data,
            sub_packages: &self.sub_page_meta_data,
        }
    }
}
