//! pages-merge - generates `pages.json` from per-page route fragments.
//!
//! The `pages-merge` binary is a thin front end over this library. Embedders
//! build a [`Pipeline`](pipeline::Pipeline) from [`MergeConfig`](config::MergeConfig)
//! and attach their own [`PipelineHooks`](pipeline::PipelineHooks):
//!
//! ```no_run
//! use pages_merge::{
//!     config::MergeConfig,
//!     logger::Logger,
//!     pipeline::{PageContext, Pipeline, PipelineHooks},
//! };
//! use std::{path::Path, sync::Arc};
//!
//! struct MarkGenerated;
//!
//! impl PipelineHooks for MarkGenerated {
//!     fn on_after_merge_page_meta_data(&self, ctx: &mut PageContext) {
//!         for page in &mut ctx.page_meta_data {
//!             page.attrs.insert("generated".into(), true.into());
//!         }
//!     }
//! }
//!
//! let mut options = MergeConfig::default();
//! options.set_root(Path::new("."));
//!
//! Pipeline::new(Arc::new(options), Logger::default())
//!     .with_hooks(MarkGenerated)
//!     .run()
//!     .expect("pages.json written");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod pages;
pub mod pipeline;
pub mod serve;
pub mod utils;
pub mod watch;
