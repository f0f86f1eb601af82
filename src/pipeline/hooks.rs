//! Lifecycle hooks.
//!
//! Implement only the methods you need; every method defaults to a no-op.
//!
//! ```ignore
//! struct TagPages;
//!
//! impl PipelineHooks for TagPages {
//!     fn on_after_merge_page_meta_data(&self, ctx: &mut PageContext) {
//!         for page in &mut ctx.page_meta_data {
//!             page.attrs.insert("generated".into(), true.into());
//!         }
//!     }
//! }
//!
//! let pipeline = Pipeline::new(options, logger).with_hooks(TagPages);
//! ```

use super::{PageContext, Phase};

#[allow(unused_variables)]
pub trait PipelineHooks: Send + Sync {
    fn on_before_load_user_config(&self, ctx: &mut PageContext) {}
    fn on_after_load_user_config(&self, ctx: &mut PageContext) {}
    fn on_before_scan_pages(&self, ctx: &mut PageContext) {}
    fn on_after_scan_pages(&self, ctx: &mut PageContext) {}
    fn on_before_merge_page_meta_data(&self, ctx: &mut PageContext) {}
    fn on_after_merge_page_meta_data(&self, ctx: &mut PageContext) {}
    fn on_before_write_file(&self, ctx: &mut PageContext) {}
    fn on_after_write_file(&self, ctx: &mut PageContext) {}
}

/// Before or after a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Before,
    After,
}

/// Call the hook method registered for `phase` at `stage`.
///
/// Phases without a hook pair (`EnsureOutputFile`, and the sub-package half
/// of merging, which shares the merge hooks) do nothing.
pub(super) fn dispatch(hooks: &dyn PipelineHooks, phase: Phase, stage: Stage, ctx: &mut PageContext) {
    match (phase, stage) {
        (Phase::LoadUserConfig, Stage::Before) => hooks.on_before_load_user_config(ctx),
        (Phase::LoadUserConfig, Stage::After) => hooks.on_after_load_user_config(ctx),
        (Phase::ScanPages, Stage::Before) => hooks.on_before_scan_pages(ctx),
        (Phase::ScanPages, Stage::After) => hooks.on_after_scan_pages(ctx),
        (Phase::MergeTopLevel, Stage::Before) => hooks.on_before_merge_page_meta_data(ctx),
        (Phase::MergeSubPackages, Stage::After) => hooks.on_after_merge_page_meta_data(ctx),
        (Phase::WriteFile, Stage::Before) => hooks.on_before_write_file(ctx),
        (Phase::WriteFile, Stage::After) => hooks.on_after_write_file(ctx),
        _ => {}
    }
}
