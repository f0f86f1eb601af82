//! `pages.json` generation pipeline.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run()
//!     │
//!     ├── EnsureOutputFile   placeholder pages.json if missing
//!     ├── LoadUserConfig     pages.config.* (missing → ConfigNotFound)
//!     ├── ScanPages          top-level dirs + sub-package dirs (only with merge_pages)
//!     ├── MergeTopLevel      fragments ─► merge ─► home page ─► home-type first
//!     ├── MergeSubPackages   per sub-package merge + declared-only packages
//!     └── WriteFile          pretty or minified JSON
//! ```
//!
//! Every phase except `EnsureOutputFile` is wrapped by the matching
//! [`PipelineHooks`] methods, called with the live [`PageContext`].

mod context;
mod hooks;

pub use context::PageContext;
pub use hooks::PipelineHooks;

use crate::{
    config::MergeConfig,
    error::{PagesError, Result},
    logger::Logger,
    pages::{
        fragment::read_fragments,
        home::{resolve_home_page, sort_home_first},
        merge::merge_page_meta_data,
        scan::{PathScanner, SubPackageFiles},
        subpackage::{merge_sub_packages, sub_package_root},
        user_config::load_user_config,
    },
    utils::path::rel_path,
};
use hooks::{Stage, dispatch};
use rayon::prelude::*;
use std::{fs, path::Path, sync::Arc};

/// Content written when `pages.json` does not exist yet.
const PLACEHOLDER: &str = "{\n  \"pages\": [\n    {\n      \"path\": \"\"\n    }\n  ]\n}";

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    EnsureOutputFile,
    LoadUserConfig,
    ScanPages,
    MergeTopLevel,
    MergeSubPackages,
    WriteFile,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::EnsureOutputFile,
        Phase::LoadUserConfig,
        Phase::ScanPages,
        Phase::MergeTopLevel,
        Phase::MergeSubPackages,
        Phase::WriteFile,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::EnsureOutputFile => "ensure-output",
            Self::LoadUserConfig => "load-user-config",
            Self::ScanPages => "scan-pages",
            Self::MergeTopLevel => "merge-pages",
            Self::MergeSubPackages => "merge-sub-packages",
            Self::WriteFile => "write-file",
        }
    }
}

/// Runs the phases in order with the configured hooks.
pub struct Pipeline {
    options: Arc<MergeConfig>,
    logger: Logger,
    hooks: Vec<Box<dyn PipelineHooks>>,
}

impl Pipeline {
    pub fn new(options: Arc<MergeConfig>, logger: Logger) -> Self {
        Self {
            options,
            logger,
            hooks: Vec::new(),
        }
    }

    /// Add a hook set; hook sets run in registration order.
    pub fn with_hooks(mut self, hooks: impl PipelineHooks + 'static) -> Self {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn options(&self) -> &Arc<MergeConfig> {
        &self.options
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Regenerate `pages.json` from scratch.
    pub fn run(&self) -> Result<PageContext> {
        let mut ctx = PageContext::new(Arc::clone(&self.options), self.logger.clone());

        for phase in Phase::ALL {
            if phase == Phase::ScanPages && !ctx.options.merge_pages {
                ctx.logger.debug("pages", "merge_pages disabled, skipping scan");
                continue;
            }

            self.call_hooks(phase, Stage::Before, &mut ctx);
            ctx.logger.debug("pages", format_args!("phase: {}", phase.name()));
            execute(phase, &mut ctx)?;
            self.call_hooks(phase, Stage::After, &mut ctx);
        }

        Ok(ctx)
    }

    fn call_hooks(&self, phase: Phase, stage: Stage, ctx: &mut PageContext) {
        for hooks in &self.hooks {
            dispatch(hooks.as_ref(), phase, stage, ctx);
        }
    }
}

fn execute(phase: Phase, ctx: &mut PageContext) -> Result<()> {
    match phase {
        Phase::EnsureOutputFile => {
            if !ensure_output_file(ctx.output_path())? {
                ctx.logger.debug("pages", "created placeholder pages.json");
            }
            Ok(())
        }
        Phase::LoadUserConfig => load_config(ctx),
        Phase::ScanPages => scan_pages(ctx),
        Phase::MergeTopLevel => merge_top_level(ctx),
        Phase::MergeSubPackages => merge_sub_level(ctx),
        Phase::WriteFile => write_file(ctx),
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Create `pages.json` with a placeholder page when missing.
///
/// Returns `true` if the file already existed.
pub fn ensure_output_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(true);
    }
    write_output(path, PLACEHOLDER)?;
    Ok(false)
}

fn load_config(ctx: &mut PageContext) -> Result<()> {
    let (path, config) = load_user_config(ctx.options.get_root())?;
    ctx.logger
        .debug("options", format_args!("user config: {}", path.display()));
    ctx.user_config_path = Some(path);
    ctx.pages_config = Some(config);
    Ok(())
}

fn scan_pages(ctx: &mut PageContext) -> Result<()> {
    let options = &ctx.options;
    let scanner = PathScanner::from_config(options)?;

    ctx.pages_path = scanner.scan_all(options.dirs.iter().map(|dir| options.resolve(dir)));
    ctx.sub_pages_path = options
        .sub_packages
        .iter()
        .map(|dir| SubPackageFiles {
            dir: dir.clone(),
            files: scanner.scan(&options.resolve(dir)),
        })
        .collect();

    ctx.logger.debug(
        "pages",
        format_args!(
            "{:?}",
            ctx.pages_path.iter().map(|p| &p.relative_path).collect::<Vec<_>>()
        ),
    );
    for pkg in &ctx.sub_pages_path {
        ctx.logger.debug(
            "sub-pages",
            format_args!("{}: {} file(s)", pkg.dir.display(), pkg.files.len()),
        );
    }
    Ok(())
}

fn merge_top_level(ctx: &mut PageContext) -> Result<()> {
    let generated = read_fragments(&ctx.pages_path, &ctx.logger)?;
    let overrides = ctx
        .pages_config
        .as_ref()
        .and_then(|config| config.pages.as_deref())
        .unwrap_or_default();

    let mut pages = merge_page_meta_data(generated, overrides);
    let home = resolve_home_page(
        &mut pages,
        &ctx.options.home_page,
        &ctx.options.sub_packages,
        &ctx.logger,
    );
    sort_home_first(&mut pages);

    ctx.logger
        .debug("pages", format_args!("{} merged page(s)", pages.len()));
    ctx.page_meta_data = pages;
    ctx.home_page = Some(home);
    Ok(())
}

fn merge_sub_level(ctx: &mut PageContext) -> Result<()> {
    let prefix = ctx.options.sub_root_prefix.as_str();
    let logger = &ctx.logger;

    let results: Vec<Result<(String, _)>> = ctx
        .sub_pages_path
        .par_iter()
        .map(|pkg| {
            let records = read_fragments(&pkg.files, logger)?;
            Ok((sub_package_root(prefix, &pkg.dir), records))
        })
        .collect();

    let mut scanned = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(partition) => scanned.push(partition),
            Err(PagesError::Fragments(errors)) => failures.extend(errors),
            Err(err) => failures.push(err),
        }
    }
    if !failures.is_empty() {
        return Err(PagesError::Fragments(failures));
    }

    let declared = ctx
        .pages_config
        .as_ref()
        .and_then(|config| config.sub_packages.as_deref())
        .unwrap_or_default();

    ctx.sub_page_meta_data = merge_sub_packages(scanned, declared);
    ctx.logger.debug(
        "sub-pages",
        format_args!(
            "{:?}",
            ctx.sub_page_meta_data
                .iter()
                .map(|pkg| (&pkg.root, pkg.pages.len()))
                .collect::<Vec<_>>()
        ),
    );
    Ok(())
}

fn write_file(ctx: &mut PageContext) -> Result<()> {
    let json = ctx.document().to_json(ctx.options.minify)?;
    write_output(ctx.output_path(), &json)?;

    ctx.logger.info(
        "pages",
        format_args!(
            "{} page(s), {} sub-package(s) → {}",
            ctx.page_meta_data.len(),
            ctx.sub_page_meta_data.len(),
            rel_path(ctx.output_path(), ctx.options.get_root())
        ),
    );
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PagesError::io(parent, err))?;
    }
    fs::write(path, content).map_err(|err| PagesError::io(path, err))
}

// ============================================================================
// Tests
// ============================================================================
