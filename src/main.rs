//! pages-merge - generates `pages.json` from per-page route fragments.

use anyhow::Result;
use clap::Parser;
use pages_merge::{
    cli::{Cli, Commands},
    config::MergeConfig,
    logger::Logger,
    pipeline::Pipeline,
    serve::serve_pages,
    watch::WatchCoordinator,
};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config = Arc::new(MergeConfig::load(cli)?);
    let logger = Logger::new(config.debug.filter());
    logger.debug(
        "options",
        format_args!(
            "dirs={:?} sub_packages={:?} output={} merge_pages={} minify={}",
            config.dirs,
            config.sub_packages,
            config.output_path.display(),
            config.merge_pages,
            config.minify
        ),
    );

    let pipeline = Pipeline::new(config, logger);
    build_once(&pipeline, cli)?;

    match &cli.command {
        Commands::Build => Ok(()),
        Commands::Watch => WatchCoordinator::new(pipeline).watch_blocking(),
        Commands::Serve { .. } => serve_pages(pipeline),
    }
}

/// Run the pipeline once before watching.
///
/// A missing user config ends the process. Other failures end `build`, while
/// `watch` and `serve` log them and wait for the next change.
fn build_once(pipeline: &Pipeline, cli: &Cli) -> Result<()> {
    match pipeline.run() {
        Ok(_) => Ok(()),
        Err(err) if err.is_fatal() => {
            pipeline.logger().warn(err);
            std::process::exit(1);
        }
        Err(err) if cli.is_build() => Err(err.into()),
        Err(err) => {
            pipeline.logger().error(format_args!("initial build failed: {err}"));
            Ok(())
        }
    }
}
