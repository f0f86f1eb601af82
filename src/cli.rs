//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pages-merge CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Options file name, relative to root
    #[arg(short = 'C', long, default_value = "pages-merge.toml")]
    pub config: PathBuf,

    /// Directory that receives pages.json (relative to project root)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable debug output: `*` for everything or a list like `pages,hmr`
    #[arg(short, long, num_args = 0..=1, default_missing_value = "*")]
    pub debug: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate pages.json once
    Build,

    /// Generate pages.json, then regenerate it on every relevant change
    Watch,

    /// Watch and push full-reload notifications to connected clients
    Serve {
        /// Interface to bind the reload socket on
        #[arg(short, long)]
        interface: Option<String>,

        /// Port of the reload socket
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build)
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch)
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
