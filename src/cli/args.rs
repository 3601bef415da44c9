//! CLI argument definitions.

use crate::config::ExportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Batch export draw.io diagrams to PNG and PDF.
#[derive(Debug, Parser)]
#[command(name = "drawio-batch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for exporting.
    #[command(flatten)]
    pub export: ExportArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for exporting.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportArgs {
    /// Render with the container image instead of the local draw.io binary.
    #[arg(long, visible_alias = "container", global = true)]
    pub docker: bool,

    /// Directory containing the diagrams (default: diagrams).
    #[arg(short, long, env = "DRAWIO_BATCH_SOURCE", global = true)]
    pub source: Option<PathBuf>,

    /// Output root, one subdirectory per format (default: build).
    #[arg(short, long, env = "DRAWIO_BATCH_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    /// Export formats (comma-separated: png,pdf,svg,jpg).
    #[arg(short, long, value_delimiter = ',', env = "DRAWIO_BATCH_FORMAT", global = true)]
    pub format: Option<Vec<ExportFormat>>,

    /// Number of diagrams exported concurrently.
    #[arg(short, long, env = "DRAWIO_BATCH_JOBS", global = true)]
    pub jobs: Option<usize>,

    /// Continue past failed exports and report them at the end.
    #[arg(long, overrides_with = "fail_fast", global = true)]
    pub keep_going: bool,

    /// Abort on the first failed export, even if the config says keep_going.
    #[arg(long, overrides_with = "keep_going", global = true)]
    pub fail_fast: bool,

    /// Print the planned exports without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (default: platform config directory).
    #[arg(long, env = "DRAWIO_BATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Disable the progress bar.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}
