//! drawio-batch - batch export of draw.io diagrams.
//!
//! Walks a source tree of `.drawio` files, mirrors its directories under one
//! output root per format and runs an external renderer for every
//! (diagram, format) pair.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod renderer;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ExportArgs};
use config::{
    Config, RenderMode, config_file_path, load_config, save_default_config, validate_config,
    validate_formats, validate_jobs,
};
use output::LogReporter;
use pipeline::{ExportOptions, ExportPlan, FailurePolicy, export_plan, plan_export};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for drawio-batch CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.export.verbose, cli.export.quiet);

    if let Some(command) = cli.command {
        return handle_command(command, &cli.export);
    }

    let config = load_config(cli.export.config.as_deref())?;
    validate_config(&config)?;

    export(&cli.export, &config)
}

/// Run an export with CLI arguments layered over the configuration.
fn export(args: &ExportArgs, config: &Config) -> Result<()> {
    let (options, mode) = resolve_export_options(args, config)?;
    let plan = plan_export(&options)?;

    if args.dry_run {
        print_plan(&plan, mode);
        return Ok(());
    }

    // Stop scheduling new exports on Ctrl+C; a second Ctrl+C exits at once
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130); // 128 + SIGINT(2)
        }
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let working_dir = std::env::current_dir()?;
    let renderer = renderer::build_renderer(mode, config, &working_dir)?;

    let progress_enabled = !args.quiet && !args.no_progress;
    let reporter = LogReporter::new(plan.files.len(), progress_enabled);

    info!(
        "Exporting {} to {} ({} renderer)",
        options.source_dir.display(),
        options.output_dir.display(),
        mode
    );
    export_plan(&plan, &options, renderer.as_ref(), &reporter, &cancel)?;
    Ok(())
}

/// Merge command-line arguments over configuration defaults.
pub fn resolve_export_options(
    args: &ExportArgs,
    config: &Config,
) -> Result<(ExportOptions, RenderMode)> {
    let defaults = &config.defaults;

    let formats = args
        .format
        .clone()
        .unwrap_or_else(|| defaults.formats.clone());
    validate_formats(&formats)?;

    let jobs = args.jobs.unwrap_or(defaults.jobs);
    validate_jobs(jobs)?;

    // --fail-fast wins over keep_going from the config file
    let keep_going = !args.fail_fast && (args.keep_going || defaults.keep_going);
    let failure_policy = if keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };

    let mode = if args.docker {
        RenderMode::Container
    } else {
        defaults.mode
    };

    let options = ExportOptions {
        source_dir: args
            .source
            .clone()
            .unwrap_or_else(|| defaults.source_dir.clone()),
        output_dir: args
            .output
            .clone()
            .unwrap_or_else(|| defaults.output_dir.clone()),
        formats,
        jobs,
        failure_policy,
    };

    Ok((options, mode))
}

#[allow(clippy::print_stdout)]
fn print_plan(plan: &ExportPlan, mode: RenderMode) {
    println!("Renderer: {mode}");
    println!("Directories:");
    for dir in &plan.directories {
        println!("  {}", dir.display());
    }
    println!("Exports:");
    for file in &plan.files {
        for (format, destination) in &file.outputs {
            println!(
                "  {} -> {} ({format})",
                file.input.display(),
                destination.display()
            );
        }
    }
    println!(
        "{} diagram(s), {} export(s)",
        plan.files.len(),
        plan.job_count()
    );
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).with_target(false).init();
}

#[allow(clippy::print_stdout)]
fn handle_command(command: Command, args: &ExportArgs) -> Result<()> {
    match command {
        Command::Config { action } => match action {
            ConfigAction::Init => {
                let path = config_file_path()?;
                if path.exists() {
                    println!("Configuration file already exists: {}", path.display());
                } else {
                    let saved_path = save_default_config(&Config::default())?;
                    println!("Created configuration file: {}", saved_path.display());
                }
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config(args.config.as_deref())?;
                let contents = toml::to_string_pretty(&config)
                    .map_err(|e| Error::ConfigSerialize { source: e })?;
                println!("{contents}");
                Ok(())
            }
            ConfigAction::Path => {
                let path = match &args.config {
                    Some(path) => path.clone(),
                    None => config_file_path()?,
                };
                println!("{}", path.display());
                Ok(())
            }
        },
    }
}
