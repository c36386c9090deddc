//! linkedin-network CLI - Professional Network Visualizer
//!
//! Reads a LinkedIn connections export and writes an interactive HTML graph
//! linking contacts who work at the same company.
//!
//! Usage:
//!   linkedin-network [OPTIONS] [INPUT]

use std::error::Error;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use linkedin_network::{
    NetvizConfig, PipelineOptions, generate_summary, load_config, load_config_file, run_pipeline,
};

/// linkedin-network - Visualize who in your network works together
#[derive(Parser, Debug)]
#[command(name = "linkedin-network")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Connections export to read (default: Connections.csv)
    input: Option<PathBuf>,

    /// HTML file to write (default: linkedin_network.html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lines of notes to skip before the column header row (default: 2)
    #[arg(long, value_name = "N")]
    skip_rows: Option<usize>,

    /// Config file path (default: search for .netviz.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a network summary to stdout after writing
    #[arg(long)]
    summary: bool,

    /// Open the written page in the default browser
    #[arg(long)]
    open: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("An error occurred: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(stdout)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args)?;

    // CLI args override config, which overrides defaults
    let mut options = PipelineOptions::from(&config);
    if let Some(input) = args.input {
        options.input = input;
    }
    if let Some(output) = args.output {
        options.output = output;
    }
    if let Some(skip_rows) = args.skip_rows {
        options.skip_rows = skip_rows;
    }

    let outcome = run_pipeline(&options)?;

    if !outcome.failed.is_empty() {
        warn!(
            "{} row(s) were skipped; see the errors above",
            outcome.failed.len()
        );
    }

    if args.summary {
        generate_summary(&outcome.summary, &mut stdout().lock())?;
    }

    if args.open || config.output.open_browser {
        info!("Opening {} in browser...", options.output.display());
        if let Err(e) = open::that(&options.output) {
            warn!("Could not open browser: {}", e);
            warn!("Please open {} manually", options.output.display());
        }
    }

    Ok(())
}

fn resolve_config(args: &Args) -> Result<NetvizConfig, Box<dyn Error>> {
    if let Some(path) = &args.config {
        let config = load_config_file(path)?;
        info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    let cwd = std::env::current_dir()?;
    match load_config(&cwd) {
        Ok(config) => Ok(config),
        Err(e) => {
            match e.source() {
                Some(cause) => warn!("Ignoring config file: {}: {}", e, cause),
                None => warn!("Ignoring config file: {}", e),
            }
            Ok(NetvizConfig::default())
        }
    }
}
