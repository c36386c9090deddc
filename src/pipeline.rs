//! Stage orchestration: load, build, render, write
//!
//! Row-level failures stay inside their stage and are reported in the
//! outcome. Load and write failures end the run as a [`PipelineError`].

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::NetvizConfig;
use crate::graph::{BuildStats, NetworkGraph, RowError, build_graph};
use crate::loader::{LoadError, load_contacts};
use crate::render::{Canvas, RenderOptions, render};
use crate::report::{NetworkSummary, log_summary};
use crate::writer::{
    WriteError, WriteReport, WriteStrategy, default_strategies, verify_output, write_html,
};

/// Fatal errors that abort a run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load contacts")]
    Load(#[from] LoadError),

    #[error("Failed to save visualization")]
    Write(#[from] WriteError),
}

/// Inputs of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub skip_rows: usize,
    pub output: PathBuf,
}

impl From<&NetvizConfig> for PipelineOptions {
    fn from(config: &NetvizConfig) -> Self {
        Self {
            input: config.input.path.clone(),
            skip_rows: config.input.skip_rows,
            output: config.output.path.clone(),
        }
    }
}

/// Everything a completed run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    pub graph: NetworkGraph,
    pub stats: BuildStats,
    /// Rows rejected while loading or building, in the order they failed
    pub failed: Vec<RowError>,
    pub summary: NetworkSummary,
    pub write: WriteReport,
    /// Whether the output file was found on disk after writing
    pub output_exists: bool,
}

/// Run all stages with the default write strategies
pub fn run_pipeline(options: &PipelineOptions) -> Result<PipelineOutcome, PipelineError> {
    run_pipeline_with(options, &default_strategies())
}

/// Run all stages, writing with the given strategies in order
pub fn run_pipeline_with(
    options: &PipelineOptions,
    strategies: &[Box<dyn WriteStrategy>],
) -> Result<PipelineOutcome, PipelineError> {
    let loaded = load_contacts(&options.input, options.skip_rows)?;

    info!("Initializing graph...");
    let outcome = build_graph(&loaded.records);

    let mut failed = loaded.failed;
    failed.extend(outcome.failed);

    info!("Creating network visualization...");
    let renderable = render(&outcome.graph, &Canvas::default(), &RenderOptions::default());

    let write = write_html(&renderable, &options.output, strategies)?;
    info!("Visualization complete!");

    let summary = NetworkSummary::new(&outcome.graph, &outcome.stats, failed.len());
    log_summary(&summary);

    let output_exists = verify_output(&options.output);

    Ok(PipelineOutcome {
        graph: outcome.graph,
        stats: outcome.stats,
        failed,
        summary,
        write,
        output_exists,
    })
}
