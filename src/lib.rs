//! # linkedin-network - Professional Network Visualizer
//!
//! Turns a LinkedIn connections export into an interactive graph in which
//! contacts who share an employer are linked.
//!
//! ## Overview
//!
//! The run is a linear pipeline:
//!
//! 1. **Loader** - reads the CSV export after its notes preamble
//! 2. **Graph builder** - one node per full name, one edge per pair of
//!    contacts at the same non-empty company
//! 3. **Renderer** - maps the graph and fixed layout options to the
//!    vis-network data model
//! 4. **Writer** - serializes a single HTML page, falling back to an
//!    alternative serializer when the primary one fails
//!
//! ## Usage
//!
//! ```bash
//! # Read ./Connections.csv, write ./linkedin_network.html
//! linkedin-network
//!
//! # Explicit paths, summary on stdout, open in browser
//! linkedin-network exports/Connections.csv -o network.html --summary --open
//! ```

pub mod config;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod writer;

pub use config::{
    ConfigError, InputConfig, NetvizConfig, OutputConfig, find_config_file, load_config,
    load_config_file,
};
pub use graph::{
    BuildOutcome, BuildStats, Edge, NetworkGraph, Node, Relation, RowError, build_graph,
    tooltip_text,
};
pub use loader::{LoadError, LoadedContacts, Record, load_contacts, load_contacts_from_reader};
pub use pipeline::{
    PipelineError, PipelineOptions, PipelineOutcome, run_pipeline, run_pipeline_with,
};
pub use render::{Canvas, RenderOptions, Renderable, render};
pub use report::{NetworkSummary, average_edges_per_company, generate_summary, log_summary};
pub use writer::{
    InlineStrategy, RenderError, TemplateStrategy, WriteError, WriteReport, WriteStrategy,
    default_strategies, verify_output, write_html,
};
