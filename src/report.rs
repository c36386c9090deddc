//! Network statistics for the end-of-run report
//!
//! The average number of edges per company has no value when no company was
//! processed; it is carried as `None` and rendered as `N/A`.

use std::io::{self, Write};

use tracing::info;

use crate::graph::{BuildStats, NetworkGraph};

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub companies: usize,
    pub contacts_without_company: usize,
    pub failed_rows: usize,
    pub average_edges_per_company: Option<f64>,
}

impl NetworkSummary {
    pub fn new(graph: &NetworkGraph, stats: &BuildStats, failed_rows: usize) -> Self {
        Self {
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            companies: stats.companies_processed,
            contacts_without_company: stats.contacts_without_company,
            failed_rows,
            average_edges_per_company: average_edges_per_company(
                stats.edges_added,
                stats.companies_processed,
            ),
        }
    }
}

/// Edges per company, or `None` when there are no companies
pub fn average_edges_per_company(edges: usize, companies: usize) -> Option<f64> {
    if companies == 0 {
        None
    } else {
        Some(edges as f64 / companies as f64)
    }
}

/// Format an optional average with two decimals, `N/A` when undefined
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{:.2}", value),
        None => "N/A".to_string(),
    }
}

/// Emit the summary through the log
pub fn log_summary(summary: &NetworkSummary) {
    info!("Network Statistics:");
    info!("Total nodes: {}", summary.total_nodes);
    info!("Total edges: {}", summary.total_edges);
    info!("Number of companies: {}", summary.companies);
    info!(
        "Average connections per company: {}",
        format_average(summary.average_edges_per_company)
    );
    if summary.failed_rows > 0 {
        info!("Rows skipped due to errors: {}", summary.failed_rows);
    }
}

/// Write a human-readable summary to the given writer
pub fn generate_summary<W: Write>(summary: &NetworkSummary, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "LinkedIn Network Summary")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Contacts: {} | Links: {} | Companies: {}",
        summary.total_nodes, summary.total_edges, summary.companies
    )?;
    writeln!(
        writer,
        "Average links per company: {}",
        format_average(summary.average_edges_per_company)
    )?;
    writeln!(
        writer,
        "Contacts without company: {}",
        summary.contacts_without_company
    )?;
    if summary.failed_rows > 0 {
        writeln!(writer, "Rows skipped: {}", summary.failed_rows)?;
    }

    Ok(())
}
