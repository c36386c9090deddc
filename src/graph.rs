//! Contact graph and the shared-employer graph builder
//!
//! Nodes are keyed by full name; edges are unordered pairs of distinct
//! nodes tagged with the relation that links them. Both collections keep
//! insertion order so repeated runs over the same export produce the same
//! graph in the same order.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::loader::Record;

/// Tooltip used when a contact has neither position nor company
pub const NO_INFO_TOOLTIP: &str = "No additional information";

/// Per-row failure, recovered locally and reported in the batch outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row {row} could not be decoded: {message}")]
    Decode { row: usize, message: String },

    #[error("record has neither a first nor a last name: {record}")]
    MissingName { record: String },

    #[error("cannot link '{name}' to itself")]
    SelfLoop { name: String },

    #[error("cannot link '{left}' and '{right}': '{missing}' is not in the graph")]
    UnknownEndpoint {
        left: String,
        right: String,
        missing: String,
    },
}

/// Kind of relation an edge represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Both contacts list the same employer
    SameCompany,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::SameCompany => "same_company",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Full name, the node identity
    pub id: String,
    /// Hover text shown by the visualization
    pub title: String,
    /// Raw employer name, possibly empty
    pub company: String,
}

/// An undirected relation between two contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

impl Edge {
    /// Check whether this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Undirected contact graph without self-loops or multi-edges
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<(String, String), Edge>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, overwriting the attributes of an existing node with
    /// the same id. Returns `true` when the id was not present before.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.nodes.insert(node.id.clone(), node).is_none()
    }

    /// Insert an edge between two existing nodes.
    ///
    /// Returns `Ok(false)` when the pair is already linked.
    pub fn add_edge(&mut self, a: &str, b: &str, relation: Relation) -> Result<bool, RowError> {
        if a == b {
            return Err(RowError::SelfLoop { name: a.to_string() });
        }
        for name in [a, b] {
            if !self.nodes.contains_key(name) {
                return Err(RowError::UnknownEndpoint {
                    left: a.to_string(),
                    right: b.to_string(),
                    missing: name.to_string(),
                });
            }
        }

        let key = pair_key(a, b);
        if self.edges.contains_key(&key) {
            return Ok(false);
        }
        self.edges.insert(
            key,
            Edge {
                source: a.to_string(),
                target: b.to_string(),
                relation,
            },
        );
        Ok(true)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edges.contains_key(&pair_key(a, b))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Counters accumulated while building the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Successful node insertions, including overwrites
    pub nodes_added: usize,
    /// Distinct edges created
    pub edges_added: usize,
    /// Non-empty companies whose members were linked
    pub companies_processed: usize,
    /// Records skipped during linking because their company is empty
    pub contacts_without_company: usize,
}

/// Graph plus the counters and row failures of one build
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: NetworkGraph,
    pub stats: BuildStats,
    pub failed: Vec<RowError>,
}

/// Build the hover text for a contact.
///
/// ```
/// use linkedin_network::graph::tooltip_text;
///
/// assert_eq!(tooltip_text("Engineer", "Acme"), "Position: Engineer | Company: Acme");
/// assert_eq!(tooltip_text("", ""), "No additional information");
/// ```
pub fn tooltip_text(position: &str, company: &str) -> String {
    let mut parts = Vec::with_capacity(2);
    if !position.is_empty() {
        parts.push(format!("Position: {}", position));
    }
    if !company.is_empty() {
        parts.push(format!("Company: {}", company));
    }

    if parts.is_empty() {
        NO_INFO_TOOLTIP.to_string()
    } else {
        parts.join(" | ")
    }
}

fn node_for(record: &Record) -> Result<Node, RowError> {
    if record.first_name.trim().is_empty() && record.last_name.trim().is_empty() {
        return Err(RowError::MissingName {
            record: format!("{:?}", record),
        });
    }

    Ok(Node {
        id: record.full_name(),
        title: tooltip_text(&record.position, &record.company),
        company: record.company.clone(),
    })
}

/// Build the shared-employer graph from records in input order.
///
/// All nodes are created before any company is grouped, so every edge
/// endpoint refers to a node that already exists. Rows that fail are
/// logged and collected in [`BuildOutcome::failed`].
pub fn build_graph(records: &[Record]) -> BuildOutcome {
    let mut graph = NetworkGraph::new();
    let mut stats = BuildStats::default();
    let mut failed = Vec::new();

    info!("Adding nodes to graph...");
    for (index, record) in records.iter().enumerate() {
        match node_for(record) {
            Ok(node) => {
                if !graph.add_node(node) {
                    debug!("Overwrote existing node for {}", record.full_name());
                }
                stats.nodes_added += 1;
            }
            Err(err) => {
                error!("Error adding node for row {}: {}", index, err);
                error!("Row data: {:?}", record);
                failed.push(err);
            }
        }
    }
    info!("Successfully added {} nodes to the graph", stats.nodes_added);

    info!("Adding edges between connections at the same company...");
    let mut companies: IndexMap<&str, Vec<String>> = IndexMap::new();
    for record in records {
        if record.company.is_empty() {
            stats.contacts_without_company += 1;
            continue;
        }
        companies
            .entry(record.company.as_str())
            .or_default()
            .push(record.full_name());
    }

    if stats.contacts_without_company > 0 {
        warn!(
            "Skipping {} connections with empty company names",
            stats.contacts_without_company
        );
    }

    for (company, names) in &companies {
        stats.companies_processed += 1;
        debug!(
            "Processing company: {} with {} connections",
            company,
            names.len()
        );

        for (i, left) in names.iter().enumerate() {
            for right in &names[i + 1..] {
                match graph.add_edge(left, right, Relation::SameCompany) {
                    Ok(true) => stats.edges_added += 1,
                    Ok(false) => debug!("{} and {} are already linked", left, right),
                    Err(err) => {
                        error!("Error adding edge between {} and {}: {}", left, right, err);
                        failed.push(err);
                    }
                }
            }
        }
    }

    info!("Processed {} companies", stats.companies_processed);
    info!("Added {} edges to the graph", stats.edges_added);

    BuildOutcome {
        graph,
        stats,
        failed,
    }
}
