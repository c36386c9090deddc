//! Translation of the contact graph into the vis-network data model
//!
//! The rendered structure mirrors what the browser-side network expects:
//! node and edge arrays plus a nested options object. Field names are
//! serialized in camelCase to match the library's option keys.

use serde::Serialize;

use crate::graph::{NetworkGraph, Relation};

/// Seed for the layout engine, so the same graph settles the same way
pub const RANDOM_SEED: u64 = 42;

/// Canvas the network is drawn on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canvas {
    pub height: String,
    pub width: String,
    pub bgcolor: String,
    pub font_color: String,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            height: "800px".to_string(),
            width: "100%".to_string(),
            bgcolor: "#222222".to_string(),
            font_color: "white".to_string(),
        }
    }
}

/// Root of the visualization options
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RenderOptions {
    pub nodes: NodeOptions,
    pub edges: EdgeOptions,
    pub physics: PhysicsOptions,
    pub layout: LayoutOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOptions {
    pub font: FontOptions,
    pub shape: String,
    pub size: u32,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            font: FontOptions::default(),
            shape: "dot".to_string(),
            size: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontOptions {
    pub size: u32,
    pub face: String,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            size: 12,
            face: "arial".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeOptions {
    pub color: EdgeColor,
    /// Curved edges; disabled draws straight lines
    pub smooth: bool,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            color: EdgeColor { inherit: true },
            smooth: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeColor {
    /// Take the color of the connected node
    pub inherit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsOptions {
    pub force_atlas2_based: ForceAtlas2Options,
    pub max_velocity: f64,
    pub solver: String,
    pub timestep: f64,
    pub stabilization: StabilizationOptions,
}

impl Default for PhysicsOptions {
    fn default() -> Self {
        Self {
            force_atlas2_based: ForceAtlas2Options::default(),
            max_velocity: 50.0,
            solver: "forceAtlas2Based".to_string(),
            timestep: 0.35,
            stabilization: StabilizationOptions::default(),
        }
    }
}

/// Force-directed solver parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceAtlas2Options {
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    pub damping: f64,
    pub avoid_overlap: f64,
}

impl Default for ForceAtlas2Options {
    fn default() -> Self {
        Self {
            gravitational_constant: -50.0,
            central_gravity: 0.01,
            spring_length: 100.0,
            spring_constant: 0.08,
            damping: 0.4,
            avoid_overlap: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilizationOptions {
    pub enabled: bool,
    pub iterations: u32,
    pub update_interval: u32,
    pub only_dynamic_edges: bool,
    pub fit: bool,
}

impl Default for StabilizationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: 2000,
            update_interval: 25,
            only_dynamic_edges: false,
            fit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    pub improved_layout: bool,
    pub random_seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            improved_layout: true,
            random_seed: RANDOM_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFont {
    pub color: String,
}

/// A node as handed to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub company: String,
    pub font: NodeFont,
}

/// An edge as handed to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
    pub relation: Relation,
    pub width: u32,
}

/// Everything needed to serialize the visualization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renderable {
    pub canvas: Canvas,
    pub options: RenderOptions,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

/// Translate the graph into the rendering model. The graph is not modified.
pub fn render(graph: &NetworkGraph, canvas: &Canvas, options: &RenderOptions) -> Renderable {
    let nodes = graph
        .nodes()
        .map(|node| RenderNode {
            id: node.id.clone(),
            label: node.id.clone(),
            title: node.title.clone(),
            company: node.company.clone(),
            font: NodeFont {
                color: canvas.font_color.clone(),
            },
        })
        .collect();

    let edges = graph
        .edges()
        .map(|edge| RenderEdge {
            from: edge.source.clone(),
            to: edge.target.clone(),
            relation: edge.relation,
            width: 1,
        })
        .collect();

    Renderable {
        canvas: canvas.clone(),
        options: options.clone(),
        nodes,
        edges,
    }
}
