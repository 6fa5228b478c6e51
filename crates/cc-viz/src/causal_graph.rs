//! Causal diagram artifact: nodes assigned to drawing layers plus directed edges.
//!
//! A node's layer is the longest directed path into it from a root, not
//! counting the direct treatment → outcome edge, so causes sit above the
//! treatment/outcome pair.

use cc_core::Result;
use cc_inference::causal::{CausalGraph, NodeRole};
use serde::{Deserialize, Serialize};

use crate::ArtifactMeta;

/// Drawable causal diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalGraphArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Provenance.
    pub meta: ArtifactMeta,
    /// Chart title.
    pub title: String,
    /// Treatment variable.
    pub treatment: String,
    /// Outcome variable.
    pub outcome: String,
    /// Nodes in graph order.
    pub nodes: Vec<GraphNode>,
    /// Directed edges.
    pub edges: Vec<GraphEdge>,
}

/// Node with its drawing layer (0 = top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Variable name.
    pub name: String,
    /// Role in the diagram.
    pub role: NodeRole,
    /// Drawing row, 0 at the top.
    pub layer: usize,
}

/// Directed edge by node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Cause.
    pub from: String,
    /// Effect.
    pub to: String,
}

impl CausalGraphArtifact {
    /// Number of layers.
    pub fn n_layers(&self) -> usize {
        self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0)
    }
}

/// Build the diagram artifact from a causal graph.
pub fn causal_graph_artifact(graph: &CausalGraph) -> Result<CausalGraphArtifact> {
    let names: Vec<&str> = graph.nodes().map(|n| n.name.as_str()).collect();
    let edges = graph.edges();

    let (t, y) = (graph.treatment(), graph.outcome());

    // Longest-path layering; the graph is acyclic so this settles within |V| passes.
    let mut layer = vec![0usize; names.len()];
    let pos = |name: &str| names.iter().position(|n| *n == name);
    for _ in 0..names.len() {
        let mut changed = false;
        for &(a, b) in edges.iter().filter(|&&(a, b)| !(a == t && b == y)) {
            if let (Some(i), Some(j)) = (pos(a), pos(b)) {
                if layer[j] < layer[i] + 1 {
                    layer[j] = layer[i] + 1;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let nodes = graph
        .nodes()
        .zip(layer)
        .map(|(n, layer)| GraphNode { name: n.name.clone(), role: n.role, layer })
        .collect();

    Ok(CausalGraphArtifact {
        schema_version: "churncause_causal_graph_v0".to_string(),
        meta: ArtifactMeta::now()?,
        title: "Causal Model".to_string(),
        treatment: graph.treatment().to_string(),
        outcome: graph.outcome().to_string(),
        nodes,
        edges: edges
            .into_iter()
            .map(|(a, b)| GraphEdge { from: a.to_string(), to: b.to_string() })
            .collect(),
    })
}
