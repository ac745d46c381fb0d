//! Flow graph validation.
//!
//! The layout engine itself is permissive: dangling edges are skipped and
//! multi-parent nodes or cycles silently degrade the geometry. This module
//! is the strict pre-pass for callers that want malformed graphs reported
//! instead: it collects every structural issue so the UI can surface them
//! before asking for a layout.

use std::collections::HashMap;

use log::warn;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::Serialize;
use thiserror::Error;

use crate::graph::{FlowEdge, FlowNode};

/// A structural problem in a flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum GraphIssue {
    /// An edge references a node id that is not in the node list.
    // Field names avoid `source`, which thiserror reserves for the error
    // source chain.
    #[error("edge {source_id} -> {target_id} references a missing node")]
    DanglingEdge {
        #[serde(rename = "source")]
        source_id: String,
        #[serde(rename = "target")]
        target_id: String,
    },
    /// A node is the target of more than one edge, so its subtree would be
    /// laid out once per parent.
    #[error("node {id} has {parent_count} parents")]
    DuplicateParent { id: String, parent_count: usize },
    /// The edge set contains a cycle through this node.
    #[error("cycle detected through node {id}")]
    CycleDetected { id: String },
}

/// A non-empty set of validation issues.
#[derive(Debug, Clone, Error)]
#[error("flow graph failed validation with {} issue(s)", issues.len())]
pub struct ValidationError {
    pub issues: Vec<GraphIssue>,
}

/// Collect every structural issue in the graph.
///
/// Dangling edges are reported and excluded from the cycle check, so one
/// bad edge does not mask an independent cycle elsewhere.
pub fn validate(nodes: &[FlowNode], edges: &[FlowEdge]) -> Vec<GraphIssue> {
    let mut issues = Vec::new();

    let index_by_id: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();

    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let indices: Vec<_> = (0..nodes.len()).map(|slot| graph.add_node(slot)).collect();

    let mut parent_counts = vec![0usize; nodes.len()];
    for edge in edges {
        match (
            index_by_id.get(edge.source.as_str()),
            index_by_id.get(edge.target.as_str()),
        ) {
            (Some(&source), Some(&target)) => {
                graph.add_edge(indices[source], indices[target], ());
                parent_counts[target] += 1;
            }
            _ => issues.push(GraphIssue::DanglingEdge {
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
            }),
        }
    }

    for (index, &count) in parent_counts.iter().enumerate() {
        if count > 1 {
            issues.push(GraphIssue::DuplicateParent {
                id: nodes[index].id.clone(),
                parent_count: count,
            });
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let slot = graph[cycle.node_id()];
        issues.push(GraphIssue::CycleDetected {
            id: nodes[slot].id.clone(),
        });
    }

    for issue in &issues {
        warn!("{issue}");
    }
    issues
}
