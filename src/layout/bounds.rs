//! Axis-aligned bounds over positioned nodes.
//!
//! The viewport code uses the box to fit and center the rendered flow
//! after a layout pass.

use serde::{Deserialize, Serialize};

use crate::graph::FlowNode;
use crate::layout::hierarchical::LayoutConfig;

/// Axis-aligned bounding box covering a set of node rectangles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Compute the bounding box covering every node's `[x, x+width] x
/// [y, y+height]` rectangle.
///
/// Nodes without explicit dimensions use the config defaults. An empty
/// node list yields a zero-sized box at the origin.
pub fn layout_bounds(nodes: &[FlowNode], config: &LayoutConfig) -> LayoutBounds {
    if nodes.is_empty() {
        return LayoutBounds::default();
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for node in nodes {
        let width = node.width.unwrap_or(config.node_width);
        let height = node.height.unwrap_or(config.node_height);
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + width);
        max_y = max_y.max(node.position.y + height);
    }

    LayoutBounds {
        min_x,
        min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}
