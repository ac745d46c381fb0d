//! Node type for the production-flow graph.
//!
//! Nodes are the vertices of the flow graph, one per manufacturing-step
//! card rendered by the UI. Each node has:
//! - A stable string identifier assigned by the caller
//! - Optional fixed dimensions (the layout config supplies defaults)
//! - A top-left position (x, y) in canvas space
//! - An opaque payload the layout engine never inspects

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point in canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A node in the flow graph.
///
/// `width` and `height` are the node's fixed rendered dimensions. They are
/// optional on the wire; the layout engine substitutes the configured
/// defaults when they are absent. `data` carries whatever record the caller
/// attached (a manufacturing step, an order summary) and is returned
/// unchanged by every layout operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    /// Stable identifier, unique within one graph.
    pub id: String,
    /// Fixed node width, if the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Fixed node height, if the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Top-left corner position.
    #[serde(default)]
    pub position: Point,
    /// Opaque caller payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl FlowNode {
    /// Create a node at the origin with no explicit dimensions.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: None,
            height: None,
            position: Point::default(),
            data: None,
        }
    }

    /// Set fixed dimensions.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }
}
