//! Edge type for the production-flow graph.
//!
//! An edge `(source, target)` states that `target` is a child of `source`:
//! in the manufacturing domain, a rework step spawned from its parent step.
//! The layout engine reads edges to build the hierarchy and returns them
//! byte-for-byte unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A directed parent→child edge in the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Optional edge identifier (the renderer may key edges by it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the parent node.
    pub source: String,
    /// Id of the child node.
    pub target: String,
    /// Opaque caller payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl FlowEdge {
    /// Create an edge from `source` to `target` with no id or payload.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_construction() {
        let edge = FlowEdge::new("a", "b");
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert!(edge.id.is_none());
    }

    #[test]
    fn test_edge_deserializes_with_minimal_fields() {
        let edge: FlowEdge = serde_json::from_str(r#"{"source":"a","target":"b"}"#).unwrap();
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert!(edge.id.is_none());
        assert!(edge.data.is_none());
    }
}
