//! Flow graph data model.
//!
//! This module provides the node and edge records exchanged with the
//! rendering layer. The layout engine treats them as plain geometry
//! carriers: ids and dimensions are read, positions are written, and
//! every other field passes through a layout call untouched.

mod edge;
mod node;

pub use edge::FlowEdge;
pub use node::{FlowNode, Point};
