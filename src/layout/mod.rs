//! Layout algorithms for the production-flow visualization.
//!
//! This module computes target positions for the step graph rendered by
//! the dashboard: the hierarchical tree layout itself, the bounding box
//! used to fit the viewport, and an optional validation pass that reports
//! malformed graphs instead of silently degrading the geometry.

pub mod bounds;
pub mod hierarchical;
pub mod validate;

pub use bounds::{LayoutBounds, layout_bounds};
pub use hierarchical::{FlowLayout, Hierarchy, HierarchicalLayout, LayoutConfig};
pub use validate::{GraphIssue, ValidationError, validate};
