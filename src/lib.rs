//! Flow Layout - WASM Module
//!
//! Hierarchical layout engine for the production-flow dashboard. The SPA
//! hands over its node and edge lists (manufacturing steps and the
//! parent→rework relations between them), and this module hands back the
//! same records with computed positions, plus the bounding box the
//! viewport needs to fit the result. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: node and edge records exchanged with the renderer
//! - `layout`: hierarchical tree layout, bounds, graph validation

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod graph;
pub mod layout;

use graph::{FlowEdge, FlowNode};
use layout::{HierarchicalLayout, LayoutConfig, layout_bounds, validate};

/// Initialize the WASM module: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Main entry point for the layout engine.
///
/// This struct wraps the internal [`HierarchicalLayout`] and provides the
/// public API exposed to JavaScript.
#[wasm_bindgen]
pub struct FlowLayoutWasm {
    engine: HierarchicalLayout,
}

#[wasm_bindgen]
impl FlowLayoutWasm {
    /// Create a layout engine from a JS config object.
    ///
    /// Any omitted field falls back to its default (node 380x240, sibling
    /// spacing 100, level spacing 300, origin (400, 50)). Passing
    /// `undefined` or `null` uses all defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FlowLayoutWasm, JsError> {
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            engine: HierarchicalLayout::new(config),
        })
    }

    /// Create a layout engine with default configuration.
    #[wasm_bindgen(js_name = withDefaults)]
    pub fn with_defaults() -> FlowLayoutWasm {
        Self {
            engine: HierarchicalLayout::with_defaults(),
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute the hierarchical layout.
    ///
    /// Takes arrays of node and edge objects and returns
    /// `{ nodes, edges }` where every reachable node carries its computed
    /// position and edges are returned unchanged. Edges referencing
    /// missing nodes are skipped.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&self, nodes: JsValue, edges: JsValue) -> Result<JsValue, JsError> {
        let nodes: Vec<FlowNode> = serde_wasm_bindgen::from_value(nodes)?;
        let edges: Vec<FlowEdge> = serde_wasm_bindgen::from_value(edges)?;
        let result = self.engine.compute(&nodes, &edges);
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    /// Compute the layout after validating the graph.
    ///
    /// Rejects dangling edges, multi-parent nodes, and cycles with a JS
    /// error instead of producing degraded geometry. Use
    /// [`validateGraph`](Self::validate_graph) to inspect the individual
    /// issues.
    #[wasm_bindgen(js_name = computeLayoutChecked)]
    pub fn compute_layout_checked(
        &self,
        nodes: JsValue,
        edges: JsValue,
    ) -> Result<JsValue, JsError> {
        let nodes: Vec<FlowNode> = serde_wasm_bindgen::from_value(nodes)?;
        let edges: Vec<FlowEdge> = serde_wasm_bindgen::from_value(edges)?;
        let result = self.engine.compute_checked(&nodes, &edges)?;
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    /// Compute positions as a flat `Float32Array`.
    ///
    /// Returns `[x0, y0, x1, y1, ...]` in input-node order, for callers
    /// that write positions straight into a render buffer instead of
    /// re-reading node objects.
    #[wasm_bindgen(js_name = computePositionsFlat)]
    pub fn compute_positions_flat(
        &self,
        nodes: JsValue,
        edges: JsValue,
    ) -> Result<Float32Array, JsError> {
        let nodes: Vec<FlowNode> = serde_wasm_bindgen::from_value(nodes)?;
        let edges: Vec<FlowEdge> = serde_wasm_bindgen::from_value(edges)?;
        let result = self.engine.compute(&nodes, &edges);

        let mut positions = Vec::with_capacity(result.nodes.len() * 2);
        for node in &result.nodes {
            positions.push(node.position.x);
            positions.push(node.position.y);
        }
        Ok(Float32Array::from(&positions[..]))
    }

    // =========================================================================
    // Validation and bounds
    // =========================================================================

    /// Validate the graph without laying it out.
    ///
    /// Returns an array of issue objects, each tagged with a `kind` of
    /// `DanglingEdge`, `DuplicateParent`, or `CycleDetected`. An empty
    /// array means the graph is a well-formed forest.
    #[wasm_bindgen(js_name = validateGraph)]
    pub fn validate_graph(&self, nodes: JsValue, edges: JsValue) -> Result<JsValue, JsError> {
        let nodes: Vec<FlowNode> = serde_wasm_bindgen::from_value(nodes)?;
        let edges: Vec<FlowEdge> = serde_wasm_bindgen::from_value(edges)?;
        let issues = validate(&nodes, &edges);
        Ok(serde_wasm_bindgen::to_value(&issues)?)
    }

    /// Bounding box over the given (already positioned) nodes.
    ///
    /// Returns `{ minX, minY, width, height }`; an empty node list yields
    /// a zero-sized box at the origin.
    #[wasm_bindgen(js_name = layoutBounds)]
    pub fn layout_bounds(&self, nodes: JsValue) -> Result<JsValue, JsError> {
        let nodes: Vec<FlowNode> = serde_wasm_bindgen::from_value(nodes)?;
        let bounds = layout_bounds(&nodes, self.engine.config());
        Ok(serde_wasm_bindgen::to_value(&bounds)?)
    }
}

impl Default for FlowLayoutWasm {
    fn default() -> Self {
        Self::with_defaults()
    }
}
