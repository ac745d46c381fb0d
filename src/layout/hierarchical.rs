//! Hierarchical tree layout for the production-flow graph.
//!
//! Lays out a forest of parent→child step trees so that every child row is
//! centered beneath its parent, siblings never overlap horizontally, and
//! each depth level occupies one fixed vertical band. Disjoint trees are
//! placed left to right with extra separation between them.
//!
//! # Algorithm Overview
//!
//! 1. **Hierarchy build:** one arena record per input node. Edges append
//!    children in supply order; roots are the nodes never targeted by an
//!    edge, kept in input order.
//! 2. **Footprint pass (bottom-up):** a subtree's horizontal footprint is
//!    the larger of the node's own width and its children's footprints laid
//!    side by side with sibling spacing. Memoized per layout pass.
//! 3. **Position pass (top-down):** each node is centered at a given x with
//!    its children's combined footprint centered beneath it, one vertical
//!    band further down.
//!
//! The permissive [`HierarchicalLayout::compute`] never fails: edges with a
//! missing endpoint are skipped, and nodes not reachable from any root keep
//! their original position. Cyclic input is not supported on this path; use
//! [`HierarchicalLayout::compute_checked`] to reject malformed graphs
//! before layout.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::graph::{FlowEdge, FlowNode, Point};
use crate::layout::validate::{self, ValidationError};

/// Configuration for the hierarchical layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width used for nodes that carry no explicit width.
    pub node_width: f32,
    /// Height used for nodes that carry no explicit height.
    pub node_height: f32,
    /// Horizontal spacing between sibling footprints. Disjoint trees get
    /// twice this spacing between them.
    pub horizontal_spacing: f32,
    /// Vertical spacing between depth levels.
    pub vertical_spacing: f32,
    /// Left edge of the first tree.
    pub root_x: f32,
    /// Top edge of every root node.
    pub root_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 380.0,
            node_height: 240.0,
            horizontal_spacing: 100.0,
            vertical_spacing: 300.0,
            root_x: 400.0,
            root_y: 50.0,
        }
    }
}

/// Internal per-node record used during one layout pass.
///
/// The arena index of a record equals the node's index in the caller's
/// list, so positions are written back by direct slot lookup.
#[derive(Debug)]
struct TreeNode {
    /// Index into the input node list.
    slot: usize,
    /// Effective width after config defaults are applied.
    width: f32,
    /// Depth from the root (root = 0). When a node is targeted by more
    /// than one edge, the last processed edge wins.
    depth: u32,
    /// Children arena indices in edge-supply order. A multi-parent node
    /// appears in every targeting parent's list.
    children: Vec<usize>,
}

/// A forest built from a flat node and edge list.
///
/// Every input node gets exactly one record; indices into the hierarchy
/// are the node's position in the input list.
pub struct Hierarchy {
    arena: Vec<TreeNode>,
    roots: Vec<usize>,
}

impl Hierarchy {
    /// Build the forest.
    ///
    /// Edges referencing a missing node id, and self-loops, are skipped.
    /// Roots are the nodes that are never the target of a kept edge.
    pub fn build(nodes: &[FlowNode], edges: &[FlowEdge], config: &LayoutConfig) -> Self {
        let mut arena: Vec<TreeNode> = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| TreeNode {
                slot,
                width: node.width.unwrap_or(config.node_width),
                depth: 0,
                children: Vec::new(),
            })
            .collect();

        let index_by_id: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();

        let mut has_parent = vec![false; nodes.len()];
        for edge in edges {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(edge.source.as_str()),
                index_by_id.get(edge.target.as_str()),
            ) else {
                debug!("skipping edge {} -> {}: missing endpoint", edge.source, edge.target);
                continue;
            };
            if source == target {
                debug!("skipping self-loop on {}", edge.source);
                continue;
            }

            let parent_depth = arena[source].depth;
            arena[target].depth = parent_depth + 1;
            arena[source].children.push(target);
            has_parent[target] = true;
        }

        let roots = (0..arena.len()).filter(|&index| !has_parent[index]).collect();
        Self { arena, roots }
    }

    /// Arena indices of the root nodes, in input order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Children of the node at `index`, in edge-supply order.
    pub fn children(&self, index: usize) -> &[usize] {
        &self.arena[index].children
    }

    /// Depth of the node at `index` (root = 0).
    pub fn depth(&self, index: usize) -> u32 {
        self.arena[index].depth
    }

    /// Number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the forest is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Result of a layout pass: repositioned nodes plus the caller's edges,
/// returned unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowLayout {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// The hierarchical layout engine.
pub struct HierarchicalLayout {
    config: LayoutConfig,
}

impl HierarchicalLayout {
    /// Create a new layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the layout for a node and edge list.
    ///
    /// Total over well-formed forests. Edges with a missing endpoint are
    /// skipped; nodes unreachable from any root pass through with their
    /// original position. A node targeted by several parents is positioned
    /// once per parent and keeps the last assignment. Cycles reachable
    /// from a root are not supported; run [`Self::compute_checked`] when
    /// the input is not trusted to be a forest.
    pub fn compute(&self, nodes: &[FlowNode], edges: &[FlowEdge]) -> FlowLayout {
        let hierarchy = Hierarchy::build(nodes, edges, &self.config);
        let positions = self.position_forest(&hierarchy);

        let nodes = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let mut node = node.clone();
                if let Some(position) = positions[index] {
                    node.position = position;
                }
                node
            })
            .collect();

        FlowLayout { nodes, edges: edges.to_vec() }
    }

    /// Validate the graph, then compute the layout.
    ///
    /// Returns every detected issue (dangling edges, multi-parent nodes,
    /// cycles) instead of silently degrading the geometry.
    pub fn compute_checked(
        &self,
        nodes: &[FlowNode],
        edges: &[FlowEdge],
    ) -> Result<FlowLayout, ValidationError> {
        let issues = validate::validate(nodes, edges);
        if issues.is_empty() {
            Ok(self.compute(nodes, edges))
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Horizontal footprint of the subtree rooted at `index`: the minimum
    /// span needed to render the node and all descendants without sibling
    /// overlap.
    pub fn subtree_width(&self, hierarchy: &Hierarchy, index: usize) -> f32 {
        self.subtree_footprint(hierarchy, index, &mut HashMap::new())
    }

    /// Position every root tree left to right, returning one position per
    /// input slot (`None` for nodes no root can reach).
    fn position_forest(&self, hierarchy: &Hierarchy) -> Vec<Option<Point>> {
        let mut positions = vec![None; hierarchy.len()];
        let mut footprints = HashMap::new();
        let mut cursor = self.config.root_x;

        for (index, &root) in hierarchy.roots().iter().enumerate() {
            if index > 0 {
                // Unrelated trees get double the sibling spacing.
                cursor += 2.0 * self.config.horizontal_spacing;
            }
            let footprint = self.subtree_footprint(hierarchy, root, &mut footprints);
            self.position_subtree(
                hierarchy,
                root,
                cursor + footprint / 2.0,
                self.config.root_y,
                &mut footprints,
                &mut positions,
            );
            cursor += footprint;
        }

        positions
    }

    fn subtree_footprint(
        &self,
        hierarchy: &Hierarchy,
        index: usize,
        memo: &mut HashMap<usize, f32>,
    ) -> f32 {
        if let Some(&footprint) = memo.get(&index) {
            return footprint;
        }

        let node = &hierarchy.arena[index];
        let footprint = if node.children.is_empty() {
            node.width
        } else {
            let children_width: f32 = node
                .children
                .iter()
                .map(|&child| self.subtree_footprint(hierarchy, child, memo))
                .sum::<f32>()
                + self.config.horizontal_spacing * (node.children.len() - 1) as f32;
            node.width.max(children_width)
        };

        memo.insert(index, footprint);
        footprint
    }

    fn position_subtree(
        &self,
        hierarchy: &Hierarchy,
        index: usize,
        center_x: f32,
        y: f32,
        memo: &mut HashMap<usize, f32>,
        positions: &mut [Option<Point>],
    ) {
        let node = &hierarchy.arena[index];
        positions[node.slot] = Some(Point::new(center_x - node.width / 2.0, y));

        if node.children.is_empty() {
            return;
        }

        let spacing = self.config.horizontal_spacing;
        let total_children_width: f32 = node
            .children
            .iter()
            .map(|&child| self.subtree_footprint(hierarchy, child, memo))
            .sum::<f32>()
            + spacing * (node.children.len() - 1) as f32;

        let mut current_x = center_x - total_children_width / 2.0;
        let child_y = y + self.config.vertical_spacing;

        for &child in &hierarchy.arena[index].children {
            let footprint = self.subtree_footprint(hierarchy, child, memo);
            self.position_subtree(
                hierarchy,
                child,
                current_x + footprint / 2.0,
                child_y,
                memo,
                positions,
            );
            current_x += footprint + spacing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn node(id: &str) -> FlowNode {
        FlowNode::new(id).with_size(380.0, 240.0)
    }

    #[test]
    fn test_config_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.node_width, 380.0);
        assert_eq!(config.node_height, 240.0);
        assert_eq!(config.horizontal_spacing, 100.0);
        assert_eq!(config.vertical_spacing, 300.0);
        assert_eq!(config.root_x, 400.0);
        assert_eq!(config.root_y, 50.0);
    }

    #[test]
    fn test_empty_input() {
        let layout = HierarchicalLayout::with_defaults();
        let result = layout.compute(&[], &[]);
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_single_node_lands_at_origin() {
        let layout = HierarchicalLayout::with_defaults();
        let result = layout.compute(&[node("a")], &[]);
        assert_eq!(result.nodes[0].position, Point::new(400.0, 50.0));
    }

    #[test]
    fn test_leaf_footprint_is_own_width() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), FlowNode::new("b").with_size(123.0, 50.0)];
        let hierarchy = Hierarchy::build(&nodes, &[], layout.config());
        assert_eq!(layout.subtree_width(&hierarchy, 0), 380.0);
        assert_eq!(layout.subtree_width(&hierarchy, 1), 123.0);
    }

    #[test]
    fn test_missing_dimensions_use_config_defaults() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [FlowNode::new("bare")];
        let hierarchy = Hierarchy::build(&nodes, &[], layout.config());
        assert_eq!(layout.subtree_width(&hierarchy, 0), 380.0);
    }

    /// The worked two-children example: footprints 380/380/860 and the
    /// exact centered placement that follows from them.
    #[test]
    fn test_two_children_exact_positions() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b"), node("c")];
        let edges = [FlowEdge::new("a", "b"), FlowEdge::new("a", "c")];

        let hierarchy = Hierarchy::build(&nodes, &edges, layout.config());
        assert_eq!(layout.subtree_width(&hierarchy, 1), 380.0);
        assert_eq!(layout.subtree_width(&hierarchy, 2), 380.0);
        assert_eq!(layout.subtree_width(&hierarchy, 0), 860.0);

        let result = layout.compute(&nodes, &edges);
        // Root centered at 400 + 860/2 = 830.
        assert_eq!(result.nodes[0].position, Point::new(640.0, 50.0));
        assert_eq!(result.nodes[1].position, Point::new(400.0, 350.0));
        assert_eq!(result.nodes[2].position, Point::new(880.0, 350.0));

        // Parent center equals the midpoint of the children's row.
        let parent_center = result.nodes[0].position.x + 380.0 / 2.0;
        let row_left = result.nodes[1].position.x;
        let row_right = result.nodes[2].position.x + 380.0;
        assert!(approx_eq!(f32, parent_center, (row_left + row_right) / 2.0, epsilon = 0.01));
    }

    #[test]
    fn test_children_keep_edge_order() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b"), node("c")];
        let edges = [FlowEdge::new("a", "c"), FlowEdge::new("a", "b")];
        let result = layout.compute(&nodes, &edges);
        // c was supplied first, so it sits to the left of b.
        assert!(result.nodes[2].position.x < result.nodes[1].position.x);
    }

    #[test]
    fn test_disjoint_trees_get_double_spacing() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b")];
        let result = layout.compute(&nodes, &[]);

        let a_right = result.nodes[0].position.x + 380.0;
        let b_left = result.nodes[1].position.x;
        assert_eq!(result.nodes[0].position.x, 400.0);
        assert_eq!(b_left - a_right, 200.0);
        assert_eq!(result.nodes[1].position.y, 50.0);
    }

    #[test]
    fn test_dangling_edge_is_skipped() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a")];
        let edges = [FlowEdge::new("a", "ghost"), FlowEdge::new("ghost", "a")];
        let result = layout.compute(&nodes, &edges);
        // Both edges ignored: a stays a root and is positioned normally.
        assert_eq!(result.nodes[0].position, Point::new(400.0, 50.0));
    }

    #[test]
    fn test_level_spacing_is_uniform() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b"), node("c"), node("d")];
        let edges = [
            FlowEdge::new("a", "b"),
            FlowEdge::new("b", "c"),
            FlowEdge::new("b", "d"),
        ];
        let result = layout.compute(&nodes, &edges);
        assert_eq!(result.nodes[0].position.y, 50.0);
        assert_eq!(result.nodes[1].position.y, 350.0);
        assert_eq!(result.nodes[2].position.y, 650.0);
        assert_eq!(result.nodes[3].position.y, 650.0);
    }

    #[test]
    fn test_multi_parent_last_edge_wins() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("r1"), node("r2"), node("c")];
        let edges = [FlowEdge::new("r1", "c"), FlowEdge::new("r2", "c")];

        let hierarchy = Hierarchy::build(&nodes, &edges, layout.config());
        // Shared child sits in both children lists; depth reflects the
        // last processed edge.
        assert_eq!(hierarchy.children(0), &[2]);
        assert_eq!(hierarchy.children(1), &[2]);
        assert_eq!(hierarchy.depth(2), 1);

        let result = layout.compute(&nodes, &edges);
        // r1 tree: root centered at 400 + 190 = 590, child below it.
        // r2 tree starts at 400 + 380 + 200 = 980; its visit runs last,
        // so the shared child keeps the r2-relative position.
        assert_eq!(result.nodes[1].position.x, 980.0);
        assert_eq!(result.nodes[2].position, Point::new(980.0, 350.0));
    }

    #[test]
    fn test_rootless_cycle_passes_through_unpositioned() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a").at(7.0, 8.0), node("b").at(9.0, 10.0)];
        let edges = [FlowEdge::new("a", "b"), FlowEdge::new("b", "a")];
        // Neither node is a root, so nothing is positioned and the
        // original coordinates survive.
        let result = layout.compute(&nodes, &edges);
        assert_eq!(result.nodes[0].position, Point::new(7.0, 8.0));
        assert_eq!(result.nodes[1].position, Point::new(9.0, 10.0));
    }

    #[test]
    fn test_compute_checked_rejects_cycle() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("root"), node("a"), node("b")];
        let edges = [
            FlowEdge::new("root", "a"),
            FlowEdge::new("a", "b"),
            FlowEdge::new("b", "a"),
        ];
        let err = layout.compute_checked(&nodes, &edges).unwrap_err();
        assert!(!err.issues.is_empty());
    }

    #[test]
    fn test_compute_checked_accepts_forest() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b")];
        let edges = [FlowEdge::new("a", "b")];
        let result = layout.compute_checked(&nodes, &edges).unwrap();
        assert_eq!(result.nodes[1].position.y, 350.0);
    }

    #[test]
    fn test_edges_returned_unchanged() {
        let layout = HierarchicalLayout::with_defaults();
        let nodes = [node("a"), node("b")];
        let mut edge = FlowEdge::new("a", "b");
        edge.id = Some("e1".into());
        let result = layout.compute(&nodes, std::slice::from_ref(&edge));
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].id.as_deref(), Some("e1"));
        assert_eq!(result.edges[0].source, "a");
        assert_eq!(result.edges[0].target, "b");
    }

    /// Random single-parent forests. Raw parent picks are reduced modulo
    /// the child index, so every parent precedes its child and the input
    /// is guaranteed acyclic.
    fn forest_strategy() -> impl Strategy<Value = (Vec<f32>, Vec<(usize, bool)>)> {
        (2usize..30).prop_flat_map(|count| {
            (
                proptest::collection::vec(40.0f32..500.0, count),
                proptest::collection::vec((any::<usize>(), any::<bool>()), count - 1),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_layout_invariants((widths, raw_parents) in forest_strategy()) {
            let layout = HierarchicalLayout::with_defaults();
            let nodes: Vec<FlowNode> = widths
                .iter()
                .enumerate()
                .map(|(index, &width)| FlowNode::new(format!("n{index}")).with_size(width, 240.0))
                .collect();
            let edges: Vec<FlowEdge> = raw_parents
                .iter()
                .enumerate()
                .filter_map(|(offset, &(raw, has_parent))| {
                    let child = offset + 1;
                    has_parent
                        .then(|| FlowEdge::new(format!("n{}", raw % child), format!("n{child}")))
                })
                .collect();

            let hierarchy = Hierarchy::build(&nodes, &edges, layout.config());
            let result = layout.compute(&nodes, &edges);
            let spacing = layout.config().horizontal_spacing;

            for index in 0..nodes.len() {
                let children = hierarchy.children(index);
                let footprint = layout.subtree_width(&hierarchy, index);

                // Footprint covers the node itself and the children's row.
                prop_assert!(footprint >= widths[index]);
                if !children.is_empty() {
                    let row: f32 = children
                        .iter()
                        .map(|&child| layout.subtree_width(&hierarchy, child))
                        .sum::<f32>()
                        + spacing * (children.len() - 1) as f32;
                    prop_assert!(footprint >= row - 0.01);

                    // Parent center sits at the midpoint of the children's
                    // footprint row.
                    let first = children[0];
                    let last = children[children.len() - 1];
                    let first_fp = layout.subtree_width(&hierarchy, first);
                    let last_fp = layout.subtree_width(&hierarchy, last);
                    let row_left =
                        result.nodes[first].position.x + widths[first] / 2.0 - first_fp / 2.0;
                    let row_right =
                        result.nodes[last].position.x + widths[last] / 2.0 + last_fp / 2.0;
                    let parent_center = result.nodes[index].position.x + widths[index] / 2.0;
                    prop_assert!((parent_center - (row_left + row_right) / 2.0).abs() < 0.5);

                    // Sibling footprints never overlap: consecutive children
                    // are at least the previous footprint plus spacing apart.
                    for pair in children.windows(2) {
                        let (left, right) = (pair[0], pair[1]);
                        let left_right_edge = result.nodes[left].position.x + widths[left];
                        let right_left_edge = result.nodes[right].position.x;
                        prop_assert!(right_left_edge >= left_right_edge - 0.5);
                    }

                    // One fixed vertical band per level.
                    for &child in children {
                        let dy = result.nodes[child].position.y - result.nodes[index].position.y;
                        prop_assert!((dy - layout.config().vertical_spacing).abs() < 0.01);
                    }
                }
            }
        }
    }
}
