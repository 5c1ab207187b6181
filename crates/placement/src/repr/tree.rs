//! Canonical tree representation (SoA) and read-only tree interface.
//!
//! This module provides:
//! - [`Tree`]: Immutable SoA tree storage for traversal
//! - [`TreeView`]: Read-only trait for tree access
//! - [`TreeValidationError`]: Structural validation errors
//! - [`TreeBuilder`]: Node-by-node construction for fixtures and tests

use super::NodeId;

// ============================================================================
// TreeView Trait
// ============================================================================

/// Read-only view of a binary decision tree.
///
/// Splits are numeric: a sample goes left when `x < threshold`.
pub trait TreeView {
    /// Number of nodes in the tree.
    fn n_nodes(&self) -> usize;

    /// Check if a node is a leaf.
    fn is_leaf(&self, node: NodeId) -> bool;

    /// Feature index tested by a split node.
    fn split_index(&self, node: NodeId) -> u32;

    /// Threshold of a split node.
    fn split_threshold(&self, node: NodeId) -> f32;

    fn left_child(&self, node: NodeId) -> NodeId;

    fn right_child(&self, node: NodeId) -> NodeId;

    /// Value stored at a leaf node.
    fn leaf_value(&self, node: NodeId) -> f64;

    /// Number of split (non-leaf) nodes.
    fn n_splits(&self) -> usize {
        (0..self.n_nodes() as NodeId).filter(|&n| !self.is_leaf(n)).count()
    }

    /// Traverse from the root to the leaf reached by `features`.
    ///
    /// A NaN feature value compares false and goes right.
    #[inline]
    fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let fvalue = features[self.split_index(node) as usize];
            node = if fvalue < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("{array} has {len} entries, expected {n_nodes}")]
    LengthMismatch {
        array: &'static str,
        len: usize,
        n_nodes: usize,
    },

    #[error("node {node}: {side} child {child} is out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },

    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },

    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },

    #[error("node {node} splits on feature {feature}, but there are only {n_features} features")]
    FeatureOutOfRange {
        node: NodeId,
        feature: u32,
        n_features: usize,
    },

    #[error("node {node} has a non-finite {what}")]
    NonFinite { node: NodeId, what: &'static str },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root). Leaf values are the
/// per-leaf output: a class-1 probability for averaged ensembles, a margin for
/// boosted ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
    /// Optional impurity decrease at each split node (for explainability).
    gains: Option<Box<[f32]>>,
}

impl Tree {
    /// Create a new tree from parallel arrays.
    ///
    /// All arrays must have the same length (number of nodes); callers reading
    /// untrusted input check that first.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f64>,
    ) -> Self {
        let n_nodes = is_leaf.len();
        debug_assert_eq!(n_nodes, split_indices.len());
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, leaf_values.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            gains: None,
        }
    }

    /// A single-leaf tree.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![0], vec![0.0], vec![0], vec![0], vec![true], vec![value])
    }

    /// Start building a tree node by node.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    // =========================================================================
    // Explainability: Gains
    // =========================================================================

    #[inline]
    pub fn has_gains(&self) -> bool {
        self.gains.is_some()
    }

    /// Set the gains for this tree (builder pattern).
    pub fn with_gains(mut self, gains: Vec<f32>) -> Self {
        debug_assert_eq!(gains.len(), self.n_nodes());
        self.gains = Some(gains.into_boxed_slice());
        self
    }

    /// Leaf nodes have gain 0, split nodes the impurity decrease of the split.
    pub fn gains(&self) -> Option<&[f32]> {
        self.gains.as_deref()
    }

    // =========================================================================
    // Raw arrays (for persistence)
    // =========================================================================

    pub fn split_indices(&self) -> &[u32] {
        &self.split_indices
    }

    pub fn split_thresholds(&self) -> &[f32] {
        &self.split_thresholds
    }

    pub fn left_children(&self) -> &[u32] {
        &self.left_children
    }

    pub fn right_children(&self) -> &[u32] {
        &self.right_children
    }

    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn leaf_values(&self) -> &[f64] {
        &self.leaf_values
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate structural invariants for this tree against a feature width.
    ///
    /// Checks reachability of every node from the root, rejects cycles and
    /// shared subtrees, and requires split features `< n_features` and finite
    /// thresholds, leaf values and gains.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, bool)> = vec![(0, false)];

        while let Some((node, finished)) = stack.pop() {
            let node_usize = node as usize;
            if finished {
                color[node_usize] = 2;
                continue;
            }

            match color[node_usize] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }
            color[node_usize] = 1;
            stack.push((node, true));

            if self.is_leaf(node) {
                if !self.leaf_value(node).is_finite() {
                    return Err(TreeValidationError::NonFinite { node, what: "leaf value" });
                }
                continue;
            }

            let feature = self.split_index(node);
            if feature as usize >= n_features {
                return Err(TreeValidationError::FeatureOutOfRange { node, feature, n_features });
            }
            if !self.split_threshold(node).is_finite() {
                return Err(TreeValidationError::NonFinite { node, what: "threshold" });
            }

            let left = self.left_child(node);
            let right = self.right_child(node);
            if left == node || right == node {
                return Err(TreeValidationError::SelfLoop { node });
            }
            for (side, child) in [("left", left), ("right", right)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
            }

            // Visit children
            stack.push((right, false));
            stack.push((left, false));
        }

        if let Some(i) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode { node: i as NodeId });
        }

        if let Some(gains) = self.gains() {
            if let Some(i) = gains.iter().position(|g| !g.is_finite()) {
                return Err(TreeValidationError::NonFinite { node: i as NodeId, what: "gain" });
            }
        }

        Ok(())
    }

    /// Leaf value reached by `features`.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f64 {
        self.leaf_value(self.traverse_to_leaf(features))
    }
}

// =============================================================================
// TreeView for Tree
// =============================================================================

impl TreeView for Tree {
    #[inline]
    fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Node-by-node tree construction.
///
/// Nodes are addressed by explicit id; ids never set become zero-valued leaves
/// (and are reported as unreachable by [`Tree::validate`] if nothing points at
/// them). Gains are kept only if at least one split carries one.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    nodes: Vec<Option<BuilderNode>>,
}

#[derive(Debug, Clone, Copy)]
enum BuilderNode {
    Split {
        feature: u32,
        threshold: f32,
        left: NodeId,
        right: NodeId,
        gain: Option<f32>,
    },
    Leaf(f64),
}

impl TreeBuilder {
    fn set(&mut self, node: NodeId, spec: BuilderNode) -> &mut Self {
        let idx = node as usize;
        if self.nodes.len() <= idx {
            self.nodes.resize(idx + 1, None);
        }
        self.nodes[idx] = Some(spec);
        self
    }

    /// Numeric split `x[feature] < threshold` → `left`, else `right`.
    pub fn split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        left: NodeId,
        right: NodeId,
    ) -> &mut Self {
        self.set(node, BuilderNode::Split { feature, threshold, left, right, gain: None })
    }

    /// Numeric split with its impurity decrease.
    pub fn split_with_gain(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        left: NodeId,
        right: NodeId,
        gain: f32,
    ) -> &mut Self {
        self.set(node, BuilderNode::Split { feature, threshold, left, right, gain: Some(gain) })
    }

    pub fn leaf(&mut self, node: NodeId, value: f64) -> &mut Self {
        self.set(node, BuilderNode::Leaf(value))
    }

    pub fn build(&self) -> Tree {
        let n = self.nodes.len();
        let mut split_indices = vec![0; n];
        let mut thresholds = vec![0.0; n];
        let mut left = vec![0; n];
        let mut right = vec![0; n];
        let mut is_leaf = vec![true; n];
        let mut values = vec![0.0; n];
        let mut gains = vec![0.0; n];
        let mut has_gains = false;

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Some(BuilderNode::Split { feature, threshold, left: l, right: r, gain }) => {
                    split_indices[i] = feature;
                    thresholds[i] = threshold;
                    left[i] = l;
                    right[i] = r;
                    is_leaf[i] = false;
                    if let Some(g) = gain {
                        gains[i] = g;
                        has_gains = true;
                    }
                }
                Some(BuilderNode::Leaf(v)) => values[i] = v,
                None => {}
            }
        }

        let tree = Tree::new(split_indices, thresholds, left, right, is_leaf, values);
        if has_gains {
            tree.with_gains(gains)
        } else {
            tree
        }
    }
}

/// Build a [`Tree`] from a node listing.
///
/// ```ignore
/// let tree = decision_tree! {
///     0 => split(0, 0.5) -> 1, 2,
///     1 => leaf(0.1),
///     2 => leaf(0.9),
/// };
/// ```
///
/// `split(feature, threshold, gain)` also records the split's gain.
#[macro_export]
macro_rules! decision_tree {
    (@node $b:ident, $id:literal, split($feat:expr, $thr:expr, $gain:expr) -> $l:literal, $r:literal) => {
        $b.split_with_gain($id, $feat, $thr, $l, $r, $gain);
    };
    (@node $b:ident, $id:literal, split($feat:expr, $thr:expr) -> $l:literal, $r:literal) => {
        $b.split($id, $feat, $thr, $l, $r);
    };
    (@node $b:ident, $id:literal, leaf($v:expr)) => {
        $b.leaf($id, $v);
    };
    ($( $id:literal => $kind:ident ( $($args:tt)* ) $(-> $l:literal, $r:literal)? ),+ $(,)?) => {{
        let mut builder = $crate::repr::Tree::builder();
        $( $crate::decision_tree!(@node builder, $id, $kind ( $($args)* ) $(-> $l, $r)?); )+
        builder.build()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stump() -> Tree {
        crate::decision_tree! {
            0 => split(0, 0.5) -> 1, 2,
            1 => leaf(0.25),
            2 => leaf(0.75),
        }
    }

    #[rstest]
    #[case(0.3, 0.25)]
    #[case(0.5, 0.75)]
    #[case(0.7, 0.75)]
    #[case(f32::NAN, 0.75)]
    fn predict_simple_tree(#[case] x: f32, #[case] expected: f64) {
        assert_eq!(stump().predict_row(&[x]), expected);
    }

    #[test]
    fn deeper_tree_traversal() {
        // root: f1 < 10 ? (f0 < 0.5 ? 0.1 : 0.4) : 0.9
        let tree = crate::decision_tree! {
            0 => split(1, 10.0, 4.0) -> 1, 2,
            1 => split(0, 0.5, 1.0) -> 3, 4,
            2 => leaf(0.9),
            3 => leaf(0.1),
            4 => leaf(0.4),
        };
        assert_eq!(tree.predict_row(&[0.0, 5.0]), 0.1);
        assert_eq!(tree.predict_row(&[1.0, 5.0]), 0.4);
        assert_eq!(tree.predict_row(&[0.0, 50.0]), 0.9);
        assert_eq!(tree.n_splits(), 2);
        assert_eq!(tree.gains().unwrap(), &[4.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(tree.validate(2).is_ok());
    }

    #[test]
    fn gains_are_optional() {
        let tree = stump();
        assert!(!tree.has_gains());
        let tree = tree.with_gains(vec![3.0, 0.0, 0.0]);
        assert_eq!(tree.gains().unwrap(), &[3.0, 0.0, 0.0]);
    }

    #[test]
    fn validate_rejects_out_of_range_feature() {
        assert_eq!(
            stump().validate(0),
            Err(TreeValidationError::FeatureOutOfRange { node: 0, feature: 0, n_features: 0 })
        );
    }

    #[test]
    fn validate_rejects_bad_structure() {
        let self_loop = Tree::new(vec![0, 0], vec![0.5, 0.0], vec![0, 0], vec![1, 0], vec![false, true], vec![0.0; 2]);
        assert_eq!(self_loop.validate(1), Err(TreeValidationError::SelfLoop { node: 0 }));

        let out_of_bounds = Tree::new(vec![0; 2], vec![0.5, 0.0], vec![1, 0], vec![7, 0], vec![false, true], vec![0.0; 2]);
        assert!(matches!(
            out_of_bounds.validate(1),
            Err(TreeValidationError::ChildOutOfBounds { side: "right", child: 7, .. })
        ));

        let shared = Tree::new(vec![0; 2], vec![0.5, 0.0], vec![1, 0], vec![1, 0], vec![false, true], vec![0.0; 2]);
        assert_eq!(shared.validate(1), Err(TreeValidationError::DuplicateVisit { node: 1 }));

        let cycle = Tree::new(
            vec![0; 3],
            vec![0.5; 3],
            vec![1, 0, 0],
            vec![2, 2, 0],
            vec![false, false, true],
            vec![0.0; 3],
        );
        assert_eq!(cycle.validate(1), Err(TreeValidationError::CycleDetected { node: 0 }));

        let orphan = crate::decision_tree! {
            0 => split(0, 0.5) -> 1, 2,
            1 => leaf(0.0),
            2 => leaf(1.0),
            3 => leaf(1.0),
        };
        assert_eq!(orphan.validate(1), Err(TreeValidationError::UnreachableNode { node: 3 }));

        let empty = Tree::new(vec![], vec![], vec![], vec![], vec![], vec![]);
        assert_eq!(empty.validate(1), Err(TreeValidationError::EmptyTree));
    }

    #[test]
    fn validate_rejects_non_finite_leaf() {
        assert_eq!(
            Tree::constant(f64::NAN).validate(0),
            Err(TreeValidationError::NonFinite { node: 0, what: "leaf value" })
        );
        assert!(Tree::constant(0.3).validate(0).is_ok());
    }
}
