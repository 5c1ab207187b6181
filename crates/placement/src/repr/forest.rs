//! Canonical forest representation (collection of trees).

use super::tree::{Tree, TreeValidationError, TreeView};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("forest has no trees")]
    NoTrees,

    #[error("base score must be finite, got {0}")]
    NonFiniteBaseScore(f64),

    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },
}

/// Forest of binary decision trees with a single output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f64,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base score (boosted ensembles start from it).
    pub fn with_base_score(mut self, base_score: f64) -> Self {
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Add a tree (builder pattern).
    pub fn with_tree(mut self, tree: Tree) -> Self {
        self.trees.push(tree);
        self
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Total number of split nodes across all trees.
    pub fn n_splits(&self) -> usize {
        self.trees.iter().map(TreeView::n_splits).sum()
    }

    /// Whether every tree carries gain statistics.
    pub fn has_gains(&self) -> bool {
        !self.trees.is_empty() && self.trees.iter().all(Tree::has_gains)
    }

    /// Per-tree leaf values reached by `features`.
    pub fn leaf_values<'a>(&'a self, features: &'a [f32]) -> impl Iterator<Item = f64> + 'a {
        self.trees.iter().map(move |tree| tree.predict_row(features))
    }

    /// Validate every tree against a feature width.
    pub fn validate(&self, n_features: usize) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::NoTrees);
        }
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore(self.base_score));
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }
}
