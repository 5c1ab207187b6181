//! Global feature importance for tree ensembles.

use crate::repr::{Forest, Tree, TreeView};

use super::IntrospectionUnavailable;

/// How split nodes are credited to their feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceType {
    /// Number of splits on the feature.
    Split,
    /// Mean decrease in impurity: per-tree normalised gain, averaged over trees.
    Gain,
}

/// Compute normalised per-feature importance for a forest.
///
/// The result has `n_features` non-negative entries summing to 1.
///
/// - `Split`: split counts over the whole forest.
/// - `Gain`: each tree's gains are normalised to sum 1, trees without any
///   positive gain are skipped, and the rest are averaged. Requires gain
///   statistics on every tree.
pub fn forest_importance(
    forest: &Forest,
    n_features: usize,
    importance_type: ImportanceType,
) -> Result<Vec<f64>, IntrospectionUnavailable> {
    if forest.n_splits() == 0 {
        return Err(IntrospectionUnavailable::NoSplits);
    }

    let mut totals = vec![0.0f64; n_features];
    match importance_type {
        ImportanceType::Split => {
            for tree in forest.trees() {
                for_each_split(tree, |_, feature| totals[feature] += 1.0);
            }
        }
        ImportanceType::Gain => {
            if !forest.has_gains() {
                return Err(IntrospectionUnavailable::MissingNodeStats);
            }
            let mut per_tree = vec![0.0f64; n_features];
            let mut n_contributing = 0usize;
            for tree in forest.trees() {
                let Some(gains) = tree.gains() else { continue };
                per_tree.fill(0.0);
                for_each_split(tree, |node, feature| {
                    per_tree[feature] += f64::from(gains[node]).max(0.0);
                });
                let sum: f64 = per_tree.iter().sum();
                if sum > 0.0 {
                    n_contributing += 1;
                    for (total, value) in totals.iter_mut().zip(&per_tree) {
                        *total += value / sum;
                    }
                }
            }
            if n_contributing == 0 {
                // Splits exist but carry no gain: credit them by count instead.
                return forest_importance(forest, n_features, ImportanceType::Split);
            }
        }
    }

    normalize(&mut totals);
    Ok(totals)
}

fn for_each_split(tree: &Tree, mut f: impl FnMut(usize, usize)) {
    for node in 0..tree.n_nodes() {
        if !tree.is_leaf(node as u32) {
            f(node, tree.split_index(node as u32) as usize);
        }
    }
}

fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_tree;
    use approx::assert_abs_diff_eq;

    fn forest_with_gains() -> Forest {
        Forest::new()
            .with_tree(decision_tree! {
                0 => split(0, 0.5, 6.0) -> 1, 2,
                1 => split(1, 0.5, 2.0) -> 3, 4,
                2 => leaf(1.0),
                3 => leaf(0.0),
                4 => leaf(0.5),
            })
            .with_tree(decision_tree! {
                0 => split(2, 0.5, 5.0) -> 1, 2,
                1 => leaf(0.0),
                2 => leaf(1.0),
            })
    }

    #[test]
    fn gain_importance_is_mean_of_normalised_trees() {
        let imp = forest_importance(&forest_with_gains(), 4, ImportanceType::Gain).unwrap();
        // tree 0: [0.75, 0.25, 0, 0], tree 1: [0, 0, 1, 0]
        assert_abs_diff_eq!(imp[0], 0.375, epsilon = 1e-12);
        assert_abs_diff_eq!(imp[1], 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(imp[2], 0.5, epsilon = 1e-12);
        assert_eq!(imp[3], 0.0);
    }

    #[test]
    fn split_importance_counts_splits() {
        let imp = forest_importance(&forest_with_gains(), 3, ImportanceType::Split).unwrap();
        for value in imp {
            assert_abs_diff_eq!(value, 1.0 / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn stumps_without_splits_are_skipped() {
        let forest = forest_with_gains().with_tree(Tree::constant(0.5).with_gains(vec![0.0]));
        let imp = forest_importance(&forest, 4, ImportanceType::Gain).unwrap();
        assert_abs_diff_eq!(imp[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn no_splits_is_unavailable() {
        let forest = Forest::new().with_tree(Tree::constant(0.5));
        assert_eq!(
            forest_importance(&forest, 2, ImportanceType::Split),
            Err(IntrospectionUnavailable::NoSplits)
        );
    }

    #[test]
    fn gain_requires_stats() {
        let forest = Forest::new().with_tree(decision_tree! {
            0 => split(0, 0.5) -> 1, 2,
            1 => leaf(0.0),
            2 => leaf(1.0),
        });
        assert_eq!(
            forest_importance(&forest, 1, ImportanceType::Gain),
            Err(IntrospectionUnavailable::MissingNodeStats)
        );
    }

    #[test]
    fn zero_gains_fall_back_to_split_counts() {
        let forest = Forest::new().with_tree(decision_tree! {
            0 => split(1, 0.5, 0.0) -> 1, 2,
            1 => leaf(0.0),
            2 => leaf(1.0),
        });
        let imp = forest_importance(&forest, 2, ImportanceType::Gain).unwrap();
        assert_eq!(imp, vec![0.0, 1.0]);
    }
}
