//! Binary placement classifier over encoded feature vectors.
//!
//! [`Classifier`] pairs a [`DecisionFunction`] with a decision threshold. Tree
//! ensembles expose global feature importances; linear models do not.

mod importance;

use crate::preprocess::FeatureVector;
use crate::repr::{Forest, ForestValidationError, LinearModel};

pub use importance::{forest_importance, ImportanceType};

/// Default probability threshold for the Placed class.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

// =============================================================================
// Errors
// =============================================================================

/// The classifier cannot attribute importance to its input features.
///
/// Expected for some model kinds; callers degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectionUnavailable {
    #[error("{kind} models do not expose feature importances")]
    NotSupported { kind: &'static str },

    #[error("the ensemble has no split nodes")]
    NoSplits,

    #[error("trees carry no gain statistics")]
    MissingNodeStats,
}

/// Decision threshold outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("decision threshold must be in [0, 1], got {0}")]
pub struct InvalidThreshold(pub f64);

// =============================================================================
// Decision functions
// =============================================================================

/// How per-tree leaf values combine into a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean of per-tree class-1 probabilities (random forest).
    Average,
    /// `sigmoid(base_score + Σ leaf margins)` (gradient boosting).
    Boosted,
}

/// A validated tree ensemble bound to a feature width.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    forest: Forest,
    aggregation: Aggregation,
    n_features: usize,
}

impl TreeEnsemble {
    /// Validate `forest` against `n_features` and wrap it.
    pub fn new(
        forest: Forest,
        aggregation: Aggregation,
        n_features: usize,
    ) -> Result<Self, ForestValidationError> {
        forest.validate(n_features)?;
        Ok(Self { forest, aggregation, n_features })
    }

    #[inline]
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    #[inline]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn probability(&self, features: &[f32]) -> f64 {
        match self.aggregation {
            Aggregation::Average => {
                let sum: f64 = self.forest.leaf_values(features).sum();
                sum / self.forest.n_trees() as f64
            }
            Aggregation::Boosted => {
                let margin: f64 = self.forest.leaf_values(features).sum();
                sigmoid(self.forest.base_score() + margin)
            }
        }
    }

    /// Gain-based importance when every tree has gains, split counts otherwise.
    pub fn feature_importances(&self) -> Result<Vec<f64>, IntrospectionUnavailable> {
        let importance_type = if self.forest.has_gains() {
            ImportanceType::Gain
        } else {
            ImportanceType::Split
        };
        forest_importance(&self.forest, self.n_features, importance_type)
    }
}

/// The trained decision function.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionFunction {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl DecisionFunction {
    /// Short model-kind name for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionFunction::TreeEnsemble(e) => match e.aggregation {
                Aggregation::Average => "random_forest",
                Aggregation::Boosted => "boosted_trees",
            },
            DecisionFunction::Linear(_) => "logistic_regression",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            DecisionFunction::TreeEnsemble(e) => e.n_features(),
            DecisionFunction::Linear(m) => m.n_features(),
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// =============================================================================
// BinaryClassifier
// =============================================================================

/// Anything that scores an encoded candidate for the Placed class.
pub trait BinaryClassifier {
    /// Probability of the Placed class, in `[0, 1]`.
    fn predict_proba(&self, features: &FeatureVector) -> f64;

    /// Probability at or above which a candidate is Placed.
    fn threshold(&self) -> f64;

    /// `1` = Placed, `0` = Not Placed.
    fn predict(&self, features: &FeatureVector) -> u8 {
        u8::from(self.predict_proba(features) >= self.threshold())
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Decision function plus decision threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    function: DecisionFunction,
    threshold: f64,
}

impl Classifier {
    /// Wrap a decision function with the default threshold of 0.5.
    pub fn new(function: DecisionFunction) -> Self {
        Self { function, threshold: DEFAULT_THRESHOLD }
    }

    /// Replace the decision threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, InvalidThreshold> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(InvalidThreshold(threshold));
        }
        self.threshold = threshold;
        Ok(self)
    }

    #[inline]
    pub fn function(&self) -> &DecisionFunction {
        &self.function
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        self.function.kind()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.function.n_features()
    }

    /// Number of trees, 0 for linear models.
    pub fn n_trees(&self) -> usize {
        match &self.function {
            DecisionFunction::TreeEnsemble(e) => e.forest().n_trees(),
            DecisionFunction::Linear(_) => 0,
        }
    }

    /// Global importances aligned index-for-index with the feature vector.
    ///
    /// Non-negative and summing to 1.
    pub fn feature_importances(&self) -> Result<Vec<f64>, IntrospectionUnavailable> {
        match &self.function {
            DecisionFunction::TreeEnsemble(e) => e.feature_importances(),
            DecisionFunction::Linear(_) => Err(IntrospectionUnavailable::NotSupported {
                kind: self.kind(),
            }),
        }
    }

    /// Probability of the Placed class for one encoded row.
    pub fn predict_proba_row(&self, features: &[f32]) -> f64 {
        debug_assert_eq!(features.len(), self.n_features());
        let p = match &self.function {
            DecisionFunction::TreeEnsemble(e) => e.probability(features),
            DecisionFunction::Linear(m) => sigmoid(m.margin(features)),
        };
        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}

impl BinaryClassifier for Classifier {
    #[inline]
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        self.predict_proba_row(features.as_slice())
    }

    #[inline]
    fn threshold(&self) -> f64 {
        self.threshold
    }
}
