//! Schema types for the model artifact.
//!
//! These types define the JSON format independent of runtime types, so the
//! format can evolve separately and everything read from disk passes through
//! validation in [`convert`](super::convert) before becoming a runtime value.

use serde::{Deserialize, Serialize};

/// Value of the `format` tag.
pub const FORMAT_NAME: &str = "placement-model";

/// Current artifact version.
pub const SCHEMA_VERSION: u32 = 1;

fn default_threshold() -> f64 {
    crate::classifier::DEFAULT_THRESHOLD
}

/// Top-level artifact: fitted preprocessor plus trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifactSchema {
    /// Always [`FORMAT_NAME`].
    pub format: String,
    pub version: u32,
    #[serde(default)]
    pub meta: ModelMetaSchema,
    /// Probability at or above which a candidate is Placed.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub preprocessor: PreprocessorSchema,
    pub classifier: ClassifierSchema,
}

/// Descriptive metadata. Not used for inference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
}

/// Fitted column transformations, in output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorSchema {
    pub steps: Vec<EncodingStepSchema>,
}

/// One fitted column transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncodingStepSchema {
    OneHot { field: String, categories: Vec<String> },
    Passthrough { field: String },
    Standardize { field: String, mean: f64, scale: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationSchema {
    Average,
    Boosted,
}

/// Trained decision function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSchema {
    TreeEnsemble {
        aggregation: AggregationSchema,
        #[serde(default)]
        base_score: f64,
        /// Expected input width; checked against the preprocessor when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n_features: Option<usize>,
        trees: Vec<TreeSchema>,
    },
    Linear { weights: Vec<f64>, bias: f64 },
}

/// Tree schema (SoA layout). Every array has `num_nodes` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Split feature index per node (ignored for leaves).
    pub split_indices: Vec<u32>,
    /// Split threshold per node (ignored for leaves).
    pub thresholds: Vec<f64>,
    pub children_left: Vec<u32>,
    pub children_right: Vec<u32>,
    pub is_leaf: Vec<bool>,
    /// Leaf output per node (ignored for splits).
    pub leaf_values: Vec<f64>,
    /// Optional impurity decrease per node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gains: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn steps_are_tagged_by_type() {
        let step: EncodingStepSchema = serde_json::from_value(json!({
            "type": "standardize", "field": "mba_percent", "mean": 62.1, "scale": 5.8
        }))
        .unwrap();
        assert_eq!(
            step,
            EncodingStepSchema::Standardize { field: "mba_percent".into(), mean: 62.1, scale: 5.8 }
        );
    }

    #[test]
    fn optional_fields_default() {
        let artifact: ModelArtifactSchema = serde_json::from_value(json!({
            "format": FORMAT_NAME,
            "version": 1,
            "preprocessor": { "steps": [] },
            "classifier": { "type": "linear", "weights": [], "bias": 0.0 }
        }))
        .unwrap();
        assert_eq!(artifact.threshold, 0.5);
        assert_eq!(artifact.meta, ModelMetaSchema::default());
    }

    #[test]
    fn unknown_classifier_type_is_rejected() {
        let result: Result<ClassifierSchema, _> =
            serde_json::from_value(json!({ "type": "svm", "support_vectors": [] }));
        assert!(result.is_err());
    }
}
