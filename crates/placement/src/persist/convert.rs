//! Conversion between runtime types and schema types.
//!
//! Runtime → schema conversions are lossless `From` impls. Schema → runtime
//! conversions are `TryFrom` and run every load-time check.

use crate::classifier::{Aggregation, Classifier, DecisionFunction, TreeEnsemble};
use crate::model::{Model, ModelMeta};
use crate::preprocess::{EncodingStep, PreprocessError, Preprocessor};
use crate::repr::{Forest, ForestValidationError, LinearModel, Tree, TreeValidationError, TreeView};
use crate::schema::{canonical_label, FieldId};

use super::error::ModelLoadError;
use super::schema::{
    AggregationSchema, ClassifierSchema, EncodingStepSchema, ModelArtifactSchema, ModelMetaSchema,
    PreprocessorSchema, TreeSchema, FORMAT_NAME, SCHEMA_VERSION,
};

// =============================================================================
// Preprocessor
// =============================================================================

fn lookup_field(name: String) -> Result<FieldId, PreprocessError> {
    FieldId::from_name(&name).ok_or(PreprocessError::UnknownField { name })
}

impl TryFrom<EncodingStepSchema> for EncodingStep {
    type Error = PreprocessError;

    fn try_from(schema: EncodingStepSchema) -> Result<Self, Self::Error> {
        Ok(match schema {
            EncodingStepSchema::OneHot { field, categories } => {
                let field = lookup_field(field)?;
                if !field.spec().kind.is_categorical() {
                    return Err(PreprocessError::NotCategorical { field: field.name() });
                }
                let categories = categories
                    .into_iter()
                    .map(|category| {
                        canonical_label(field, &category).ok_or(PreprocessError::UnknownCategory {
                            field: field.name(),
                            category,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                EncodingStep::OneHot { field, categories }
            }
            EncodingStepSchema::Passthrough { field } => EncodingStep::Passthrough {
                field: lookup_field(field)?,
            },
            EncodingStepSchema::Standardize { field, mean, scale } => EncodingStep::Standardize {
                field: lookup_field(field)?,
                mean,
                scale,
            },
        })
    }
}

impl From<&EncodingStep> for EncodingStepSchema {
    fn from(step: &EncodingStep) -> Self {
        let field = step.field().name().to_string();
        match step {
            EncodingStep::OneHot { categories, .. } => EncodingStepSchema::OneHot {
                field,
                categories: categories.iter().map(|c| c.to_string()).collect(),
            },
            EncodingStep::Passthrough { .. } => EncodingStepSchema::Passthrough { field },
            &EncodingStep::Standardize { mean, scale, .. } => {
                EncodingStepSchema::Standardize { field, mean, scale }
            }
        }
    }
}

impl TryFrom<PreprocessorSchema> for Preprocessor {
    type Error = PreprocessError;

    fn try_from(schema: PreprocessorSchema) -> Result<Self, Self::Error> {
        let steps = schema
            .steps
            .into_iter()
            .map(EncodingStep::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Preprocessor::new(steps)
    }
}

impl From<&Preprocessor> for PreprocessorSchema {
    fn from(preprocessor: &Preprocessor) -> Self {
        Self {
            steps: preprocessor.steps().iter().map(EncodingStepSchema::from).collect(),
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

fn check_len(array: &'static str, len: usize, n_nodes: usize) -> Result<(), TreeValidationError> {
    if len == n_nodes {
        Ok(())
    } else {
        Err(TreeValidationError::LengthMismatch { array, len, n_nodes })
    }
}

/// Checks array lengths only; structure is validated by [`Forest::validate`].
impl TryFrom<TreeSchema> for Tree {
    type Error = TreeValidationError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let n = schema.num_nodes as usize;
        if n == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        check_len("split_indices", schema.split_indices.len(), n)?;
        check_len("thresholds", schema.thresholds.len(), n)?;
        check_len("children_left", schema.children_left.len(), n)?;
        check_len("children_right", schema.children_right.len(), n)?;
        check_len("is_leaf", schema.is_leaf.len(), n)?;
        check_len("leaf_values", schema.leaf_values.len(), n)?;
        if let Some(gains) = &schema.gains {
            check_len("gains", gains.len(), n)?;
        }

        let mut tree = Tree::new(
            schema.split_indices,
            schema.thresholds.into_iter().map(|t| t as f32).collect(),
            schema.children_left,
            schema.children_right,
            schema.is_leaf,
            schema.leaf_values,
        );
        if let Some(gains) = schema.gains {
            tree = tree.with_gains(gains.into_iter().map(|g| g as f32).collect());
        }
        Ok(tree)
    }
}

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        Self {
            num_nodes: tree.n_nodes() as u32,
            split_indices: tree.split_indices().to_vec(),
            thresholds: tree.split_thresholds().iter().map(|&t| f64::from(t)).collect(),
            children_left: tree.left_children().to_vec(),
            children_right: tree.right_children().to_vec(),
            is_leaf: tree.leaf_flags().to_vec(),
            leaf_values: tree.leaf_values().to_vec(),
            gains: tree.gains().map(|g| g.iter().map(|&x| f64::from(x)).collect()),
        }
    }
}

// =============================================================================
// Classifier
// =============================================================================

impl From<AggregationSchema> for Aggregation {
    fn from(schema: AggregationSchema) -> Self {
        match schema {
            AggregationSchema::Average => Aggregation::Average,
            AggregationSchema::Boosted => Aggregation::Boosted,
        }
    }
}

impl From<Aggregation> for AggregationSchema {
    fn from(aggregation: Aggregation) -> Self {
        match aggregation {
            Aggregation::Average => AggregationSchema::Average,
            Aggregation::Boosted => AggregationSchema::Boosted,
        }
    }
}

/// Build the decision function for a preprocessor producing `n_features` outputs.
fn decision_function(
    schema: ClassifierSchema,
    n_features: usize,
) -> Result<DecisionFunction, ModelLoadError> {
    match schema {
        ClassifierSchema::TreeEnsemble { aggregation, base_score, n_features: declared, trees } => {
            if let Some(declared) = declared {
                if declared != n_features {
                    return Err(ModelLoadError::FeatureCountMismatch {
                        preprocessor: n_features,
                        classifier: declared,
                    });
                }
            }
            let aggregation = Aggregation::from(aggregation);

            let mut forest = Forest::new().with_base_score(base_score);
            for (tree_idx, tree) in trees.into_iter().enumerate() {
                let tree = Tree::try_from(tree)
                    .map_err(|error| ModelLoadError::InvalidTree { tree_idx, error })?;
                forest.push_tree(tree);
            }

            if aggregation == Aggregation::Average {
                check_probability_leaves(&forest, base_score)?;
            }

            let ensemble = TreeEnsemble::new(forest, aggregation, n_features).map_err(|e| match e {
                ForestValidationError::InvalidTree { tree_idx, error } => {
                    ModelLoadError::InvalidTree { tree_idx, error }
                }
                other => ModelLoadError::InvalidClassifier(other.to_string()),
            })?;
            Ok(DecisionFunction::TreeEnsemble(ensemble))
        }
        ClassifierSchema::Linear { weights, bias } => {
            if weights.len() != n_features {
                return Err(ModelLoadError::FeatureCountMismatch {
                    preprocessor: n_features,
                    classifier: weights.len(),
                });
            }
            let model = LinearModel::new(weights, bias);
            if !model.is_finite() {
                return Err(ModelLoadError::InvalidClassifier(
                    "linear coefficients must be finite".into(),
                ));
            }
            Ok(DecisionFunction::Linear(model))
        }
    }
}

/// Averaged ensembles vote with class-1 probabilities and have no base score.
fn check_probability_leaves(forest: &Forest, base_score: f64) -> Result<(), ModelLoadError> {
    if base_score != 0.0 {
        return Err(ModelLoadError::InvalidClassifier(format!(
            "averaged ensembles take no base score, got {base_score}"
        )));
    }
    for (tree_idx, tree) in forest.trees().enumerate() {
        let out_of_range = (0..tree.n_nodes() as u32)
            .filter(|&n| tree.is_leaf(n))
            .map(|n| tree.leaf_value(n))
            .find(|v| !(0.0..=1.0).contains(v));
        if let Some(value) = out_of_range {
            return Err(ModelLoadError::InvalidClassifier(format!(
                "tree {tree_idx} has leaf value {value} outside [0, 1] in an averaged ensemble"
            )));
        }
    }
    Ok(())
}

impl From<&DecisionFunction> for ClassifierSchema {
    fn from(function: &DecisionFunction) -> Self {
        match function {
            DecisionFunction::TreeEnsemble(e) => ClassifierSchema::TreeEnsemble {
                aggregation: e.aggregation().into(),
                base_score: e.forest().base_score(),
                n_features: Some(e.n_features()),
                trees: e.forest().trees().map(TreeSchema::from).collect(),
            },
            DecisionFunction::Linear(m) => ClassifierSchema::Linear {
                weights: m.weights().to_vec(),
                bias: m.bias(),
            },
        }
    }
}

// =============================================================================
// Model
// =============================================================================

impl From<ModelMetaSchema> for ModelMeta {
    fn from(schema: ModelMetaSchema) -> Self {
        Self {
            name: schema.name,
            description: schema.description,
            trained_at: schema.trained_at,
        }
    }
}

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        Self {
            name: meta.name.clone(),
            description: meta.description.clone(),
            trained_at: meta.trained_at.clone(),
        }
    }
}

impl TryFrom<ModelArtifactSchema> for Model {
    type Error = ModelLoadError;

    fn try_from(schema: ModelArtifactSchema) -> Result<Self, Self::Error> {
        if schema.format != FORMAT_NAME {
            return Err(ModelLoadError::UnsupportedFormat {
                found: schema.format,
                expected: FORMAT_NAME,
            });
        }
        if schema.version != SCHEMA_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: schema.version,
                supported: SCHEMA_VERSION,
            });
        }

        let preprocessor = Preprocessor::try_from(schema.preprocessor)?;
        let function = decision_function(schema.classifier, preprocessor.n_features())?;
        let classifier = Classifier::new(function)
            .with_threshold(schema.threshold)
            .map_err(|e| ModelLoadError::InvalidThreshold(e.0))?;

        Model::new(preprocessor, classifier, schema.meta.into())
    }
}

impl From<&Model> for ModelArtifactSchema {
    fn from(model: &Model) -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: SCHEMA_VERSION,
            meta: model.meta().into(),
            threshold: model.threshold(),
            preprocessor: model.preprocessor().into(),
            classifier: model.classifier().function().into(),
        }
    }
}
