//! The loaded placement model.
//!
//! A [`Model`] bundles the fitted [`Preprocessor`] with the trained
//! [`Classifier`]. It is built once (see [`Model::load`]) and never mutated;
//! share it behind an `Arc`.

use crate::classifier::{BinaryClassifier, Classifier, InvalidThreshold};
use crate::persist::ModelLoadError;
use crate::preprocess::Preprocessor;

/// Descriptive metadata carried in the artifact.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Free-form training timestamp.
    pub trained_at: Option<String>,
}

/// Fitted preprocessor plus trained classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    preprocessor: Preprocessor,
    classifier: Classifier,
    meta: ModelMeta,
}

impl Model {
    /// Assemble a model, checking that the classifier consumes exactly what
    /// the preprocessor produces.
    pub fn new(
        preprocessor: Preprocessor,
        classifier: Classifier,
        meta: ModelMeta,
    ) -> Result<Self, ModelLoadError> {
        if preprocessor.n_features() != classifier.n_features() {
            return Err(ModelLoadError::FeatureCountMismatch {
                preprocessor: preprocessor.n_features(),
                classifier: classifier.n_features(),
            });
        }
        Ok(Self { preprocessor, classifier, meta })
    }

    #[inline]
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    #[inline]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[inline]
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.classifier.threshold()
    }

    /// Replace the decision threshold. Only valid before the model is shared.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, InvalidThreshold> {
        self.classifier = self.classifier.with_threshold(threshold)?;
        Ok(self)
    }

    /// Output feature names, aligned with the encoded feature vector.
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        self.preprocessor.feature_names()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.preprocessor.n_features()
    }
}
