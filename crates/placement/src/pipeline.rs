//! Inference pipeline: validate → preprocess → classify.
//!
//! An [`InferencePipeline`] can only be built from a loaded [`Model`]; it holds
//! no per-call state and is safe to share across threads.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ndarray::ArrayView1;
use serde::Serialize;

use crate::classifier::{BinaryClassifier, IntrospectionUnavailable};
use crate::config::PipelineConfig;
use crate::model::Model;
use crate::persist::ModelLoadError;
use crate::preprocess::Preprocessor;
use crate::schema::{self, CandidateProfile, RawRecord, ValidationError};
use crate::utils::{run_with_threads, Parallelism};

// =============================================================================
// PredictionResult
// =============================================================================

/// Predicted outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Placement {
    #[serde(rename = "Placed")]
    Placed,
    #[serde(rename = "Not Placed")]
    NotPlaced,
}

impl Placement {
    /// Class label: 1 = Placed.
    #[inline]
    pub fn as_label(self) -> u8 {
        match self {
            Placement::Placed => 1,
            Placement::NotPlaced => 0,
        }
    }

    #[inline]
    pub fn is_placed(self) -> bool {
        self == Placement::Placed
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Placement::Placed => "Placed",
            Placement::NotPlaced => "Not Placed",
        })
    }
}

/// Label plus probability of the Placed class.
///
/// `label == Placed` exactly when `probability >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: Placement,
    pub probability: f64,
}

// =============================================================================
// InferencePipeline
// =============================================================================

/// Composes the loaded preprocessor and classifier behind `predict`.
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    model: Arc<Model>,
}

impl InferencePipeline {
    pub fn new(model: Arc<Model>) -> Self {
        Self { model }
    }

    pub fn from_model(model: Model) -> Self {
        Self::new(Arc::new(model))
    }

    /// Load the model artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        Model::load(path).map(Self::from_model)
    }

    /// Load the configured model, applying the threshold override if any.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ModelLoadError> {
        let mut model = Model::load(&config.model_path)?;
        if let Some(threshold) = config.threshold {
            model = model
                .with_threshold(threshold)
                .map_err(|e| ModelLoadError::InvalidThreshold(e.0))?;
        }
        Ok(Self::from_model(model))
    }

    /// Predict placement for one candidate.
    ///
    /// Fails with [`ValidationError`] before any model work if a field is out
    /// of its domain.
    pub fn predict(&self, profile: &CandidateProfile) -> Result<PredictionResult, ValidationError> {
        predict_with(self.model.preprocessor(), self.model.classifier(), profile)
    }

    /// Validate a raw record, then predict.
    pub fn predict_record(
        &self,
        record: &RawRecord,
    ) -> Result<(CandidateProfile, PredictionResult), ValidationError> {
        let profile = schema::validate(record)?;
        let result = self.predict(&profile)?;
        Ok((profile, result))
    }

    /// Predict many candidates independently.
    ///
    /// `n_threads`: 0 = auto, 1 = sequential, n = exactly n threads. Results
    /// are in input order and identical to calling [`predict`](Self::predict)
    /// per row.
    pub fn predict_batch(
        &self,
        profiles: &[CandidateProfile],
        n_threads: usize,
    ) -> Vec<Result<PredictionResult, ValidationError>> {
        run_with_threads(n_threads, |parallelism| self.predict_batch_with(profiles, parallelism))
    }

    /// Validate every profile, encode the valid ones as one matrix, then
    /// classify its rows.
    fn predict_batch_with(
        &self,
        profiles: &[CandidateProfile],
        parallelism: Parallelism,
    ) -> Vec<Result<PredictionResult, ValidationError>> {
        let checked: Vec<Result<(), ValidationError>> = profiles.iter().map(CandidateProfile::validate).collect();
        let valid: Vec<&CandidateProfile> = profiles
            .iter()
            .zip(&checked)
            .filter_map(|(profile, check)| check.is_ok().then_some(profile))
            .collect();

        let matrix = self.model.preprocessor().transform_batch(&valid, parallelism);
        let classifier = self.model.classifier();
        let rows: Vec<ArrayView1<'_, f32>> = matrix.outer_iter().collect();
        let probabilities = parallelism.maybe_par_map(rows, |row| match row.as_slice() {
            Some(row) => classifier.predict_proba_row(row),
            None => classifier.predict_proba_row(&row.to_vec()),
        });
        tracing::debug!(n_profiles = profiles.len(), n_valid = valid.len(), "predicted batch");

        let mut probabilities = probabilities.into_iter();
        checked
            .into_iter()
            .map(|check| {
                check?;
                let probability = probabilities.next().unwrap_or(0.0);
                Ok(decide(probability, classifier.threshold()))
            })
            .collect()
    }

    /// Names of the encoded features, aligned with
    /// [`feature_importances`](Self::feature_importances).
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Global importances of the encoded features.
    pub fn feature_importances(&self) -> Result<Vec<f64>, IntrospectionUnavailable> {
        self.model.classifier().feature_importances()
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.model.threshold()
    }

    #[inline]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }
}

/// Validate, encode and classify one profile.
fn predict_with<C: BinaryClassifier>(
    preprocessor: &Preprocessor,
    classifier: &C,
    profile: &CandidateProfile,
) -> Result<PredictionResult, ValidationError> {
    profile.validate()?;

    let features = preprocessor.transform(profile);
    let result = decide(classifier.predict_proba(&features), classifier.threshold());

    tracing::debug!(label = %result.label, probability = result.probability, "predicted placement");
    Ok(result)
}

/// Placed exactly when `probability >= threshold`.
#[inline]
fn decide(probability: f64, threshold: f64) -> PredictionResult {
    let label = if probability >= threshold {
        Placement::Placed
    } else {
        Placement::NotPlaced
    };
    PredictionResult { label, probability }
}
