//! Preprocessor: fitted encoders turning a [`CandidateProfile`] into the
//! numeric [`FeatureVector`] the classifier was trained on.
//!
//! All parameters come from the loaded artifact; nothing is refitted.

mod step;

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use ndarray::Array2;

use crate::schema::{CandidateProfile, FieldId};
use crate::utils::Parallelism;

pub use step::EncodingStep;

// =============================================================================
// FeatureVector
// =============================================================================

/// Encoded numeric features for one candidate, in preprocessor output order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

// =============================================================================
// PreprocessError
// =============================================================================

/// A fitted preprocessor description is inconsistent with the feature schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("preprocessor has no steps")]
    NoSteps,

    #[error("unknown field {name:?}")]
    UnknownField { name: String },

    #[error("field {field} is encoded more than once")]
    DuplicateField { field: &'static str },

    #[error("one-hot encoding requires a categorical field, {field} is numeric")]
    NotCategorical { field: &'static str },

    #[error("numeric encoding requires a numeric field, {field} is categorical")]
    NotNumeric { field: &'static str },

    #[error("one-hot step for {field} has no categories")]
    EmptyCategories { field: &'static str },

    #[error("category {category:?} is not valid for {field}")]
    UnknownCategory { field: &'static str, category: String },

    #[error("category {category:?} of {field} is listed more than once")]
    DuplicateCategory { field: &'static str, category: &'static str },

    #[error("invalid standardization for {field}: mean {mean}, scale {scale}")]
    InvalidScale { field: &'static str, mean: f64, scale: f64 },
}

// =============================================================================
// Preprocessor
// =============================================================================

/// Ordered, fitted encoding steps.
///
/// Immutable after construction; [`transform`](Self::transform) is pure.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    steps: Vec<EncodingStep>,
    feature_names: Vec<String>,
}

impl Preprocessor {
    /// Build a preprocessor, checking every step against the schema.
    pub fn new(steps: Vec<EncodingStep>) -> Result<Self, PreprocessError> {
        if steps.is_empty() {
            return Err(PreprocessError::NoSteps);
        }

        let mut seen = HashSet::new();
        for step in &steps {
            let field = step.field();
            let name = field.name();
            if !seen.insert(field) {
                return Err(PreprocessError::DuplicateField { field: name });
            }
            check_step(step, field)?;
        }

        let mut feature_names = Vec::with_capacity(steps.iter().map(EncodingStep::width).sum());
        for step in &steps {
            step.push_names(&mut feature_names);
        }

        Ok(Self { steps, feature_names })
    }

    /// Encode one profile.
    pub fn transform(&self, profile: &CandidateProfile) -> FeatureVector {
        let mut out = vec![0.0; self.n_features()];
        self.transform_into(profile, &mut out);
        FeatureVector(out)
    }

    /// Encode one profile into a caller-provided buffer of length
    /// [`n_features`](Self::n_features).
    pub fn transform_into(&self, profile: &CandidateProfile, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.n_features());
        let mut offset = 0;
        for step in &self.steps {
            let width = step.width();
            step.encode(profile.value(step.field()), &mut out[offset..offset + width]);
            offset += width;
        }
    }

    /// Encode many profiles into a `[n_profiles, n_features]` matrix.
    ///
    /// Row `i` equals [`transform`](Self::transform) of `profiles[i]`.
    pub fn transform_batch<P>(&self, profiles: &[P], parallelism: Parallelism) -> Array2<f32>
    where
        P: Borrow<CandidateProfile> + Sync,
    {
        let mut out = Array2::zeros((profiles.len(), self.n_features()));
        parallelism.maybe_par_for_each(
            out.outer_iter_mut().zip(profiles).collect::<Vec<_>>(),
            |(mut row, profile)| {
                // Rows of a fresh standard-layout matrix are contiguous.
                if let Some(buf) = row.as_slice_mut() {
                    self.transform_into(profile.borrow(), buf);
                }
            },
        );
        out
    }

    /// Output feature names, aligned with [`transform`](Self::transform).
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    #[inline]
    pub fn steps(&self) -> &[EncodingStep] {
        &self.steps
    }
}

fn check_step(step: &EncodingStep, field: FieldId) -> Result<(), PreprocessError> {
    let name = field.name();
    let kind = field.spec().kind;
    match step {
        EncodingStep::OneHot { categories, .. } => {
            if !kind.is_categorical() {
                return Err(PreprocessError::NotCategorical { field: name });
            }
            if categories.is_empty() {
                return Err(PreprocessError::EmptyCategories { field: name });
            }
            let mut seen = HashSet::new();
            for &category in categories {
                if !seen.insert(category) {
                    return Err(PreprocessError::DuplicateCategory { field: name, category });
                }
            }
        }
        EncodingStep::Passthrough { .. } => {
            if !kind.is_numeric() {
                return Err(PreprocessError::NotNumeric { field: name });
            }
        }
        &EncodingStep::Standardize { mean, scale, .. } => {
            if !kind.is_numeric() {
                return Err(PreprocessError::NotNumeric { field: name });
            }
            if !mean.is_finite() || !scale.is_finite() || scale == 0.0 {
                return Err(PreprocessError::InvalidScale { field: name, mean, scale });
            }
        }
    }
    Ok(())
}

impl fmt::Display for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preprocessor({} steps, {} features)", self.steps.len(), self.n_features())
    }
}
