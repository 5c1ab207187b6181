//! placement: candidate placement prediction with global feature-importance
//! explanations.
//!
//! A trained model artifact (fitted preprocessor plus tree ensemble or
//! logistic regression) is loaded once, then shared by every prediction.
//!
//! # Key Types
//!
//! - [`CandidateProfile`] / [`RawRecord`] - Typed and untyped candidate input
//! - [`Model`] - Loaded preprocessor and classifier
//! - [`InferencePipeline`] - Validate, encode, classify
//! - [`Explainer`] / [`Explanation`] - Global importance ranking plus candidate context
//! - [`PipelineConfig`] - Configuration builder
//!
//! # Usage
//!
//! ```ignore
//! let pipeline = InferencePipeline::load("models/placement.json")?;
//! let result = pipeline.predict(&profile)?;
//! let explanation = Explainer::new().explain(&profile, &pipeline);
//! ```

// Re-export approx traits for users who want to compare probabilities
pub use approx;

pub mod classifier;
pub mod config;
pub mod explain;
pub mod logging;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod preprocess;
pub mod report;
pub mod repr;
pub mod schema;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Input
pub use schema::{validate, CandidateProfile, FieldId, RawRecord, ValidationError};

// Model and its parts
pub use classifier::{BinaryClassifier, Classifier, DecisionFunction, IntrospectionUnavailable};
pub use model::{Model, ModelMeta};
pub use persist::{ModelLoadError, ModelWriteError};
pub use preprocess::{FeatureVector, Preprocessor};

// Prediction and explanation
pub use explain::{Explainer, Explanation, ExplanationResult, ImportanceRanking};
pub use pipeline::{InferencePipeline, Placement, PredictionResult};

// Configuration
pub use config::{ConfigError, PipelineConfig};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
