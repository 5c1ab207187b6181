//! Pipeline configuration with builder pattern.
//!
//! [`PipelineConfig`] collects everything needed to stand up a pipeline and
//! an explainer. It uses `bon` for the builder and validates at build time.
//!
//! ```ignore
//! let config = PipelineConfig::builder()
//!     .model_path("models/placement.json")
//!     .top_k(5)
//!     .threshold(0.6)
//!     .build()?;
//! ```

use std::path::PathBuf;

use bon::Builder;

use crate::explain::DEFAULT_TOP_K;

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("threshold must be in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("model_path must not be empty")]
    EmptyModelPath,
}

/// Configuration for the inference pipeline and explainer.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct PipelineConfig {
    /// Path of the model artifact.
    #[builder(into)]
    pub model_path: PathBuf,

    /// Number of ranked features in explanations. Default: 10.
    #[builder(default = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Override of the artifact's decision threshold.
    pub threshold: Option<f64>,

    /// Threads for batch prediction. 0 = auto, 1 = sequential. Default: 0.
    #[builder(default)]
    pub n_threads: usize,
}

/// Custom finishing function that validates the config.
impl<S: pipeline_config_builder::IsComplete> PipelineConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - `top_k == 0`
    /// - `threshold` outside `[0, 1]`
    /// - empty `model_path`
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::InvalidThreshold(t));
            }
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        Ok(())
    }
}
