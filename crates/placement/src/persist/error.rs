//! Errors raised while reading or writing model artifacts.

use std::io;
use std::path::PathBuf;

use crate::preprocess::PreprocessError;
use crate::repr::TreeValidationError;

/// The model artifact could not be loaded. Fatal at start-up.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format {found:?}, expected {expected:?}")]
    UnsupportedFormat { found: String, expected: &'static str },

    #[error("unsupported artifact version {found}, this build reads version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid preprocessor: {0}")]
    Preprocessor(#[from] PreprocessError),

    #[error("invalid tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },

    #[error("preprocessor produces {preprocessor} features but the classifier expects {classifier}")]
    FeatureCountMismatch { preprocessor: usize, classifier: usize },

    #[error("decision threshold must be in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),
}

/// The model artifact could not be written.
#[derive(Debug, thiserror::Error)]
pub enum ModelWriteError {
    #[error("failed to write model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize model artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
