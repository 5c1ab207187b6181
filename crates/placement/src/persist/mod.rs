//! Model artifact persistence.
//!
//! The artifact is a single JSON document ([`ModelArtifactSchema`]) holding
//! the fitted preprocessor and the trained classifier. Loading validates
//! everything before a [`Model`] exists; a failed load is fatal to start-up.
//!
//! ```ignore
//! let model = Model::load("models/placement.json")?;
//! model.save_json("/tmp/copy.json")?;
//! ```

mod convert;
mod error;
mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::model::Model;

pub use error::{ModelLoadError, ModelWriteError};
pub use schema::{
    AggregationSchema, ClassifierSchema, EncodingStepSchema, ModelArtifactSchema, ModelMetaSchema,
    PreprocessorSchema, TreeSchema, FORMAT_NAME, SCHEMA_VERSION,
};

impl Model {
    /// Load and validate a model artifact from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::read_json(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            name = model.meta().name.as_deref().unwrap_or("<unnamed>"),
            classifier = model.classifier().kind(),
            n_trees = model.classifier().n_trees(),
            n_features = model.n_features(),
            threshold = model.threshold(),
            "loaded placement model"
        );
        Ok(model)
    }

    /// Read and validate a model artifact from any reader.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let schema: ModelArtifactSchema = serde_json::from_reader(reader)?;
        Self::try_from(schema)
    }

    /// Parse and validate a model artifact held in memory.
    pub fn from_json_str(json: &str) -> Result<Self, ModelLoadError> {
        let schema: ModelArtifactSchema = serde_json::from_str(json)?;
        Self::try_from(schema)
    }

    /// The artifact representation of this model.
    pub fn to_artifact(&self) -> ModelArtifactSchema {
        ModelArtifactSchema::from(self)
    }

    /// Write the artifact as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ModelWriteError> {
        serde_json::to_writer_pretty(writer, &self.to_artifact())?;
        Ok(())
    }

    /// Write the artifact to `path`, replacing any existing file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ModelWriteError> {
        let path = path.as_ref();
        let io_err = |source| ModelWriteError::Io { path: path.to_path_buf(), source };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}
