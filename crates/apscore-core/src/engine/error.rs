use super::config::ConfigError;
use crate::core::classifier::tree_ensemble::ClassifierLoadError;
use crate::core::io::error::TableLoadError;
use crate::core::io::results::ResultWriteError;
use crate::core::models::ids::CompoundId;
use crate::core::representation::RepresentationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InputFormat(#[source] TableLoadError),

    #[error("Representation failed: {source}")]
    Representation {
        #[from]
        source: RepresentationError,
    },

    #[error("Strain name '{strain}' does not contain a '(NT<digits>)' token")]
    StrainParse { strain: String },

    #[error("Feature dimension mismatch: classifier expects {expected} features, matrix has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Failed to load {artifact}: {reason}")]
    ModelLoad {
        artifact: &'static str,
        reason: String,
    },

    #[error("Strain '{0}' is not part of the strain panel")]
    UnknownStrain(String),

    #[error("Compound '{id}' has no predictions")]
    MissingCompound { id: CompoundId },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Failed to write results: {source}")]
    Output {
        #[from]
        source: ResultWriteError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn model_load(artifact: &'static str, reason: impl ToString) -> Self {
        Self::ModelLoad {
            artifact,
            reason: reason.to_string(),
        }
    }
}

impl From<ClassifierLoadError> for EngineError {
    fn from(e: ClassifierLoadError) -> Self {
        Self::model_load("classifier", e)
    }
}
