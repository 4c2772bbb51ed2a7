//! Pretrained (compound, strain) classifiers behind the [`Classifier`] capability.
//!
//! The pipeline only needs a two-class probability per feature-matrix row. The default
//! implementation is a gradient boosted tree ensemble loaded from a JSON artifact
//! ([`tree_ensemble::TreeEnsembleClassifier`]).

pub mod tree_ensemble;

use crate::core::models::matrix::FeatureMatrix;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("Feature dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Classifier failed: {0}")]
    Failed(String),
}

pub trait Classifier {
    /// Number of input features the model was trained on.
    fn num_features(&self) -> usize;

    /// Returns `[p(class 0), p(class 1)]` for every row of `features`, in row order.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError>;
}
