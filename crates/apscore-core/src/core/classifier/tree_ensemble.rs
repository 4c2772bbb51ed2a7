use super::{Classifier, ClassifierError};
use crate::core::models::matrix::FeatureMatrix;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// A node of a regression tree, stored in a flat per-tree array.
///
/// Rows go left when `x < split_condition`; a missing (NaN) feature follows
/// `default_left`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        split_feature: usize,
        split_condition: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    num_features: usize,
    base_score: f64,
    trees: Vec<Vec<TreeNode>>,
}

#[derive(Debug, Error)]
pub enum ClassifierLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid model in '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

/// Binary gradient boosted tree ensemble with a logistic link.
///
/// `p(class 1) = sigmoid(logit(base_score) + Σ leaf values)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsembleClassifier {
    num_features: usize,
    base_margin: f64,
    trees: Vec<Vec<TreeNode>>,
}

impl TreeEnsembleClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierLoadError> {
        let origin = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ClassifierLoadError::Io {
            path: origin.clone(),
            source: e,
        })?;
        let model = Self::from_json_str(&content, &origin)?;
        debug!(
            "Loaded tree ensemble with {} trees over {} features from {}.",
            model.trees.len(),
            model.num_features,
            origin
        );
        Ok(model)
    }

    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ClassifierLoadError> {
        let file: ModelFile =
            serde_json::from_str(content).map_err(|e| ClassifierLoadError::Json {
                path: origin.to_string(),
                source: e,
            })?;
        let invalid = |reason: String| ClassifierLoadError::Invalid {
            path: origin.to_string(),
            reason,
        };

        if !(file.base_score > 0.0 && file.base_score < 1.0) {
            return Err(invalid(format!(
                "base_score must lie strictly between 0 and 1, got {}",
                file.base_score
            )));
        }
        for (t, tree) in file.trees.iter().enumerate() {
            validate_tree(tree, file.num_features).map_err(|reason| {
                invalid(format!("tree {}: {}", t, reason))
            })?;
        }

        Ok(Self {
            num_features: file.num_features,
            base_margin: (file.base_score / (1.0 - file.base_score)).ln(),
            trees: file.trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    fn margin(&self, feature: impl Fn(usize) -> f64) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| leaf_value(tree, &feature))
                .sum::<f64>()
    }
}

/// Children must come after their parent, which keeps every traversal finite.
fn validate_tree(tree: &[TreeNode], num_features: usize) -> Result<(), String> {
    if tree.is_empty() {
        return Err("tree has no nodes".to_string());
    }
    for (i, node) in tree.iter().enumerate() {
        match node {
            TreeNode::Split {
                split_feature,
                split_condition,
                left,
                right,
                ..
            } => {
                if *split_feature >= num_features {
                    return Err(format!(
                        "node {} splits on feature {} but the model has {} features",
                        i, split_feature, num_features
                    ));
                }
                if split_condition.is_nan() {
                    return Err(format!("node {} has a NaN split condition", i));
                }
                for child in [*left, *right] {
                    if child <= i || child >= tree.len() {
                        return Err(format!("node {} has invalid child index {}", i, child));
                    }
                }
            }
            TreeNode::Leaf { leaf } => {
                if !leaf.is_finite() {
                    return Err(format!("node {} has a non-finite leaf value", i));
                }
            }
        }
    }
    Ok(())
}

fn leaf_value(tree: &[TreeNode], feature: &impl Fn(usize) -> f64) -> f64 {
    let mut idx = 0;
    loop {
        match &tree[idx] {
            TreeNode::Leaf { leaf } => return *leaf,
            TreeNode::Split {
                split_feature,
                split_condition,
                left,
                right,
                default_left,
            } => {
                let x = feature(*split_feature);
                let go_left = if x.is_nan() {
                    *default_left
                } else {
                    x < *split_condition
                };
                idx = if go_left { *left } else { *right };
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for TreeEnsembleClassifier {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError> {
        if features.ncols() != self.num_features {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.num_features,
                actual: features.ncols(),
            });
        }
        let values = features.values();
        Ok((0..features.nrows())
            .map(|r| {
                let p = sigmoid(self.margin(|c| values[(r, c)]));
                [1.0 - p, p]
            })
            .collect())
    }
}
