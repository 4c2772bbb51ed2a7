use super::error::EngineError;
use crate::core::classifier::{Classifier, ClassifierError};
use crate::core::models::matrix::FeatureMatrix;
use crate::core::models::prediction::{PROBABILITY_COLUMN, PairPrediction};
use tracing::debug;

/// Runs the classifier over the feature matrix and keeps the positive-class probability
/// of every row.
pub fn score(classifier: &dyn Classifier, features: &FeatureMatrix) -> Result<Vec<PairPrediction>, EngineError> {
    let expected = classifier.num_features();
    if expected != features.ncols() {
        return Err(EngineError::DimensionMismatch {
            expected,
            actual: features.ncols(),
        });
    }
    if features.has_missing_values() {
        debug!("Feature matrix contains missing values; the classifier decides how to route them.");
    }

    let distributions = classifier.predict_proba(features).map_err(|e| match e {
        ClassifierError::DimensionMismatch { expected, actual } => {
            EngineError::DimensionMismatch { expected, actual }
        }
        ClassifierError::Failed(reason) => EngineError::Inference(reason),
    })?;

    if distributions.len() != features.nrows() {
        return Err(EngineError::Inference(format!(
            "classifier returned {} rows for {} inputs",
            distributions.len(),
            features.nrows()
        )));
    }

    features
        .keys()
        .iter()
        .zip(distributions)
        .map(|(&key, [_, positive])| {
            if !(0.0..=1.0).contains(&positive) {
                return Err(EngineError::Inference(format!(
                    "{} {} for pair {:?} is not a probability",
                    PROBABILITY_COLUMN, positive, key
                )));
            }
            Ok(PairPrediction {
                key,
                probability: positive,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::PairKey;
    use nalgebra::DMatrix;

    /// Returns the first feature of every row as the positive-class probability.
    struct FirstFeature {
        num_features: usize,
    }

    impl Classifier for FirstFeature {
        fn num_features(&self) -> usize {
            self.num_features
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError> {
            Ok((0..features.nrows())
                .map(|r| {
                    let p = features.values()[(r, 0)];
                    [1.0 - p, p]
                })
                .collect())
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn num_features(&self) -> usize {
            2
        }

        fn predict_proba(&self, _: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError> {
            Err(ClassifierError::Failed("model exploded".to_string()))
        }
    }

    fn features(first: &[f64]) -> FeatureMatrix {
        let keys = (0..first.len()).map(|i| PairKey::new(0, i)).collect();
        let values = DMatrix::from_fn(first.len(), 2, |r, c| if c == 0 { first[r] } else { 0.0 });
        FeatureMatrix::new(keys, values, 1).unwrap()
    }

    #[test]
    fn keeps_positive_class_probability_per_pair() {
        let preds = score(&FirstFeature { num_features: 2 }, &features(&[0.8, 0.2])).unwrap();
        assert_eq!(
            preds,
            vec![
                PairPrediction {
                    key: PairKey::new(0, 0),
                    probability: 0.8
                },
                PairPrediction {
                    key: PairKey::new(0, 1),
                    probability: 0.2
                },
            ]
        );
    }

    #[test]
    fn dimension_mismatch_is_surfaced() {
        let result = score(&FirstFeature { num_features: 5 }, &features(&[0.5]));
        assert!(matches!(
            result,
            Err(EngineError::DimensionMismatch {
                expected: 5,
                actual: 2
            })
        ));
    }

    #[test]
    fn classifier_failure_becomes_inference_error() {
        let result = score(&Broken, &features(&[0.5]));
        assert!(matches!(result, Err(EngineError::Inference(msg)) if msg == "model exploded"));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let result = score(&FirstFeature { num_features: 2 }, &features(&[1.5]));
        assert!(matches!(result, Err(EngineError::Inference(_))));
    }
}
