use super::config::ScoringConfig;
use super::error::EngineError;
use crate::core::models::prediction::{AggregateScores, AnnotatedPrediction, InhibitionCounts};
use crate::core::models::strain::GramStain;
use std::collections::BTreeMap;

/// Everything the result table needs to know about one compound.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSummary {
    pub scores: AggregateScores,
    pub inhibition: InhibitionCounts,
    /// Probability per strain, in panel order.
    pub probabilities: Vec<f64>,
}

/// Geometric mean computed as `exp(mean(ln p))`.
///
/// Empty input gives NaN. Identical values are returned unchanged, so a constant
/// sample keeps its exact value.
pub fn geometric_mean(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return f64::NAN;
    };
    if values.iter().all(|&v| v == first) {
        return first;
    }
    let mean_ln = values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64;
    mean_ln.exp()
}

/// `log2` of the geometric mean. A zero or undefined mean scores NaN, never `-inf`.
pub fn apscore(values: &[f64]) -> f64 {
    let gmean = geometric_mean(values);
    if gmean.is_nan() || gmean <= 0.0 {
        return f64::NAN;
    }
    gmean.log2()
}

/// Counts the strains a compound inhibits. Gram-unknown strains only count toward the total.
pub fn inhibition_counts(
    probabilities: &[(f64, Option<GramStain>)],
    app_threshold: f64,
    min_nkill: usize,
) -> InhibitionCounts {
    let mut counts = InhibitionCounts::default();
    for &(p, stain) in probabilities {
        if p < app_threshold {
            continue;
        }
        counts.total += 1;
        match stain {
            Some(GramStain::Positive) => counts.gram_positive += 1,
            Some(GramStain::Negative) => counts.gram_negative += 1,
            None => {}
        }
    }
    counts.broad_spectrum = counts.total >= min_nkill;
    counts
}

/// Groups annotated predictions by compound and computes its scores.
///
/// Every compound present in `predictions` must carry exactly one prediction per
/// strain of an `n_strains` panel. The map is keyed by compound index.
pub fn summarize(
    predictions: &[AnnotatedPrediction],
    n_strains: usize,
    scoring: &ScoringConfig,
) -> Result<BTreeMap<usize, CompoundSummary>, EngineError> {
    let mut grouped: BTreeMap<usize, Vec<Option<(f64, Option<GramStain>)>>> = BTreeMap::new();
    for p in predictions {
        let slots = grouped
            .entry(p.key.compound)
            .or_insert_with(|| vec![None; n_strains]);
        let slot = slots.get_mut(p.key.strain).ok_or_else(|| {
            EngineError::Internal(format!(
                "prediction refers to strain {} but the panel has {}",
                p.key.strain, n_strains
            ))
        })?;
        if slot.replace((p.probability, p.gram_stain)).is_some() {
            return Err(EngineError::Internal(format!(
                "duplicate prediction for compound {} and strain {}",
                p.key.compound, p.key.strain
            )));
        }
    }

    grouped
        .into_iter()
        .map(|(compound, slots)| {
            let rows = slots
                .into_iter()
                .enumerate()
                .map(|(strain, slot)| {
                    slot.ok_or_else(|| {
                        EngineError::Internal(format!(
                            "compound {} has no prediction for strain {}",
                            compound, strain
                        ))
                    })
                })
                .collect::<Result<Vec<_>, EngineError>>()?;
            Ok((compound, summarize_compound(&rows, scoring)))
        })
        .collect()
}

fn summarize_compound(rows: &[(f64, Option<GramStain>)], scoring: &ScoringConfig) -> CompoundSummary {
    let probabilities: Vec<f64> = rows.iter().map(|(p, _)| *p).collect();
    let of_stain = |stain: GramStain| -> Vec<f64> {
        rows.iter()
            .filter(|(_, s)| *s == Some(stain))
            .map(|(p, _)| *p)
            .collect()
    };

    let scores = AggregateScores {
        total: apscore(&probabilities),
        gram_positive: apscore(&of_stain(GramStain::Positive)),
        gram_negative: apscore(&of_stain(GramStain::Negative)),
    };
    let inhibition = if scoring.aggregate_scores {
        inhibition_counts(rows, scoring.app_threshold, scoring.min_nkill)
    } else {
        InhibitionCounts::default()
    };

    CompoundSummary {
        scores,
        inhibition,
        probabilities,
    }
}
