use super::encoder::StrainPanel;
use super::error::EngineError;
use crate::core::io::strain_info::GramTable;
use crate::core::models::prediction::{AnnotatedPrediction, PairPrediction};
use crate::core::models::strain::{GramStain, NtToken};
use tracing::{debug, warn};

/// Gram stain of every panel strain, indexed by panel position.
///
/// `None` marks a strain whose token is absent from the strain information table.
#[derive(Debug, Clone, PartialEq)]
pub struct GramLabels {
    stains: Vec<Option<GramStain>>,
}

impl GramLabels {
    pub fn get(&self, strain: usize) -> Option<GramStain> {
        self.stains.get(strain).copied().flatten()
    }

    pub fn as_slice(&self) -> &[Option<GramStain>] {
        &self.stains
    }

    pub fn len(&self) -> usize {
        self.stains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stains.is_empty()
    }

    pub fn count(&self, stain: GramStain) -> usize {
        self.stains.iter().filter(|s| **s == Some(stain)).count()
    }

    pub fn unknown(&self) -> usize {
        self.stains.iter().filter(|s| s.is_none()).count()
    }
}

/// Looks up the Gram stain of every strain in the panel.
///
/// Fails with `StrainParse` on the first strain name without an `(NT<digits>)` token.
/// Tokens missing from `table` resolve to `None` and are warned about once each.
pub fn resolve(panel: &StrainPanel, table: &GramTable) -> Result<GramLabels, EngineError> {
    let stains = panel
        .names()
        .iter()
        .map(|name| {
            let token = NtToken::find_in(name).ok_or_else(|| EngineError::StrainParse {
                strain: name.clone(),
            })?;
            let stain = table.get(&token);
            if stain.is_none() {
                warn!(
                    "Strain '{}' ({}) has no Gram stain entry; it only counts toward apscore_total.",
                    name, token
                );
            }
            Ok(stain)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let labels = GramLabels { stains };
    debug!(
        "Resolved Gram stains: {} positive, {} negative, {} unknown.",
        labels.count(GramStain::Positive),
        labels.count(GramStain::Negative),
        labels.unknown()
    );
    Ok(labels)
}

/// Tags every prediction with the Gram stain of its strain.
pub fn annotate(
    predictions: &[PairPrediction],
    labels: &GramLabels,
) -> Result<Vec<AnnotatedPrediction>, EngineError> {
    predictions
        .iter()
        .map(|p| {
            if p.key.strain >= labels.len() {
                return Err(EngineError::Internal(format!(
                    "prediction refers to strain {} but the panel has {}",
                    p.key.strain,
                    labels.len()
                )));
            }
            Ok(AnnotatedPrediction {
                key: p.key,
                probability: p.probability,
                gram_stain: labels.get(p.key.strain),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::PairKey;

    fn table() -> GramTable {
        [
            (NtToken::from_key("NT001").unwrap(), GramStain::Positive),
            (NtToken::from_key("NT002").unwrap(), GramStain::Negative),
        ]
        .into_iter()
        .collect()
    }

    fn panel(names: &[&str]) -> StrainPanel {
        StrainPanel::fit(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn resolves_stains_in_panel_order() {
        let labels = resolve(&panel(&["S2 (NT002)", "S1 (NT001)"]), &table()).unwrap();
        assert_eq!(
            labels.as_slice(),
            &[Some(GramStain::Negative), Some(GramStain::Positive)]
        );
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let labels = resolve(&panel(&["S1 (NT001)", "S9 (NT999)"]), &table()).unwrap();
        assert_eq!(labels.get(1), None);
        assert_eq!(labels.unknown(), 1);
        assert_eq!(labels.count(GramStain::Positive), 1);
    }

    #[test]
    fn strain_without_token_is_a_parse_error() {
        let result = resolve(&panel(&["S1 (NT001)", "Mystery strain"]), &table());
        assert!(matches!(
            result,
            Err(EngineError::StrainParse { strain }) if strain == "Mystery strain"
        ));
    }

    #[test]
    fn annotate_copies_probability_and_stain() {
        let labels = resolve(&panel(&["S1 (NT001)", "S2 (NT002)"]), &table()).unwrap();
        let predictions = vec![
            PairPrediction {
                key: PairKey::new(0, 0),
                probability: 0.8,
            },
            PairPrediction {
                key: PairKey::new(0, 1),
                probability: 0.2,
            },
        ];
        let annotated = annotate(&predictions, &labels).unwrap();
        assert_eq!(annotated[0].gram_stain, Some(GramStain::Positive));
        assert_eq!(annotated[1].gram_stain, Some(GramStain::Negative));
        assert_eq!(annotated[1].probability, 0.2);
    }

    #[test]
    fn annotate_rejects_strain_outside_panel() {
        let labels = resolve(&panel(&["S1 (NT001)"]), &table()).unwrap();
        let predictions = vec![PairPrediction {
            key: PairKey::new(0, 3),
            probability: 0.5,
        }];
        assert!(matches!(
            annotate(&predictions, &labels),
            Err(EngineError::Internal(_))
        ));
    }
}
