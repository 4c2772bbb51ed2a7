use super::aggregate::CompoundSummary;
use super::encoder::StrainPanel;
use super::error::EngineError;
use crate::core::models::compound::Compound;
use crate::core::models::ids::{CompoundId, PairKey};
use crate::core::models::prediction::{AggregateScores, InhibitionCounts};
use crate::core::models::strain::feature_name;
use crate::core::models::table::{ResultRow, ResultTable};
use std::collections::{BTreeMap, HashMap};

/// Result-table column of every strain, sorted by normalized name.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    /// `(column name, panel position)` pairs in output order.
    columns: Vec<(String, usize)>,
}

impl FeatureColumns {
    pub fn for_panel(panel: &StrainPanel) -> Result<Self, EngineError> {
        let mut columns: Vec<(String, usize)> = panel
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| (feature_name(name), i))
            .collect();
        columns.sort();
        if let Some(pair) = columns.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(EngineError::Internal(format!(
                "strains '{}' and '{}' share the feature column '{}'",
                panel.name(pair[0].1),
                panel.name(pair[1].1),
                pair[0].0
            )));
        }
        Ok(Self { columns })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builds the wide result table, one row per input compound in input order.
///
/// `ids` maps compound indices (as used in `summaries`) to compound ids. Inputs that
/// repeat an id each get their own row.
pub fn shape(
    compounds: &[Compound],
    ids: &[CompoundId],
    summaries: &BTreeMap<usize, CompoundSummary>,
    features: &FeatureColumns,
    include_inhibition: bool,
) -> Result<ResultTable, EngineError> {
    let mut header: Vec<String> = AggregateScores::COLUMNS.iter().map(|c| c.to_string()).collect();
    if include_inhibition {
        header.extend(InhibitionCounts::COLUMNS.iter().map(|c| c.to_string()));
    }
    header.extend(features.names().map(str::to_string));

    let index: HashMap<&CompoundId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
    let mut table = ResultTable::new(header);

    for compound in compounds {
        let summary = index
            .get(&compound.id)
            .and_then(|i| summaries.get(i))
            .ok_or_else(|| EngineError::MissingCompound {
                id: compound.id.clone(),
            })?;

        let mut values = summary.scores.to_array().to_vec();
        if include_inhibition {
            values.extend(summary.inhibition.to_array());
        }
        for (name, strain) in &features.columns {
            let p = summary.probabilities.get(*strain).copied().ok_or_else(|| {
                EngineError::Internal(format!(
                    "no probability for pair '{}'",
                    PairKey::legacy_label(&compound.id, name)
                ))
            })?;
            values.push(p);
        }

        table
            .push(ResultRow {
                compound: compound.id.clone(),
                values,
            })
            .map_err(|row| {
                EngineError::Internal(format!(
                    "row for '{}' has {} values but the table has {} columns",
                    row.compound,
                    row.values.len(),
                    table.columns().len()
                ))
            })?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> StrainPanel {
        StrainPanel::fit(vec![
            "Veillonella parvula (NT5017)".to_string(),
            "Bacteroides fragilis (NT5033)".to_string(),
        ])
        .unwrap()
    }

    fn summary(total: f64, probabilities: Vec<f64>) -> CompoundSummary {
        CompoundSummary {
            scores: AggregateScores {
                total,
                gram_positive: f64::NAN,
                gram_negative: total,
            },
            inhibition: InhibitionCounts {
                total: 2,
                gram_positive: 0,
                gram_negative: 2,
                broad_spectrum: false,
            },
            probabilities,
        }
    }

    fn summaries() -> BTreeMap<usize, CompoundSummary> {
        BTreeMap::from([(0, summary(-1.0, vec![0.5, 0.5])), (1, summary(-2.0, vec![0.1, 0.4]))])
    }

    fn ids() -> Vec<CompoundId> {
        vec![CompoundId::new("a"), CompoundId::new("b")]
    }

    #[test]
    fn feature_columns_are_sorted_normalized_names() {
        let features = FeatureColumns::for_panel(&panel()).unwrap();
        let names: Vec<&str> = features.names().collect();
        assert_eq!(
            names,
            vec!["bacteroides_fragilis_nt5033", "veillonella_parvula_nt5017"]
        );
    }

    #[test]
    fn colliding_feature_names_are_rejected() {
        let panel = StrainPanel::fit(vec!["A b (NT1)".to_string(), "a_b NT1".to_string()]).unwrap();
        let result = FeatureColumns::for_panel(&panel);
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }

    #[test]
    fn rows_follow_input_order_with_sorted_probabilities() {
        let compounds = vec![Compound::embedded("b"), Compound::embedded("a")];
        let features = FeatureColumns::for_panel(&panel()).unwrap();
        let table = shape(&compounds, &ids(), &summaries(), &features, false).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 5);
        assert_eq!(table.rows()[0].compound, CompoundId::new("b"));
        assert_eq!(table.value(0, "apscore_total"), Some(-2.0));
        assert_eq!(table.value(0, "bacteroides_fragilis_nt5033"), Some(0.4));
        assert_eq!(table.value(0, "veillonella_parvula_nt5017"), Some(0.1));
        assert_eq!(table.value(1, "apscore_total"), Some(-1.0));
    }

    #[test]
    fn duplicate_inputs_each_get_a_row() {
        let compounds = vec![
            Compound::embedded("a"),
            Compound::embedded("a"),
            Compound::embedded("b"),
        ];
        let features = FeatureColumns::for_panel(&panel()).unwrap();
        let table = shape(&compounds, &ids(), &summaries(), &features, false).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0].compound, table.rows()[1].compound);
        assert_eq!(table.value(0, "apscore_total"), table.value(1, "apscore_total"));
        assert_eq!(table.rows()[2].compound, CompoundId::new("b"));
    }

    #[test]
    fn inhibition_columns_sit_between_scores_and_strains() {
        let compounds = vec![Compound::embedded("a")];
        let features = FeatureColumns::for_panel(&panel()).unwrap();
        let table = shape(&compounds, &ids(), &summaries(), &features, true).unwrap();
        let columns = table.columns();
        assert_eq!(columns.len(), 9);
        assert_eq!(columns[3], "ginhib_total");
        assert_eq!(columns[6], "broad_spectrum");
        assert_eq!(columns[7], "bacteroides_fragilis_nt5033");
        assert_eq!(table.value(0, "ginhib_gnegative"), Some(2.0));
        assert_eq!(table.value(0, "broad_spectrum"), Some(0.0));
    }

    #[test]
    fn compound_without_predictions_is_reported() {
        let compounds = vec![Compound::embedded("a"), Compound::embedded("zzz")];
        let features = FeatureColumns::for_panel(&panel()).unwrap();
        let result = shape(&compounds, &ids(), &summaries(), &features, false);
        assert!(matches!(
            result,
            Err(EngineError::MissingCompound { id }) if id == CompoundId::new("zzz")
        ));
    }
}
