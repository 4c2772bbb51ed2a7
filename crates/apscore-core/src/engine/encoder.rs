use super::error::EngineError;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// The fixed, ordered panel of strains every compound is scored against, together with
/// its one-hot encoding.
///
/// Panel order is the column order of the screening table and decides the order of the
/// cross join. The one-hot vocabulary is the sorted set of strain names, so strain `s`
/// is encoded with a single 1 at the position of `s` in lexicographic order, independent
/// of where it appears in the screening table. This matches the layout the pretrained
/// classifier was fit on.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainPanel {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl StrainPanel {
    /// Fits the encoding on the panel's strain names. The panel is closed afterwards.
    pub fn fit(names: Vec<String>) -> Result<Self, EngineError> {
        if names.is_empty() {
            return Err(EngineError::model_load(
                "strain panel",
                "the screening table lists no strains",
            ));
        }
        let mut vocabulary: Vec<&String> = names.iter().collect();
        vocabulary.sort();
        if let Some(pair) = vocabulary.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::model_load(
                "strain panel",
                format!("strain '{}' appears more than once", pair[0]),
            ));
        }
        let positions = vocabulary
            .iter()
            .enumerate()
            .map(|(i, name)| ((*name).clone(), i))
            .collect();
        Ok(Self { names, positions })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of the 1 in the one-hot vector of `name`.
    pub fn position(&self, name: &str) -> Result<usize, EngineError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownStrain(name.to_string()))
    }

    pub fn encode(&self, name: &str) -> Result<DVector<f64>, EngineError> {
        let mut vector = DVector::zeros(self.len());
        vector[self.position(name)?] = 1.0;
        Ok(vector)
    }

    /// One-hot rows for the whole panel, in panel order.
    pub fn one_hot(&self) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(self.len(), self.len());
        for (row, name) in self.names.iter().enumerate() {
            matrix[(row, self.positions[name])] = 1.0;
        }
        matrix
    }
}
