use super::error::TableLoadError;
use super::traits::{TableFile, csv_error};
use crate::core::models::compound::Compound;
use std::io::Read;

/// The input compound table: one row per compound with a SMILES column and an optional
/// chemical id column.
#[derive(Debug, Clone)]
pub struct CompoundTable {
    pub smiles_column: String,
    pub id_column: String,
}

impl CompoundTable {
    pub fn new(smiles_column: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            smiles_column: smiles_column.into(),
            id_column: id_column.into(),
        }
    }
}

impl TableFile for CompoundTable {
    type Output = Vec<Compound>;

    /// Rows keep their file order. When the id column is absent the SMILES string doubles
    /// as the compound id.
    fn read_from<R: Read>(
        &self,
        reader: R,
        delimiter: u8,
        origin: &str,
    ) -> Result<Self::Output, TableLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(reader);
        let headers = reader.headers().map_err(|e| csv_error(origin, e))?.clone();

        let smiles_idx = headers
            .iter()
            .position(|h| h.trim() == self.smiles_column)
            .ok_or_else(|| TableLoadError::MissingColumn {
                path: origin.to_string(),
                column: self.smiles_column.clone(),
            })?;
        let id_idx = headers.iter().position(|h| h.trim() == self.id_column);

        let mut compounds = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_error(origin, e))?;
            let smiles = record.get(smiles_idx).unwrap_or("").trim();
            if smiles.is_empty() {
                return Err(TableLoadError::InvalidValue {
                    path: origin.to_string(),
                    record: i + 1,
                    message: format!("empty value in column '{}'", self.smiles_column),
                });
            }
            let compound = match id_idx.and_then(|idx| record.get(idx)).map(str::trim) {
                Some(id) if !id.is_empty() => Compound::with_id(id, smiles),
                _ => Compound::from_smiles(smiles),
            };
            compounds.push(compound);
        }

        if compounds.is_empty() {
            return Err(TableLoadError::Empty {
                path: origin.to_string(),
                message: "no compounds found".to_string(),
            });
        }
        Ok(compounds)
    }
}
