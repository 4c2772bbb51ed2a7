use super::error::TableLoadError;
use super::traits::{TableFile, csv_error};
use crate::core::models::ids::CompoundId;
use crate::core::models::matrix::{EmbeddingTable, MatrixError};
use nalgebra::DMatrix;
use std::io::Read;
use std::path::Path;

/// A tab-separated embedding table: the first column holds the row key (a compound id or
/// a SMILES string), every further column one embedding dimension.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingFile;

impl TableFile for EmbeddingFile {
    type Output = EmbeddingTable;

    fn delimiter_for(&self, _path: &Path) -> u8 {
        b'\t'
    }

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
        if headers.len() < 2 {
            return Err(TableLoadError::Empty {
                path: origin.to_string(),
                message: "expected an index column and at least one embedding column"
                    .to_string(),
            });
        }
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let dims = columns.len();

        let mut ids = Vec::new();
        let mut values = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_error(origin, e))?;
            let id = record.get(0).unwrap_or("").trim();
            if id.is_empty() {
                return Err(TableLoadError::InvalidValue {
                    path: origin.to_string(),
                    record: i + 1,
                    message: "empty row index".to_string(),
                });
            }
            for (field, column) in record.iter().skip(1).zip(&columns) {
                let value = field.trim().parse::<f64>().map_err(|_| {
                    TableLoadError::InvalidValue {
                        path: origin.to_string(),
                        record: i + 1,
                        message: format!("non-numeric value '{}' in column '{}'", field, column),
                    }
                })?;
                values.push(value);
            }
            ids.push(CompoundId::new(id));
        }

        if ids.is_empty() {
            return Err(TableLoadError::Empty {
                path: origin.to_string(),
                message: "no embedding rows found".to_string(),
            });
        }

        let matrix = DMatrix::from_row_slice(ids.len(), dims, &values);
        EmbeddingTable::new(ids, columns, matrix).map_err(|e| match e {
            MatrixError::DuplicateId(id) => TableLoadError::Duplicate {
                path: origin.to_string(),
                entry: id.to_string(),
            },
            other => TableLoadError::InvalidValue {
                path: origin.to_string(),
                record: 0,
                message: other.to_string(),
            },
        })
    }
}
