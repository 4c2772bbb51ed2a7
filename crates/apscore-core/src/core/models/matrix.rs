use super::ids::{CompoundId, PairKey};
use nalgebra::{DMatrix, RowDVector};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Row count mismatch: {ids} ids for {rows} rows")]
    RowCount { ids: usize, rows: usize },
    #[error("Column count mismatch: {names} column names for {cols} columns")]
    ColumnCount { names: usize, cols: usize },
    #[error("Duplicate compound id: '{0}'")]
    DuplicateId(CompoundId),
}

/// One embedding vector per compound, stored row-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    ids: Vec<CompoundId>,
    columns: Vec<String>,
    values: DMatrix<f64>,
}

impl EmbeddingTable {
    pub fn new(
        ids: Vec<CompoundId>,
        columns: Vec<String>,
        values: DMatrix<f64>,
    ) -> Result<Self, MatrixError> {
        if ids.len() != values.nrows() {
            return Err(MatrixError::RowCount {
                ids: ids.len(),
                rows: values.nrows(),
            });
        }
        if columns.len() != values.ncols() {
            return Err(MatrixError::ColumnCount {
                names: columns.len(),
                cols: values.ncols(),
            });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(MatrixError::DuplicateId(dup.clone()));
        }
        Ok(Self {
            ids,
            columns,
            values,
        })
    }

    /// Builds a table from row vectors, naming the columns `0..dims`.
    pub fn from_rows(rows: Vec<(CompoundId, Vec<f64>)>) -> Result<Self, MatrixError> {
        let dims = rows.first().map_or(0, |(_, v)| v.len());
        if let Some((_, bad)) = rows.iter().find(|(_, v)| v.len() != dims) {
            return Err(MatrixError::ColumnCount {
                names: dims,
                cols: bad.len(),
            });
        }
        let values = DMatrix::from_fn(rows.len(), dims, |r, c| rows[r].1[c]);
        let ids = rows.into_iter().map(|(id, _)| id).collect();
        let columns = (0..dims).map(|i| i.to_string()).collect();
        Self::new(ids, columns, values)
    }

    pub fn ids(&self) -> &[CompoundId] {
        &self.ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.values.ncols()
    }

    pub fn row(&self, index: usize) -> RowDVector<f64> {
        self.values.row(index).into_owned()
    }

    /// Replaces the row ids, keeping values and column names.
    pub fn relabel(self, ids: Vec<CompoundId>) -> Result<Self, MatrixError> {
        Self::new(ids, self.columns, self.values)
    }

    /// Copies the given rows, in the given order, into a new table.
    pub fn select(&self, rows: &[usize]) -> Result<Self, MatrixError> {
        let values = DMatrix::from_fn(rows.len(), self.dims(), |r, c| self.values[(rows[r], c)]);
        let ids = rows.iter().map(|&r| self.ids[r].clone()).collect();
        Self::new(ids, self.columns.clone(), values)
    }
}

/// The classifier input: one row per (compound, strain) pair.
///
/// Columns hold the compound embedding followed by the strain one-hot block.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    keys: Vec<PairKey>,
    values: DMatrix<f64>,
    embedding_dims: usize,
}

impl FeatureMatrix {
    pub fn new(
        keys: Vec<PairKey>,
        values: DMatrix<f64>,
        embedding_dims: usize,
    ) -> Result<Self, MatrixError> {
        if keys.len() != values.nrows() {
            return Err(MatrixError::RowCount {
                ids: keys.len(),
                rows: values.nrows(),
            });
        }
        if embedding_dims > values.ncols() {
            return Err(MatrixError::ColumnCount {
                names: embedding_dims,
                cols: values.ncols(),
            });
        }
        Ok(Self {
            keys,
            values,
            embedding_dims,
        })
    }

    pub fn keys(&self) -> &[PairKey] {
        &self.keys
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn embedding_dims(&self) -> usize {
        self.embedding_dims
    }

    pub fn strain_dims(&self) -> usize {
        self.values.ncols() - self.embedding_dims
    }

    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EmbeddingTable {
        EmbeddingTable::from_rows(vec![
            (CompoundId::new("a"), vec![1.0, 2.0]),
            (CompoundId::new("b"), vec![3.0, 4.0]),
            (CompoundId::new("c"), vec![5.0, 6.0]),
        ])
        .unwrap()
    }

    #[test]
    fn from_rows_builds_row_major_table() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert_eq!(t.dims(), 2);
        assert_eq!(t.columns(), &["0".to_string(), "1".to_string()]);
        assert_eq!(t.values()[(1, 0)], 3.0);
        assert_eq!(t.row(2).iter().copied().collect::<Vec<_>>(), vec![5.0, 6.0]);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let result = EmbeddingTable::from_rows(vec![
            (CompoundId::new("a"), vec![1.0, 2.0]),
            (CompoundId::new("b"), vec![3.0]),
        ]);
        assert!(matches!(result, Err(MatrixError::ColumnCount { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = EmbeddingTable::from_rows(vec![
            (CompoundId::new("a"), vec![1.0]),
            (CompoundId::new("a"), vec![2.0]),
        ]);
        assert_eq!(result, Err(MatrixError::DuplicateId(CompoundId::new("a"))));
    }

    #[test]
    fn select_reorders_rows() {
        let picked = table().select(&[2, 0]).unwrap();
        assert_eq!(picked.ids(), &[CompoundId::new("c"), CompoundId::new("a")]);
        assert_eq!(picked.values()[(0, 1)], 6.0);
        assert_eq!(picked.values()[(1, 0)], 1.0);
    }

    #[test]
    fn relabel_keeps_values() {
        let t = table()
            .relabel(vec![CompoundId::new("x"), CompoundId::new("y"), CompoundId::new("z")])
            .unwrap();
        assert_eq!(t.ids()[2].as_str(), "z");
        assert_eq!(t.values()[(2, 1)], 6.0);
    }

    #[test]
    fn feature_matrix_reports_block_widths() {
        let keys = vec![PairKey::new(0, 0), PairKey::new(0, 1)];
        let values = DMatrix::from_row_slice(2, 4, &[0.5, 0.1, 1.0, 0.0, 0.5, 0.1, 0.0, 1.0]);
        let m = FeatureMatrix::new(keys, values, 2).unwrap();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.embedding_dims(), 2);
        assert_eq!(m.strain_dims(), 2);
        assert!(!m.has_missing_values());
    }

    #[test]
    fn feature_matrix_rejects_key_count_mismatch() {
        let result = FeatureMatrix::new(vec![PairKey::new(0, 0)], DMatrix::zeros(2, 3), 1);
        assert!(matches!(result, Err(MatrixError::RowCount { .. })));
    }
}
