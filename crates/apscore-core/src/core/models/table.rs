use super::ids::CompoundId;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub compound: CompoundId,
    pub values: Vec<f64>,
}

/// The wide output table: one row per input compound, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Returns the row back when its width does not match the header.
    pub fn push(&mut self, row: ResultRow) -> Result<(), ResultRow> {
        if row.values.len() != self.columns.len() {
            return Err(row);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r.values[col])
    }
}
