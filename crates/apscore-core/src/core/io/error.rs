use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to read workbook '{path}': {message}")]
    Workbook { path: String, message: String },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: String },
    #[error("Invalid value in '{path}' at record {record}: {message}")]
    InvalidValue {
        path: String,
        /// One-based data record after the header; 0 is the header itself.
        record: usize,
        message: String,
    },
    #[error("Table '{path}' is empty: {message}")]
    Empty { path: String, message: String },
    #[error("Duplicate entry '{entry}' in '{path}'")]
    Duplicate { path: String, entry: String },
    #[error("Entry '{entry}' in '{path}' is given as both '{first}' and '{second}'")]
    ConflictingEntry {
        path: String,
        entry: String,
        first: String,
        second: String,
    },
}
