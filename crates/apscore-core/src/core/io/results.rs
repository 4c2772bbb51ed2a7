use crate::core::models::table::ResultTable;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultWriteError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the result table as comma-separated text with a single header row.
///
/// Values use the shortest representation that round-trips; undefined scores are
/// written as `NaN`.
pub fn write_to<W: Write>(table: &ResultTable, writer: W) -> Result<(), ResultWriteError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.values.iter().map(|v| v.to_string()))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the table next to `path` under a temporary name and renames it into place, so
/// that `path` either holds a complete table or is left untouched.
pub fn write_to_path<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<(), ResultWriteError> {
    let path = path.as_ref();
    let partial = partial_path(path);
    let file = File::create(&partial).map_err(|e| io_error(&partial, e))?;
    if let Err(e) = write_to(table, BufWriter::new(file)) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    fs::rename(&partial, path).map_err(|e| {
        let _ = fs::remove_file(&partial);
        io_error(path, e)
    })
}

fn io_error(path: &Path, source: io::Error) -> ResultWriteError {
    ResultWriteError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("results"));
    name.push(".partial");
    path.with_file_name(name)
}
