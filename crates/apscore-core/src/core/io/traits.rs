use super::error::TableLoadError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Defines the interface for reading one kind of delimited table.
///
/// Implementors carry their own layout options (column names, rows to skip) and only
/// parse already-opened streams; the provided methods handle files on disk.
pub trait TableFile {
    /// The parsed representation of the table.
    type Output;

    /// Parses a table from an uncompressed stream.
    ///
    /// # Arguments
    ///
    /// * `reader` - The stream to read from.
    /// * `delimiter` - The field delimiter byte.
    /// * `origin` - A human-readable name for the stream, used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is malformed or does not have the expected layout.
    fn read_from<R: Read>(
        &self,
        reader: R,
        delimiter: u8,
        origin: &str,
    ) -> Result<Self::Output, TableLoadError>;

    /// Chooses the delimiter for a file on disk. Defaults to the file extension.
    fn delimiter_for(&self, path: &Path) -> u8 {
        delimiter_from_extension(path)
    }

    /// Reads a table from a file path, transparently decompressing gzip input.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Self::Output, TableLoadError> {
        let path = path.as_ref();
        let reader = open_maybe_gzip(path)?;
        self.read_from(reader, self.delimiter_for(path), &path.to_string_lossy())
    }
}

/// Opens a file, wrapping it in a gzip decoder when it starts with the gzip magic bytes.
pub fn open_maybe_gzip(path: &Path) -> Result<Box<dyn Read>, TableLoadError> {
    let io_err = |source| TableLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let mut buffered = BufReader::new(file);
    let is_gzip = buffered.fill_buf().map_err(io_err)?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        Ok(Box::new(GzDecoder::new(buffered)))
    } else {
        Ok(Box::new(buffered))
    }
}

/// Tab for `.tsv`/`.tab`/`.txt` files (ignoring a trailing `.gz`), comma otherwise.
pub fn delimiter_from_extension(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match extension {
        "tsv" | "tab" | "txt" => b'\t',
        _ => b',',
    }
}

pub(crate) fn csv_error(origin: &str, source: csv::Error) -> TableLoadError {
    TableLoadError::Csv {
        path: origin.to_string(),
        source,
    }
}
