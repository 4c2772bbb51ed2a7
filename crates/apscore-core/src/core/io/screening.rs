use super::error::TableLoadError;
use super::traits::{TableFile, csv_error};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// The reference screening table (compounds × strains, tab-separated, usually gzipped).
///
/// Only its header matters to the pipeline: every column after the index column names one
/// strain of the panel, in panel order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreeningTable;

impl TableFile for ScreeningTable {
    type Output = Vec<String>;

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
        let headers = reader.headers().map_err(|e| csv_error(origin, e))?;

        let strains: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        if strains.is_empty() {
            return Err(TableLoadError::Empty {
                path: origin.to_string(),
                message: "no strain columns in header".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(strains.len());
        for strain in &strains {
            if strain.trim().is_empty() {
                return Err(TableLoadError::InvalidValue {
                    path: origin.to_string(),
                    record: 0,
                    message: "blank strain name in header".to_string(),
                });
            }
            if !seen.insert(strain.as_str()) {
                return Err(TableLoadError::Duplicate {
                    path: origin.to_string(),
                    entry: strain.clone(),
                });
            }
        }
        Ok(strains)
    }
}
