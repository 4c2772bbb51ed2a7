use super::error::TableLoadError;
use super::traits::{TableFile, csv_error, open_maybe_gzip};
use crate::core::models::strain::{GramStain, NtToken};
use calamine::{Data, Reader, open_workbook_auto};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Physical rows of the strain information sheet that are not part of the table:
/// two title rows above the header and the footnotes below the last strain.
pub const DEFAULT_SKIP_ROWS: [usize; 14] = [0, 1, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54];
pub const DEFAULT_INDEX_COLUMN: &str = "NT data base";
pub const DEFAULT_GRAM_COLUMN: &str = "Gram stain";

/// Gram stain per strain token, as published in the strain information table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GramTable {
    labels: HashMap<NtToken, GramStain>,
}

impl GramTable {
    pub fn new(labels: HashMap<NtToken, GramStain>) -> Self {
        Self { labels }
    }

    pub fn get(&self, token: &NtToken) -> Option<GramStain> {
        self.labels.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(NtToken, GramStain)> for GramTable {
    fn from_iter<T: IntoIterator<Item = (NtToken, GramStain)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Layout of the strain information sheet.
///
/// The sheet is read from a spreadsheet workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`) or
/// from a delimited export of it.
#[derive(Debug, Clone)]
pub struct StrainInfoTable {
    /// Zero-based physical row indices to drop before the header is located. In a
    /// workbook, empty rows count; in a delimited export only non-blank lines do.
    pub skip_rows: Vec<usize>,
    pub index_column: String,
    pub gram_column: String,
}

impl Default for StrainInfoTable {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS.to_vec(),
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            gram_column: DEFAULT_GRAM_COLUMN.to_string(),
        }
    }
}

impl StrainInfoTable {
    /// Reads the first sheet of a workbook.
    pub fn read_workbook(&self, path: &Path) -> Result<GramTable, TableLoadError> {
        let origin = path.to_string_lossy().to_string();
        let workbook_error = |message: String| TableLoadError::Workbook {
            path: origin.clone(),
            message,
        };
        let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?
            .map_err(|e| workbook_error(e.to_string()))?;

        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, cells)| -> Result<(usize, Vec<String>), TableLoadError> {
                Ok((first_row + i, cells.iter().map(cell_text).collect()))
            });
        self.collect_labels(rows, &origin)
    }

    /// Rows with a blank index or a blank Gram label are ignored, as are index values
    /// that are not strain tokens. A label that is present but unrecognized is an error.
    fn collect_labels<I>(&self, rows: I, origin: &str) -> Result<GramTable, TableLoadError>
    where
        I: Iterator<Item = Result<(usize, Vec<String>), TableLoadError>>,
    {
        let skip: HashSet<usize> = self.skip_rows.iter().copied().collect();
        let mut rows = rows.filter(|row| match row {
            Ok((index, _)) => !skip.contains(index),
            Err(_) => true,
        });

        let header = match rows.next() {
            Some(row) => row?.1,
            None => {
                return Err(TableLoadError::Empty {
                    path: origin.to_string(),
                    message: "no header row after skipping rows".to_string(),
                });
            }
        };
        let column = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TableLoadError::MissingColumn {
                    path: origin.to_string(),
                    column: name.to_string(),
                })
        };
        let index_idx = column(self.index_column.as_str())?;
        let gram_idx = column(self.gram_column.as_str())?;

        let mut labels = HashMap::new();
        for (i, row) in rows.enumerate() {
            let (_, fields) = row?;
            let field = |idx: usize| fields.get(idx).map_or("", |f| f.trim());
            let Some(token) = NtToken::from_key(field(index_idx)) else {
                continue;
            };
            let label = field(gram_idx);
            if label.is_empty() {
                continue;
            }
            let stain = label
                .parse::<GramStain>()
                .map_err(|e| TableLoadError::InvalidValue {
                    path: origin.to_string(),
                    record: i + 1,
                    message: e.to_string(),
                })?;
            if labels.insert(token.clone(), stain).is_some() {
                return Err(TableLoadError::Duplicate {
                    path: origin.to_string(),
                    entry: token.to_string(),
                });
            }
        }
        Ok(GramTable::new(labels))
    }
}

impl TableFile for StrainInfoTable {
    type Output = GramTable;

    fn read_from<R: Read>(
        &self,
        reader: R,
        delimiter: u8,
        origin: &str,
    ) -> Result<Self::Output, TableLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let rows = reader.records().enumerate().map(
            |(index, record)| -> Result<(usize, Vec<String>), TableLoadError> {
                let record = record.map_err(|e| csv_error(origin, e))?;
                Ok((index, record.iter().map(str::to_string).collect()))
            },
        );
        self.collect_labels(rows, origin)
    }

    /// Dispatches on the extension: workbooks go through [`Self::read_workbook`],
    /// anything else is read as a (possibly gzipped) delimited export.
    fn read_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Self::Output, TableLoadError> {
        let path = path.as_ref();
        if is_workbook(path) {
            return self.read_workbook(path);
        }
        let reader = open_maybe_gzip(path)?;
        self.read_from(reader, self.delimiter_for(path), &path.to_string_lossy())
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.contains(&e.as_str()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;
    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="SF2" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    /// Writes a one-sheet workbook. `rows` holds one-based sheet row numbers and their
    /// cells from column A onwards; rows not listed stay empty.
    fn write_workbook(path: &Path, rows: &[(u32, Vec<&str>)]) {
        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (row, cells) in rows {
            sheet.push_str(&format!(r#"<row r="{}">"#, row));
            for (col, text) in cells.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                let column = (b'A' + col as u8) as char;
                sheet.push_str(&format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    column, row, text
                ));
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn token(key: &str) -> NtToken {
        NtToken::from_key(key).unwrap()
    }

    fn layout(skip_rows: Vec<usize>) -> StrainInfoTable {
        StrainInfoTable {
            skip_rows,
            ..StrainInfoTable::default()
        }
    }

    #[test]
    fn skips_title_rows_and_reads_gram_labels() {
        let data = "\
Supplementary table,,\n\
Strain panel,,\n\
Species,NT data base,Gram stain\n\
Bacteroides fragilis,NT5033,negative\n\
Clostridium perfringens,NT5032,positive\n\
Footnote,,\n";
        let table = layout(vec![0, 1, 5])
            .read_from(data.as_bytes(), b',', "mem")
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&token("NT5033")), Some(GramStain::Negative));
        assert_eq!(table.get(&token("NT5032")), Some(GramStain::Positive));
    }

    #[test]
    fn blank_labels_and_non_token_keys_are_ignored() {
        let data = "NT data base\tGram stain\nNT1\t\nref\tpositive\nNT2\tNegative\n";
        let table = layout(vec![])
            .read_from(data.as_bytes(), b'\t', "mem")
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&token("NT1")), None);
        assert_eq!(table.get(&token("NT2")), Some(GramStain::Negative));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let data = "NT data base,Gram stain\nNT1,variable\n";
        let result = layout(vec![]).read_from(data.as_bytes(), b',', "mem");
        assert!(matches!(result, Err(TableLoadError::InvalidValue { record: 1, .. })));
    }

    #[test]
    fn missing_gram_column_is_reported() {
        let data = "NT data base,Stain\nNT1,positive\n";
        let result = layout(vec![]).read_from(data.as_bytes(), b',', "mem");
        assert!(matches!(
            result,
            Err(TableLoadError::MissingColumn { column, .. }) if column == "Gram stain"
        ));
    }

    #[test]
    fn duplicate_tokens_are_rejected() {
        let data = "NT data base,Gram stain\nNT1,positive\nNT1,negative\n";
        let result = layout(vec![]).read_from(data.as_bytes(), b',', "mem");
        assert!(matches!(result, Err(TableLoadError::Duplicate { .. })));
    }

    #[test]
    fn everything_skipped_is_empty() {
        let data = "a\nb\n";
        let result = layout(vec![0, 1]).read_from(data.as_bytes(), b',', "mem");
        assert!(matches!(result, Err(TableLoadError::Empty { .. })));
    }

    #[test]
    fn reads_tsv_export_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strain_info.tsv");
        fs::write(&path, "x\nNT data base\tGram stain\nNT7\tpositive\n").unwrap();
        let table = layout(vec![0]).read_from_path(&path).unwrap();
        assert_eq!(table.get(&token("NT7")), Some(GramStain::Positive));
    }

    #[test]
    fn invalid_label_reports_data_record_after_skipped_rows() {
        let data = "title\nNT data base,Gram stain\nNT1,positive\nNT2,variable\n";
        let result = layout(vec![0]).read_from(data.as_bytes(), b',', "mem");
        assert!(matches!(result, Err(TableLoadError::InvalidValue { record: 2, .. })));
    }

    #[test]
    fn reads_first_sheet_of_workbook_skipping_physical_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strain_info_SF2.xlsx");
        write_workbook(
            &path,
            &[
                (2, vec!["Supplementary Figure 2"]),
                (4, vec!["Species", "NT data base", "Gram stain"]),
                (5, vec!["Bacteroides fragilis", "NT5033", "negative"]),
                (6, vec!["Clostridium perfringens", "NT5032", "positive"]),
                (7, vec!["", "NT5099", "see methods"]),
            ],
        );

        let table = layout(vec![0, 1, 2, 6]).read_from_path(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&token("NT5033")), Some(GramStain::Negative));
        assert_eq!(table.get(&token("NT5032")), Some(GramStain::Positive));
    }

    #[test]
    fn unreadable_workbook_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, "not a workbook").unwrap();
        let result = StrainInfoTable::default().read_from_path(&path);
        assert!(matches!(result, Err(TableLoadError::Workbook { .. })));
    }

    #[test]
    fn workbook_extensions_are_recognized() {
        assert!(is_workbook(Path::new("strain_info_SF2.xlsx")));
        assert!(is_workbook(Path::new("STRAINS.XLS")));
        assert!(!is_workbook(Path::new("strain_info.csv")));
        assert!(!is_workbook(Path::new("strain_info.tsv.gz")));
    }

    #[test]
    fn table_collects_from_pairs() {
        let table: GramTable = [(token("NT1"), GramStain::Positive)].into_iter().collect();
        assert_eq!(table.get(&token("NT1")), Some(GramStain::Positive));
    }
}
