// ==========================================
// Asset Import Engine - File Parser
// ==========================================
// Decodes the first sheet of a file into raw rows. No header handling
// here: the header locator decides which row holds the headers.
// Supported: CSV (.csv) / Excel (.xlsx/.xls/.xlsm) / OpenDocument (.ods)
// ==========================================

use crate::domain::types::{CellValue, RawRow, RawSheet};
use crate::importer::asset_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// ';' when the first line has more semicolons than commas (French Excel exports).
    fn sniff_delimiter(path: &Path) -> ImportResult<u8> {
        let mut first_line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first_line)?;
        let semicolons = first_line.matches(';').count();
        let commas = first_line.matches(',').count();
        Ok(if semicolons > commas { b';' } else { b',' })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;
        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let delimiter = Self::sniff_delimiter(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // rows may differ in length
            .delimiter(delimiter)
            .from_path(file_path)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: RawRow = record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect();
            rows.push(row);
        }

        debug!(path = %file_path.display(), rows = rows.len(), "csv decoded");
        Ok(rows)
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn to_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::text(s.as_str()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) if value.time() == chrono::NaiveTime::MIN => {
                    CellValue::Date(value.date())
                }
                Some(value) => CellValue::DateTime(value),
                None => CellValue::text(cell.to_string()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;
        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheet".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let rows: RawSheet = range
            .rows()
            .map(|row| row.iter().map(Self::to_cell).collect())
            .collect();

        debug!(
            path = %file_path.display(),
            sheet = %sheet_name,
            rows = rows.len(),
            "workbook decoded"
        );
        Ok(rows)
    }
}

// ==========================================
// Universal parser (dispatch on extension)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_sheet(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.parse_to_raw_sheet(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_keeps_every_row() {
        let file = csv_file(&[
            "Inventaire du parc,,",
            ",,",
            "Nom,Tel,Ville",
            "Ali Ben,0612345678,Casablanca",
        ]);
        let sheet = CsvParser.parse_to_raw_sheet(file.path()).unwrap();

        assert_eq!(sheet.len(), 4);
        assert!(sheet[1].iter().all(CellValue::is_blank));
        assert_eq!(sheet[2][0], CellValue::text("Nom"));
        // leading zero survives: CSV cells stay text
        assert_eq!(sheet[3][1], CellValue::text("0612345678"));
    }

    #[test]
    fn test_csv_ragged_rows() {
        let file = csv_file(&["a,b,c", "1", "1,2,3,4"]);
        let sheet = CsvParser.parse_to_raw_sheet(file.path()).unwrap();
        assert_eq!(sheet[1].len(), 1);
        assert_eq!(sheet[2].len(), 4);
    }

    #[test]
    fn test_csv_semicolon_delimiter() {
        let file = csv_file(&["Nom;Prix;Ville", "Ali;1,5;Rabat"]);
        let sheet = CsvParser.parse_to_raw_sheet(file.path()).unwrap();
        assert_eq!(sheet[0].len(), 3);
        assert_eq!(sheet[1][1], CellValue::text("1,5"));
    }

    #[test]
    fn test_file_not_found() {
        let err = CsvParser
            .parse_to_raw_sheet(Path::new("does_not_exist.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = UniversalFileParser.parse_to_raw_sheet(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_corrupt_workbook_is_decoding_error() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"not a zip archive").unwrap();
        let err = UniversalFileParser.parse_to_raw_sheet(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::ExcelParseError(_)));
    }

    #[test]
    fn test_excel_cell_conversion() {
        assert_eq!(ExcelParser::to_cell(&Data::Int(42)), CellValue::Number(42.0));
        assert_eq!(ExcelParser::to_cell(&Data::String("  ".into())), CellValue::Empty);
        assert_eq!(ExcelParser::to_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(ExcelParser::to_cell(&Data::Empty), CellValue::Empty);
    }
}
