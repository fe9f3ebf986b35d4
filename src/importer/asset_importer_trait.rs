// ==========================================
// Asset Import Engine - Importer Traits
// ==========================================
// One trait per pipeline stage; implementations live next door.
// decoded rows → HeaderLocator → ColumnMapper → ValueNormalizer
//              → RecordSynthesizer → AssetImporter (preview | execute)
// ==========================================

use crate::config::field_catalog::CanonicalField;
use crate::domain::asset::{CandidateRecord, ColumnMapping, ImportReport};
use crate::domain::types::{AssetKind, CellValue, FieldValue, RawRow, RawSheet, ValueType};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

// ==========================================
// AssetImporter Trait
// ==========================================
// Implementer: AssetImporterImpl
#[async_trait]
pub trait AssetImporter: Send + Sync {
    /// Analyze a decoded sheet without persisting anything.
    ///
    /// # Flow
    /// 1. locate the header row
    /// 2. map headers to canonical fields
    /// 3. normalize + synthesize the first `preview_row_limit` data rows
    ///
    /// # Returns
    /// - ImportReport with `created_count = 0`
    async fn preview(&self, sheet: &RawSheet, kind: AssetKind) -> ImportReport;

    /// Run the full pipeline and persist every data row, one at a time,
    /// in sheet order. A failing row is recorded in `errors` and the
    /// remaining rows are still attempted.
    async fn execute(&self, sheet: &RawSheet, kind: AssetKind) -> ImportReport;

    /// Decode a file, then `preview`. Decoding failure → `success: false`.
    async fn preview_file(&self, file_path: &Path, kind: AssetKind) -> ImportReport;

    /// Decode a file, then `execute`. Decoding failure → `success: false`.
    async fn execute_file(&self, file_path: &Path, kind: AssetKind) -> ImportReport;

    /// Execute several files concurrently.
    ///
    /// # Notes
    /// - files are independent; each still persists its rows sequentially
    /// - one file failing does not affect the others
    async fn batch_execute(&self, file_paths: &[&Path], kind: AssetKind) -> Vec<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// Implementers: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// Decode the first sheet of a file into raw rows.
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// HeaderLocator Trait
// ==========================================
/// Header row plus the non-empty data rows below it, borrowed from the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedSheet<'a> {
    pub header_row_index: usize,
    pub headers: &'a [CellValue],
    /// (0-based sheet row index, row)
    pub data_rows: Vec<(usize, &'a RawRow)>,
}

pub trait HeaderLocator: Send + Sync {
    /// Find the header row.
    ///
    /// # Returns
    /// - Err(InsufficientRows): fewer than 2 rows
    /// - Ok(LocatedSheet): keyword-matched row, or the first row as fallback
    fn locate<'a>(&self, sheet: &'a RawSheet) -> ImportResult<LocatedSheet<'a>>;
}

// ==========================================
// ColumnMapper Trait
// ==========================================
pub trait ColumnMapper: Send + Sync {
    /// Match headers (left to right) to canonical fields of `kind`.
    ///
    /// # Guarantees
    /// - each canonical field appears at most once
    /// - unmatched headers are omitted, never an error
    fn map_columns(&self, kind: AssetKind, headers: &[CellValue]) -> Vec<ColumnMapping>;
}

// ==========================================
// ValueNormalizer Trait
// ==========================================
pub trait ValueNormalizer: Send + Sync {
    /// Coerce one raw cell to `value_type`; `FieldValue::Null` when it cannot be.
    ///
    /// # Notes
    /// - boolean is closed-world: anything outside the truthy set is `false`
    fn normalize(&self, raw: &CellValue, value_type: ValueType) -> FieldValue;

    /// `normalize`, then map onto the field's accepted codes when it has an enum rule.
    fn normalize_for_field(&self, raw: &CellValue, field: &CanonicalField) -> FieldValue {
        let value = self.normalize(raw, field.value_type);
        match (&field.enum_rule, &value) {
            (Some(rule), FieldValue::Text(text)) if !text.trim().is_empty() => {
                FieldValue::Text(rule.canonicalize(text))
            }
            _ => value,
        }
    }
}

// ==========================================
// RecordSynthesizer Trait
// ==========================================
/// Per-run state for placeholder generation.
#[derive(Debug, Clone)]
pub struct SynthesisContext {
    pub today: NaiveDate,
    /// Short token shared by all placeholders of one run.
    pub batch_token: String,
    sequence: u32,
}

impl SynthesisContext {
    pub fn new(today: NaiveDate, batch_id: &str) -> Self {
        let batch_token: String = batch_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect::<String>()
            .to_uppercase();
        Self {
            today,
            batch_token,
            sequence: 0,
        }
    }

    /// `{prefix}-{YYYYMMDD}-{seq:04}-{batch}`; seq is monotonic within a run.
    pub fn next_identifier(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!(
            "{}-{}-{:04}-{}",
            prefix,
            self.today.format("%Y%m%d"),
            self.sequence,
            self.batch_token
        )
    }
}

pub trait RecordSynthesizer: Send + Sync {
    /// Fill defaults, infer the device type and synthesize required fields.
    /// Never fails; the returned record has every required field set.
    fn synthesize(
        &self,
        kind: AssetKind,
        record: CandidateRecord,
        ctx: &mut SynthesisContext,
    ) -> CandidateRecord;
}
