// ==========================================
// Asset Import Engine - Import Domain Model
// ==========================================
// Scope: column mappings, candidate records, the import report
// Lifetime: everything here lives inside one import invocation
// ==========================================

use crate::domain::types::{FieldValue, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// ColumnMapping - one source header matched to one canonical field
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub column_index: usize,      // position of the source column in the header row
    pub original_header: String,  // header text as it appears in the sheet
    pub mapped_field: String,     // canonical field name
    pub confidence: f64,          // [0, 1]; 1.0 on exact synonym match
    pub value_type: ValueType,    // semantic type from the catalog entry
}

// ==========================================
// CandidateRecord - one prospective row before persistence
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl CandidateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_text)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    /// Missing, null and blank-text fields are all absent.
    pub fn is_absent(&self, field: &str) -> bool {
        self.fields.get(field).map_or(true, FieldValue::is_blank)
    }

    pub fn contains(&self, field: &str) -> bool {
        !self.is_absent(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

impl From<BTreeMap<String, FieldValue>> for CandidateRecord {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

// ==========================================
// ImportMode
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Preview, // first N rows, no persistence
    Execute, // all rows, persisted one at a time
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Preview => write!(f, "preview"),
            ImportMode::Execute => write!(f, "execute"),
        }
    }
}

// ==========================================
// ImportStage - orchestrator state machine
// ==========================================
// Idle → LocatedHeader → MappedColumns → NormalizedRows
//      → (PreviewReady | Persisting) → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    Idle,
    LocatedHeader,
    MappedColumns,
    NormalizedRows,
    PreviewReady,
    Persisting,
    Done,
}

impl ImportStage {
    /// Legal forward transitions of the import state machine.
    pub fn can_advance_to(self, next: ImportStage) -> bool {
        use ImportStage::*;
        matches!(
            (self, next),
            (Idle, LocatedHeader)
                | (LocatedHeader, MappedColumns)
                | (MappedColumns, NormalizedRows)
                | (NormalizedRows, PreviewReady)
                | (NormalizedRows, Persisting)
                | (PreviewReady, Done)
                | (Persisting, Done)
        )
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Idle => "IDLE",
            ImportStage::LocatedHeader => "LOCATED_HEADER",
            ImportStage::MappedColumns => "MAPPED_COLUMNS",
            ImportStage::NormalizedRows => "NORMALIZED_ROWS",
            ImportStage::PreviewReady => "PREVIEW_READY",
            ImportStage::Persisting => "PERSISTING",
            ImportStage::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}

// ==========================================
// ImportReport - the caller-facing result of one run
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub batch_id: String,                     // UUID of this run
    pub mode: ImportMode,
    pub header_row_index: Option<usize>,      // 0-based row index inside the sheet
    pub total_rows: usize,                    // non-empty data rows below the header
    pub created_count: usize,                 // rows accepted by the record store
    pub errors: Vec<String>,                  // row-scoped messages, in row order
    pub column_mappings: Vec<ColumnMapping>,
    pub sample_rows: Vec<CandidateRecord>,    // bounded
    pub elapsed_ms: u64,
}

impl ImportReport {
    /// Report for a run that could not start (undecodable file, too few rows).
    pub fn structural_failure(
        batch_id: String,
        mode: ImportMode,
        message: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            batch_id,
            mode,
            header_row_index: None,
            total_rows: 0,
            created_count: 0,
            errors: Vec::new(),
            column_mappings: Vec::new(),
            sample_rows: Vec::new(),
            elapsed_ms,
        }
    }

    pub fn mapped_fields(&self) -> Vec<&str> {
        self.column_mappings
            .iter()
            .map(|m| m.mapped_field.as_str())
            .collect()
    }
}
