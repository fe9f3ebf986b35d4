// ==========================================
// Asset Import Engine - Domain Layer
// ==========================================
// Scope: value types and import data model
// Rule: no I/O, no matching logic
// ==========================================

pub mod asset;
pub mod types;

pub use asset::{CandidateRecord, ColumnMapping, ImportMode, ImportReport, ImportStage};
pub use types::{AssetKind, CellValue, FieldValue, RawRow, RawSheet, ValueType};
