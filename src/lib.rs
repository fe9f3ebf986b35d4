// ==========================================
// Asset Import Engine - Core Library
// ==========================================
// Turns human-authored spreadsheets (French/English, stray title rows,
// inconsistent headers) into asset records.
// Stack: Rust + SQLite
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - types and import model
pub mod domain;

// Repository layer - record persistence
pub mod repository;

// Importer layer - header inference, mapping, normalization
pub mod importer;

// Config layer - synonym catalog and import settings
pub mod config;

// Database infrastructure (connection setup / schema)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    AssetKind, CandidateRecord, CellValue, ColumnMapping, FieldValue, ImportMode, ImportReport,
    ImportStage, RawRow, RawSheet, ValueType,
};

pub use config::{ConfigManager, FieldCatalog, ImportConfig, ImportConfigReader};

pub use importer::{AssetImporter, AssetImporterImpl, ImportError, ImportResult};

pub use repository::{RecordStore, RepositoryError, SqliteRecordStore};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "asset-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
