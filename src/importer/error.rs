// ==========================================
// Asset Import Engine - Importer Errors
// ==========================================
// Tooling: thiserror derive
// ==========================================

use thiserror::Error;

/// Importer error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .csv/.xlsx/.xls/.xlsm/.ods)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("spreadsheet decoding failed: {0}")]
    ExcelParseError(String),

    #[error("CSV decoding failed: {0}")]
    CsvParseError(String),

    // ===== Structural errors =====
    #[error("sheet must contain at least 2 rows (found {found})")]
    InsufficientRows { found: usize },

    // ===== Catalog errors =====
    #[error("field catalog invalid: {0}")]
    CatalogError(String),

    // ===== Configuration errors =====
    #[error("config read failed (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("config value invalid (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias
pub type ImportResult<T> = Result<T, ImportError>;
