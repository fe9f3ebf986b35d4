// ==========================================
// Asset Import Engine - Importer Layer
// ==========================================
// Scope: decoded sheet → column mappings + candidate records
//        → record store (execute) or report only (preview)
// Inputs: CSV, Excel, OpenDocument, or rows already in memory
// ==========================================

pub mod asset_importer_impl;
pub mod asset_importer_trait;
pub mod column_mapper;
pub mod error;
pub mod file_parser;
pub mod header_locator;
pub mod header_normalizer;
pub mod record_synthesizer;
pub mod similarity;
pub mod value_normalizer;

// Core types
pub use asset_importer_impl::AssetImporterImpl;
pub use column_mapper::ColumnMapper as ColumnMapperImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use header_locator::HeaderLocator as HeaderLocatorImpl;
pub use header_normalizer::{normalize_header, normalize_header_cell};
pub use record_synthesizer::RecordSynthesizer as RecordSynthesizerImpl;
pub use similarity::similarity;
pub use value_normalizer::ValueNormalizer as ValueNormalizerImpl;

// Trait interfaces
pub use asset_importer_trait::{
    AssetImporter, ColumnMapper, FileParser, HeaderLocator, LocatedSheet, RecordSynthesizer,
    SynthesisContext, ValueNormalizer,
};
