// ==========================================
// Asset Import Engine - Repository Layer
// ==========================================
// Rule: persistence only, no import logic
// Constraint: every query is parameterized
// ==========================================

pub mod error;
pub mod record_store;
pub mod record_store_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::RecordStore;
pub use record_store_impl::{SqliteRecordStore, StoredRecord};
