// ==========================================
// Asset Import Engine - Record Store Trait
// ==========================================
// The only external collaborator of the import engine.
// Rule: persistence only, no matching or synthesis logic
// ==========================================

use crate::domain::asset::CandidateRecord;
use crate::domain::types::AssetKind;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one candidate record.
    ///
    /// # Returns
    /// - Ok(String): id of the created record
    /// - Err: the row is reported as failed; the batch continues
    async fn create_record(
        &self,
        kind: AssetKind,
        record: &CandidateRecord,
    ) -> RepositoryResult<String>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn create_record(
        &self,
        kind: AssetKind,
        record: &CandidateRecord,
    ) -> RepositoryResult<String> {
        (**self).create_record(kind, record).await
    }
}
