// ==========================================
// Asset Import Engine - Import Config Reader Trait
// ==========================================
// Read-only view of the settings the importer needs.
// Implementers: ImportConfig (static), ConfigManager (config_kv table)
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::domain::types::AssetKind;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Similarity a field must exceed to become a candidate.
    ///
    /// # Default
    /// - 0.6
    async fn get_acceptance_threshold(&self) -> ImportResult<f64>;

    /// Data rows processed in preview mode.
    ///
    /// # Default
    /// - 5
    async fn get_preview_row_limit(&self) -> ImportResult<usize>;

    /// Candidate records echoed back in the report.
    ///
    /// # Default
    /// - 5
    async fn get_sample_row_limit(&self) -> ImportResult<usize>;

    /// Default value of `field` for `kind` (None = no default).
    async fn get_kind_default(&self, kind: AssetKind, field: &str)
        -> ImportResult<Option<String>>;

    /// Fully resolved configuration snapshot for one import run.
    async fn load_import_config(&self) -> ImportResult<ImportConfig>;
}

#[async_trait]
impl ImportConfigReader for ImportConfig {
    async fn get_acceptance_threshold(&self) -> ImportResult<f64> {
        Ok(self.acceptance_threshold)
    }

    async fn get_preview_row_limit(&self) -> ImportResult<usize> {
        Ok(self.preview_row_limit)
    }

    async fn get_sample_row_limit(&self) -> ImportResult<usize> {
        Ok(self.sample_row_limit)
    }

    async fn get_kind_default(
        &self,
        kind: AssetKind,
        field: &str,
    ) -> ImportResult<Option<String>> {
        Ok(self.profile(kind).defaults.get(field).cloned())
    }

    async fn load_import_config(&self) -> ImportResult<ImportConfig> {
        self.validate()?;
        Ok(self.clone())
    }
}
