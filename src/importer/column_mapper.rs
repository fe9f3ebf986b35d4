// ==========================================
// Asset Import Engine - Column Mapper
// ==========================================
// Free-text header → canonical field, with a confidence score.
// Headers are processed left to right; a field claimed by an earlier
// header is out of the running for later ones.
// ==========================================

use crate::config::field_catalog::{CanonicalField, FieldCatalog};
use crate::domain::asset::ColumnMapping;
use crate::domain::types::{AssetKind, CellValue};
use crate::importer::asset_importer_trait::ColumnMapper as ColumnMapperTrait;
use crate::importer::header_normalizer::{normalize_header, normalize_header_cell};
use crate::importer::similarity::similarity;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.6;

pub struct ColumnMapper {
    catalog: Arc<FieldCatalog>,
    threshold: f64,
}

/// Best score of one field against one header.
struct FieldScore {
    confidence: f64,
    exact: bool,
}

impl ColumnMapper {
    pub fn new(catalog: Arc<FieldCatalog>, threshold: f64) -> Self {
        Self { catalog, threshold }
    }

    pub fn with_default_threshold(catalog: Arc<FieldCatalog>) -> Self {
        Self::new(catalog, DEFAULT_ACCEPTANCE_THRESHOLD)
    }

    fn score(field: &CanonicalField, header: &str) -> FieldScore {
        let mut best = FieldScore {
            confidence: 0.0,
            exact: false,
        };
        for synonym in &field.synonyms {
            let synonym = normalize_header(synonym);
            if synonym.is_empty() {
                continue;
            }
            if synonym == header {
                return FieldScore {
                    confidence: 1.0,
                    exact: true,
                };
            }
            let s = similarity(header, &synonym);
            if s > best.confidence {
                best.confidence = s;
            }
        }
        best
    }

    /// Winning field for one normalized header, if any.
    fn best_field<'c>(
        &'c self,
        kind: AssetKind,
        header: &str,
        claimed: &HashSet<&str>,
    ) -> Option<(&'c CanonicalField, f64)> {
        let mut winner: Option<(&CanonicalField, f64)> = None;

        for field in self.catalog.eligible(kind) {
            if claimed.contains(field.name.as_str()) {
                continue;
            }
            let score = Self::score(field, header);
            if score.confidence <= self.threshold {
                continue;
            }
            if let Some(guard) = &field.guard {
                if !guard.allows(header, score.confidence, score.exact) {
                    continue;
                }
            }
            // strict: on a tie the earlier catalog field stays
            if winner.map_or(true, |(_, best)| score.confidence > best) {
                winner = Some((field, score.confidence));
            }
        }

        winner
    }
}

impl ColumnMapperTrait for ColumnMapper {
    fn map_columns(&self, kind: AssetKind, headers: &[CellValue]) -> Vec<ColumnMapping> {
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut mappings = Vec::new();

        for (column_index, cell) in headers.iter().enumerate() {
            let header = normalize_header_cell(cell);
            if header.is_empty() {
                continue;
            }

            match self.best_field(kind, &header, &claimed) {
                Some((field, confidence)) => {
                    claimed.insert(field.name.as_str());
                    debug!(
                        column_index,
                        header = %cell,
                        field = %field.name,
                        confidence,
                        "column mapped"
                    );
                    mappings.push(ColumnMapping {
                        column_index,
                        original_header: cell.to_string(),
                        mapped_field: field.name.clone(),
                        confidence,
                        value_type: field.value_type,
                    });
                }
                None => debug!(column_index, header = %cell, "column left unmapped"),
            }
        }

        mappings
    }
}
