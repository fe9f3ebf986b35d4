// ==========================================
// Asset Import Engine - Import Orchestrator
// ==========================================
// Flow: locate header → map columns → normalize + synthesize rows
//       → preview (stop) | execute (persist row by row)
// Rule: rows are persisted sequentially in sheet order; a failing
//       row is recorded and the next one is still attempted
// ==========================================

use crate::config::field_catalog::FieldCatalog;
use crate::config::import_config::ImportConfig;
use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::asset::{CandidateRecord, ColumnMapping, ImportMode, ImportReport, ImportStage};
use crate::domain::types::{AssetKind, CellValue, RawSheet};
use crate::importer::asset_importer_trait::{
    AssetImporter, ColumnMapper, FileParser, HeaderLocator, RecordSynthesizer, SynthesisContext,
    ValueNormalizer,
};
use crate::importer::column_mapper::ColumnMapper as ColumnMapperImpl;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_locator::HeaderLocator as HeaderLocatorImpl;
use crate::importer::record_synthesizer::RecordSynthesizer as RecordSynthesizerImpl;
use crate::importer::value_normalizer::ValueNormalizer as ValueNormalizerImpl;
use crate::repository::RecordStore;
use chrono::{Local, NaiveDate};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// StageTracker - state machine bookkeeping for one run
// ==========================================
struct StageTracker<'a> {
    batch_id: &'a str,
    stage: ImportStage,
}

impl<'a> StageTracker<'a> {
    fn new(batch_id: &'a str) -> Self {
        Self {
            batch_id,
            stage: ImportStage::Idle,
        }
    }

    fn advance(&mut self, next: ImportStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal stage transition {} → {}",
            self.stage,
            next
        );
        debug!(batch_id = %self.batch_id, from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }
}

/// Output of the analysis stages shared by preview and execute.
struct SheetAnalysis {
    header_row_index: usize,
    total_rows: usize,
    column_mappings: Vec<ColumnMapping>,
    /// (1-based data row number, synthesized record)
    records: Vec<(usize, CandidateRecord)>,
}

// ==========================================
// AssetImporterImpl
// ==========================================
pub struct AssetImporterImpl<S>
where
    S: RecordStore,
{
    // persistence collaborator
    store: S,

    config: Arc<ImportConfig>,
    catalog: Arc<FieldCatalog>,

    // pipeline stages
    file_parser: Box<dyn FileParser>,
    header_locator: Box<dyn HeaderLocator>,
    column_mapper: Box<dyn ColumnMapper>,
    value_normalizer: Box<dyn ValueNormalizer>,
    record_synthesizer: Box<dyn RecordSynthesizer>,

    // fixed run date; None → local today
    today: Option<NaiveDate>,
}

impl<S> AssetImporterImpl<S>
where
    S: RecordStore,
{
    /// Importer with the stock pipeline stages.
    pub fn new(store: S, config: ImportConfig, catalog: FieldCatalog) -> Self {
        let config = Arc::new(config);
        let catalog = Arc::new(catalog);
        Self {
            store,
            file_parser: Box::new(UniversalFileParser),
            header_locator: Box::new(HeaderLocatorImpl::new(&config.header_keywords)),
            column_mapper: Box::new(ColumnMapperImpl::new(
                Arc::clone(&catalog),
                config.acceptance_threshold,
            )),
            value_normalizer: Box::new(ValueNormalizerImpl),
            record_synthesizer: Box::new(RecordSynthesizerImpl::new(Arc::clone(&config))),
            config,
            catalog,
            today: None,
        }
    }

    /// Stock stages, configuration resolved through a reader (e.g. `ConfigManager`).
    pub async fn from_config_reader<C>(
        store: S,
        reader: &C,
        catalog: FieldCatalog,
    ) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        let config = reader.load_import_config().await?;
        Ok(Self::new(store, config, catalog))
    }

    /// Importer with caller-supplied stages.
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        store: S,
        config: Arc<ImportConfig>,
        catalog: Arc<FieldCatalog>,
        file_parser: Box<dyn FileParser>,
        header_locator: Box<dyn HeaderLocator>,
        column_mapper: Box<dyn ColumnMapper>,
        value_normalizer: Box<dyn ValueNormalizer>,
        record_synthesizer: Box<dyn RecordSynthesizer>,
    ) -> Self {
        Self {
            store,
            config,
            catalog,
            file_parser,
            header_locator,
            column_mapper,
            value_normalizer,
            record_synthesizer,
            today: None,
        }
    }

    /// Pin the run date used by date placeholders.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn run_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Locate, map, then normalize + synthesize at most `row_limit` data rows.
    fn analyze(
        &self,
        sheet: &RawSheet,
        kind: AssetKind,
        row_limit: Option<usize>,
        tracker: &mut StageTracker<'_>,
        ctx: &mut SynthesisContext,
    ) -> ImportResult<SheetAnalysis> {
        let located = self.header_locator.locate(sheet)?;
        tracker.advance(ImportStage::LocatedHeader);
        debug!(
            header_row_index = located.header_row_index,
            data_rows = located.data_rows.len(),
            "header located"
        );

        let column_mappings = self.column_mapper.map_columns(kind, located.headers);
        tracker.advance(ImportStage::MappedColumns);
        info!(
            mapped = column_mappings.len(),
            headers = located.headers.len(),
            "columns mapped"
        );

        let take = row_limit.unwrap_or(usize::MAX);
        let mut records = Vec::with_capacity(located.data_rows.len().min(take));
        for (idx, (_, row)) in located.data_rows.iter().take(take).enumerate() {
            let record = self.build_record(&column_mappings, row);
            records.push((idx + 1, self.record_synthesizer.synthesize(kind, record, ctx)));
        }
        tracker.advance(ImportStage::NormalizedRows);

        Ok(SheetAnalysis {
            header_row_index: located.header_row_index,
            total_rows: located.data_rows.len(),
            column_mappings,
            records,
        })
    }

    fn build_record(&self, mappings: &[ColumnMapping], row: &[CellValue]) -> CandidateRecord {
        let mut record = CandidateRecord::new();
        for mapping in mappings {
            let cell = row.get(mapping.column_index).unwrap_or(&CellValue::Empty);
            let value = match self.catalog.get(&mapping.mapped_field) {
                Some(field) => self.value_normalizer.normalize_for_field(cell, field),
                None => self.value_normalizer.normalize(cell, mapping.value_type),
            };
            record.insert(mapping.mapped_field.clone(), value);
        }
        record
    }

    fn sample(&self, records: &[(usize, CandidateRecord)]) -> Vec<CandidateRecord> {
        records
            .iter()
            .take(self.config.sample_row_limit)
            .map(|(_, record)| record.clone())
            .collect()
    }

    async fn import_file(
        &self,
        file_path: &Path,
        kind: AssetKind,
        mode: ImportMode,
    ) -> ImportReport {
        let start = Instant::now();
        match self.file_parser.parse_to_raw_sheet(file_path) {
            Ok(sheet) => match mode {
                ImportMode::Preview => self.preview(&sheet, kind).await,
                ImportMode::Execute => self.execute(&sheet, kind).await,
            },
            Err(e) => {
                error!(file = %file_path.display(), error = %e, "file decoding failed");
                ImportReport::structural_failure(
                    Uuid::new_v4().to_string(),
                    mode,
                    format!("Failed to read {}: {}", file_path.display(), e),
                    start.elapsed().as_millis() as u64,
                )
            }
        }
    }
}

#[async_trait::async_trait]
impl<S> AssetImporter for AssetImporterImpl<S>
where
    S: RecordStore,
{
    #[instrument(skip(self, sheet), fields(rows = sheet.len()))]
    async fn preview(&self, sheet: &RawSheet, kind: AssetKind) -> ImportReport {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let mut tracker = StageTracker::new(&batch_id);
        let mut ctx = SynthesisContext::new(self.run_date(), &batch_id);

        let analysis = match self.analyze(
            sheet,
            kind,
            Some(self.config.preview_row_limit),
            &mut tracker,
            &mut ctx,
        ) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(batch_id = %batch_id, error = %e, "preview aborted");
                return ImportReport::structural_failure(
                    batch_id.clone(),
                    ImportMode::Preview,
                    e.to_string(),
                    start.elapsed().as_millis() as u64,
                );
            }
        };

        tracker.advance(ImportStage::PreviewReady);
        let sample_rows = self.sample(&analysis.records);
        tracker.advance(ImportStage::Done);

        let message = format!(
            "Preview ready: {} of {} rows analyzed, {} columns mapped",
            analysis.records.len(),
            analysis.total_rows,
            analysis.column_mappings.len()
        );
        info!(batch_id = %batch_id, total = analysis.total_rows, "{}", message);

        ImportReport {
            success: true,
            message,
            batch_id: batch_id.clone(),
            mode: ImportMode::Preview,
            header_row_index: Some(analysis.header_row_index),
            total_rows: analysis.total_rows,
            created_count: 0,
            errors: Vec::new(),
            column_mappings: analysis.column_mappings,
            sample_rows,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    #[instrument(skip(self, sheet), fields(rows = sheet.len()))]
    async fn execute(&self, sheet: &RawSheet, kind: AssetKind) -> ImportReport {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, kind = %kind, "import started");
        let mut tracker = StageTracker::new(&batch_id);
        let mut ctx = SynthesisContext::new(self.run_date(), &batch_id);

        let analysis = match self.analyze(sheet, kind, None, &mut tracker, &mut ctx) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(batch_id = %batch_id, error = %e, "import aborted");
                return ImportReport::structural_failure(
                    batch_id.clone(),
                    ImportMode::Execute,
                    e.to_string(),
                    start.elapsed().as_millis() as u64,
                );
            }
        };

        tracker.advance(ImportStage::Persisting);
        let mut created_count = 0;
        let mut errors = Vec::new();
        for (row_number, record) in &analysis.records {
            match self.store.create_record(kind, record).await {
                Ok(record_id) => {
                    created_count += 1;
                    debug!(row = row_number, record_id = %record_id, "row persisted");
                }
                Err(e) => {
                    warn!(row = row_number, error = %e, "row rejected by record store");
                    errors.push(format!("Row {}: {}", row_number, e));
                }
            }
        }
        tracker.advance(ImportStage::Done);

        let message = format!(
            "Imported {} of {} rows ({} failed)",
            created_count,
            analysis.total_rows,
            errors.len()
        );
        info!(
            batch_id = %batch_id,
            total = analysis.total_rows,
            created = created_count,
            failed = errors.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "import finished"
        );

        ImportReport {
            success: true,
            message,
            batch_id: batch_id.clone(),
            mode: ImportMode::Execute,
            header_row_index: Some(analysis.header_row_index),
            total_rows: analysis.total_rows,
            created_count,
            errors,
            sample_rows: self.sample(&analysis.records),
            column_mappings: analysis.column_mappings,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn preview_file(&self, file_path: &Path, kind: AssetKind) -> ImportReport {
        self.import_file(file_path, kind, ImportMode::Preview).await
    }

    async fn execute_file(&self, file_path: &Path, kind: AssetKind) -> ImportReport {
        self.import_file(file_path, kind, ImportMode::Execute).await
    }

    async fn batch_execute(&self, file_paths: &[&Path], kind: AssetKind) -> Vec<ImportReport> {
        info!(count = file_paths.len(), "batch import started");

        let tasks = file_paths.iter().map(|path| self.execute_file(path, kind));
        let reports = join_all(tasks).await;

        info!(
            total = reports.len(),
            succeeded = reports.iter().filter(|r| r.success).count(),
            created = reports.iter().map(|r| r.created_count).sum::<usize>(),
            "batch import finished"
        );
        reports
    }
}
