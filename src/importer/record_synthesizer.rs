// ==========================================
// Asset Import Engine - Record Synthesizer
// ==========================================
// Order: kind defaults → device type → required placeholders.
// Never fails; the record leaving here can always be persisted.
// ==========================================

use crate::config::import_config::{DeviceTypeRules, ImportConfig, PlaceholderRule};
use crate::domain::asset::CandidateRecord;
use crate::domain::types::{AssetKind, FieldValue};
use crate::importer::asset_importer_trait::{
    RecordSynthesizer as RecordSynthesizerTrait, SynthesisContext,
};
use crate::importer::header_normalizer::normalize_header;
use std::sync::Arc;

pub struct RecordSynthesizer {
    config: Arc<ImportConfig>,
}

impl RecordSynthesizer {
    pub fn new(config: Arc<ImportConfig>) -> Self {
        Self { config }
    }

    fn apply_defaults(&self, kind: AssetKind, record: &mut CandidateRecord) {
        for (field, value) in &self.config.profile(kind).defaults {
            if record.is_absent(field) {
                record.insert(field.clone(), FieldValue::text(value.clone()));
            }
        }
    }

    fn apply_device_type(rules: &DeviceTypeRules, record: &mut CandidateRecord) {
        let inferred = match record.get(&rules.field) {
            Some(value) if !value.is_blank() => Some(classify_device(rules, &value.to_string())),
            _ if rules.computer_hint_fields.iter().any(|f| record.contains(f)) => {
                Some(rules.fallback.clone())
            }
            _ => None,
        };
        if let Some(code) = inferred {
            record.insert(rules.field.clone(), FieldValue::Text(code));
        }
    }

    fn apply_placeholders(
        &self,
        kind: AssetKind,
        record: &mut CandidateRecord,
        ctx: &mut SynthesisContext,
    ) {
        for required in &self.config.profile(kind).required {
            if !record.is_absent(&required.field) {
                continue;
            }
            let value = match &required.rule {
                PlaceholderRule::Identifier { prefix } => {
                    FieldValue::Text(ctx.next_identifier(prefix))
                }
                PlaceholderRule::Text { value } => FieldValue::text(value.clone()),
                PlaceholderRule::Today => FieldValue::Date(ctx.today),
            };
            record.insert(required.field.clone(), value);
        }
    }
}

/// Category whose code equals the value, else the one with the longest
/// keyword contained in the value (earlier category on a tie); fallback otherwise.
pub fn classify_device(rules: &DeviceTypeRules, raw: &str) -> String {
    let value = normalize_header(raw);
    if let Some(category) = rules.categories.iter().find(|c| c.code == value) {
        return category.code.clone();
    }

    let mut best: Option<(&str, usize)> = None;
    for category in &rules.categories {
        let longest = category
            .keywords
            .iter()
            .map(|keyword| normalize_header(keyword))
            .filter(|keyword| !keyword.is_empty() && value.contains(keyword.as_str()))
            .map(|keyword| keyword.len())
            .max();
        if let Some(len) = longest {
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((category.code.as_str(), len));
            }
        }
    }

    best.map(|(code, _)| code.to_string())
        .unwrap_or_else(|| rules.fallback.clone())
}

impl RecordSynthesizerTrait for RecordSynthesizer {
    fn synthesize(
        &self,
        kind: AssetKind,
        mut record: CandidateRecord,
        ctx: &mut SynthesisContext,
    ) -> CandidateRecord {
        self.apply_defaults(kind, &mut record);
        if let Some(rules) = &self.config.profile(kind).device_type {
            Self::apply_device_type(rules, &mut record);
        }
        self.apply_placeholders(kind, &mut record, ctx);
        record
    }
}
