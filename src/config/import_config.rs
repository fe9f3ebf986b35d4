// ==========================================
// Asset Import Engine - Import Configuration
// ==========================================
// Scope: matching threshold, preview/sample bounds, header keywords,
//        per-kind defaults, placeholders and device-type inference
// Sources: built-in defaults, JSON file, config_kv overrides (ConfigManager)
// ==========================================

use crate::domain::types::AssetKind;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// PlaceholderRule - how a required-but-missing field is synthesized
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PlaceholderRule {
    /// `{prefix}-{YYYYMMDD}-{seq:04}-{batch8}`
    Identifier { prefix: String },
    /// Fixed text, e.g. an owner placeholder.
    Text { value: String },
    /// The run date.
    Today,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredField {
    pub field: String,
    #[serde(flatten)]
    pub rule: PlaceholderRule,
}

// ==========================================
// DeviceTypeRules - coarse classification from free text
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCategory {
    pub code: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeRules {
    pub field: String,
    pub categories: Vec<DeviceCategory>,
    pub fallback: String,
    /// Fields whose presence implies the asset is a computer.
    pub computer_hint_fields: Vec<String>,
}

// ==========================================
// KindProfile
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindProfile {
    /// field → default text value, applied when the field is absent
    pub defaults: BTreeMap<String, String>,
    /// fields the record store requires, synthesized when still absent
    pub required: Vec<RequiredField>,
    /// field holding the per-kind unique identifier
    pub identifier_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceTypeRules>,
}

impl KindProfile {
    pub fn it_asset() -> Self {
        Self {
            defaults: defaults(&[
                ("department", "General"),
                ("status", "active"),
                ("location", "Unassigned"),
            ]),
            required: vec![
                identifier("asset_tag", "IT"),
                identifier("serial_number", "SN"),
                identifier("name", "ASSET"),
                text("owner", "Unassigned"),
                today("purchase_date"),
            ],
            identifier_field: "asset_tag".to_string(),
            device_type: Some(DeviceTypeRules::builtin()),
        }
    }

    pub fn telecom_asset() -> Self {
        Self {
            defaults: defaults(&[
                ("department", "General"),
                ("status", "active"),
                ("zone", "Unassigned"),
                ("provider", "other"),
            ]),
            required: vec![
                identifier("sim_number", "SIM"),
                text("sim_owner", "Unassigned"),
                today("activation_date"),
            ],
            identifier_field: "sim_number".to_string(),
            device_type: None,
        }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(|r| r.field.as_str())
    }
}

impl DeviceTypeRules {
    pub fn builtin() -> Self {
        let category = |code: &str, keywords: &[&str]| DeviceCategory {
            code: code.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };

        Self {
            field: "device_type".to_string(),
            categories: vec![
                category("printer", &["printer", "imprimante", "copieur", "photocopieur", "mfp"]),
                category("phone", &["smartphone", "phone", "telephone", "iphone", "mobile"]),
                category("laptop", &["laptop", "notebook", "portable", "ultrabook", "macbook"]),
                category("server", &["server", "serveur", "rack", "nas"]),
                category("desktop", &[
                    "desktop", "pc fixe", "fixe", "tour", "unite centrale", "workstation",
                    "station de travail", "all in one", "imac",
                ]),
                category("monitor", &["monitor", "ecran", "screen", "moniteur", "display"]),
                category("tablet", &["tablet", "tablette", "ipad"]),
                category("network", &[
                    "switch", "router", "routeur", "firewall", "pare feu", "access point",
                    "borne wifi", "point d acces", "modem",
                ]),
                category("scanner", &["scanner", "numeriseur"]),
            ],
            fallback: "computer".to_string(),
            computer_hint_fields: vec![
                "processor".to_string(),
                "ram_gb".to_string(),
                "storage_gb".to_string(),
                "operating_system".to_string(),
            ],
        }
    }
}

fn defaults(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn identifier(field: &str, prefix: &str) -> RequiredField {
    RequiredField {
        field: field.to_string(),
        rule: PlaceholderRule::Identifier {
            prefix: prefix.to_string(),
        },
    }
}

fn text(field: &str, value: &str) -> RequiredField {
    RequiredField {
        field: field.to_string(),
        rule: PlaceholderRule::Text {
            value: value.to_string(),
        },
    }
}

fn today(field: &str) -> RequiredField {
    RequiredField {
        field: field.to_string(),
        rule: PlaceholderRule::Today,
    }
}

// ==========================================
// ImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// A field is a candidate only when its similarity exceeds this value.
    pub acceptance_threshold: f64,
    /// Data rows run through the pipeline in preview mode.
    pub preview_row_limit: usize,
    /// Candidate records echoed back in the report.
    pub sample_row_limit: usize,
    /// Tokens that mark a row as the header row.
    pub header_keywords: Vec<String>,
    pub it_asset: KindProfile,
    pub telecom_asset: KindProfile,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            preview_row_limit: 5,
            sample_row_limit: 5,
            header_keywords: [
                "name", "nom", "serial", "serie", "id", "type", "status", "statut", "owner",
                "proprietaire", "utilisateur", "user", "phone", "tel", "city", "ville",
                "department", "departement", "model", "modele", "brand", "marque", "numero",
                "sim", "imei", "zone",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            it_asset: KindProfile::it_asset(),
            telecom_asset: KindProfile::telecom_asset(),
        }
    }
}

impl ImportConfig {
    pub fn profile(&self, kind: AssetKind) -> &KindProfile {
        match kind {
            AssetKind::ItAsset => &self.it_asset,
            AssetKind::TelecomAsset => &self.telecom_asset,
        }
    }

    pub fn profile_mut(&mut self, kind: AssetKind) -> &mut KindProfile {
        match kind {
            AssetKind::ItAsset => &mut self.it_asset,
            AssetKind::TelecomAsset => &mut self.telecom_asset,
        }
    }

    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        let config: ImportConfig =
            serde_json::from_str(json).map_err(|e| ImportError::ConfigValueError {
                key: "<root>".to_string(),
                value: String::new(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ImportResult<()> {
        if !(0.0..1.0).contains(&self.acceptance_threshold) {
            return Err(ImportError::ConfigValueError {
                key: "acceptance_threshold".to_string(),
                value: self.acceptance_threshold.to_string(),
                message: "must be within [0, 1)".to_string(),
            });
        }
        if self.preview_row_limit == 0 {
            return Err(ImportError::ConfigValueError {
                key: "preview_row_limit".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for kind in AssetKind::ALL {
            let profile = self.profile(kind);
            if !profile.required_fields().any(|f| f == profile.identifier_field) {
                return Err(ImportError::ConfigValueError {
                    key: format!("{}.identifier_field", kind),
                    value: profile.identifier_field.clone(),
                    message: "identifier field must be listed as required".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ImportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.acceptance_threshold, 0.6);
        assert_eq!(config.preview_row_limit, 5);
    }

    #[test]
    fn test_profiles_by_kind() {
        let config = ImportConfig::default();
        let telecom = config.profile(AssetKind::TelecomAsset);
        assert_eq!(telecom.identifier_field, "sim_number");
        assert_eq!(telecom.defaults.get("provider").map(String::as_str), Some("other"));
        assert!(telecom.device_type.is_none());
        assert!(config.profile(AssetKind::ItAsset).device_type.is_some());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = ImportConfig::from_json_str(r#"{ "preview_row_limit": 10 }"#).unwrap();
        assert_eq!(config.preview_row_limit, 10);
        assert_eq!(config.acceptance_threshold, 0.6);
        assert_eq!(config.it_asset, KindProfile::it_asset());
    }

    #[test]
    fn test_placeholder_rule_json_shape() {
        let json = serde_json::to_value(identifier("sim_number", "SIM")).unwrap();
        assert_eq!(json["field"], "sim_number");
        assert_eq!(json["rule"], "identifier");
        assert_eq!(json["prefix"], "SIM");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = ImportConfig::from_json_str(r#"{ "acceptance_threshold": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ImportError::ConfigValueError { .. }));
    }
}
