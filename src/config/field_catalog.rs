// ==========================================
// Asset Import Engine - Field Synonym Catalog
// ==========================================
// Canonical target fields, the asset kinds they apply to, their value
// types and the header phrasings (English/French) known to mean them.
// Immutable once built; share it behind an Arc.
// ==========================================

use crate::domain::types::{AssetKind, ValueType};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::normalize_header;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ==========================================
// MatchGuard - extra acceptance rules for ambiguous fields
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchGuard {
    /// Non-exact matches must reach this confidence.
    #[serde(default)]
    pub min_confidence: Option<f64>,
    /// Headers never accepted for this field, compared in normalized form.
    #[serde(default)]
    pub rejected_headers: Vec<String>,
}

impl MatchGuard {
    pub fn allows(&self, normalized_header: &str, confidence: f64, exact: bool) -> bool {
        if self
            .rejected_headers
            .iter()
            .any(|rejected| normalize_header(rejected) == normalized_header)
        {
            return false;
        }
        match self.min_confidence {
            Some(min) => exact || confidence >= min,
            None => true,
        }
    }
}

// ==========================================
// EnumRule - closed set of accepted codes for a text field
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub code: String,
    pub aliases: Vec<String>,
}

/// A leading negation word that turns one code into another
/// ("non actif" → inactive instead of active).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumNegation {
    pub prefixes: Vec<String>,
    pub code: String,
    pub negated_code: String,
}

impl EnumNegation {
    /// Remainder of `value` after a negation prefix, if it starts with one.
    fn strip<'v>(&self, value: &'v str) -> Option<&'v str> {
        self.prefixes.iter().find_map(|prefix| {
            let prefix = normalize_header(prefix);
            value
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
                .filter(|rest| !rest.is_empty())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumRule {
    pub variants: Vec<EnumVariant>,
    pub fallback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negation: Option<EnumNegation>,
}

impl EnumRule {
    /// Map a free-text value onto an accepted code.
    ///
    /// Exact alias matches win over partial ones. Partial matching is
    /// word-aligned so "inactif" never hits the "actif" alias, and the
    /// longest matching alias wins across all variants.
    pub fn canonicalize(&self, raw: &str) -> String {
        let value = normalize_header(raw);
        if value.is_empty() {
            return self.fallback.clone();
        }

        if let Some(code) = self.exact_match(&value) {
            return code.to_string();
        }

        if let Some(negation) = &self.negation {
            if let Some(rest) = negation.strip(&value) {
                let code = self.exact_match(rest).or_else(|| self.partial_match(rest));
                if code == Some(negation.code.as_str()) {
                    return negation.negated_code.clone();
                }
            }
        }

        self.partial_match(&value)
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn exact_match(&self, value: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|variant| {
                normalize_header(&variant.code) == value
                    || variant.aliases.iter().any(|a| normalize_header(a) == value)
            })
            .map(|variant| variant.code.as_str())
    }

    /// Variant with the longest word-aligned overlap; earlier variant on a tie.
    fn partial_match(&self, value: &str) -> Option<&str> {
        let padded_value = format!(" {} ", value);
        let mut best: Option<(&str, usize)> = None;

        for variant in &self.variants {
            for alias in &variant.aliases {
                let alias = normalize_header(alias);
                if alias.len() < 3 {
                    continue;
                }
                let padded_alias = format!(" {} ", alias);
                let overlap = if padded_value.contains(&padded_alias) {
                    alias.len()
                } else if value.len() >= 3 && padded_alias.contains(&padded_value) {
                    value.len()
                } else {
                    continue;
                };
                if best.map_or(true, |(_, len)| overlap > len) {
                    best = Some((variant.code.as_str(), overlap));
                }
            }
        }

        best.map(|(code, _)| code)
    }

    pub fn accepts(&self, code: &str) -> bool {
        code == self.fallback || self.variants.iter().any(|v| v.code == code)
    }
}

// ==========================================
// CanonicalField
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalField {
    pub name: String,
    pub kinds: Vec<AssetKind>,
    pub value_type: ValueType,
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<MatchGuard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_rule: Option<EnumRule>,
}

impl CanonicalField {
    pub fn new(name: &str, kinds: &[AssetKind], value_type: ValueType, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kinds: kinds.to_vec(),
            value_type,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            guard: None,
            enum_rule: None,
        }
    }

    pub fn with_guard(mut self, guard: MatchGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_enum_rule(mut self, rule: EnumRule) -> Self {
        self.enum_rule = Some(rule);
        self
    }

    pub fn is_eligible(&self, kind: AssetKind) -> bool {
        self.kinds.contains(&kind)
    }
}

// ==========================================
// FieldCatalog
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    fields: Vec<CanonicalField>,
}

impl FieldCatalog {
    /// Build a catalog from fields in declaration order (the tie-break order).
    pub fn new(fields: Vec<CanonicalField>) -> ImportResult<Self> {
        let catalog = Self { fields };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> ImportResult<Self> {
        let catalog: FieldCatalog = serde_json::from_str(json)
            .map_err(|e| ImportError::CatalogError(format!("malformed catalog JSON: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> ImportResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ImportError::InternalError(format!("catalog serialization failed: {}", e)))
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn eligible(&self, kind: AssetKind) -> impl Iterator<Item = &CanonicalField> {
        self.fields.iter().filter(move |f| f.is_eligible(kind))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn validate(&self) -> ImportResult<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ImportError::CatalogError("field with empty name".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ImportError::CatalogError(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
            if field.kinds.is_empty() {
                return Err(ImportError::CatalogError(format!(
                    "field '{}' applies to no asset kind",
                    field.name
                )));
            }
            if field.synonyms.iter().all(|s| normalize_header(s).is_empty()) {
                return Err(ImportError::CatalogError(format!(
                    "field '{}' has no usable synonym",
                    field.name
                )));
            }
            if let Some(min) = field.guard.as_ref().and_then(|g| g.min_confidence) {
                if !(0.0..=1.0).contains(&min) {
                    return Err(ImportError::CatalogError(format!(
                        "field '{}' guard confidence {} outside [0, 1]",
                        field.name, min
                    )));
                }
            }
        }
        Ok(())
    }

    /// Built-in English/French vocabulary.
    pub fn builtin() -> Self {
        use AssetKind::{ItAsset as IT, TelecomAsset as TEL};
        use ValueType::{Boolean, Date, Number, Text};

        let owner_guard = MatchGuard {
            min_confidence: Some(0.9),
            rejected_headers: vec!["check".to_string(), "checked".to_string()],
        };

        let fields = vec![
            // ===== IT asset identification =====
            CanonicalField::new("asset_tag", &[IT], Text, &[
                "asset tag", "tag", "asset id", "asset number", "code inventaire",
                "numero inventaire", "n inventaire", "inventaire", "code actif", "id",
                "reference", "ref", "code",
            ]),
            CanonicalField::new("serial_number", &[IT], Text, &[
                "serial number", "serial", "serial no", "numero de serie", "numero serie",
                "n serie", "no serie", "num serie", "serie", "sn",
            ]),
            CanonicalField::new("name", &[IT], Text, &[
                "hostname", "host name", "device name", "asset name", "computer name",
                "nom machine", "nom du poste", "nom poste", "poste", "designation", "libelle",
            ]),
            CanonicalField::new("device_type", &[IT], Text, &[
                "type", "device type", "asset type", "type appareil", "type de materiel",
                "type materiel", "categorie", "category", "equipement", "nature",
            ]),
            CanonicalField::new("brand", &[IT], Text, &[
                "brand", "marque", "manufacturer", "fabricant", "constructeur", "make",
            ]),
            CanonicalField::new("model", &[IT], Text, &[
                "model", "modele", "model name", "reference modele",
            ]),
            // ===== IT specifications =====
            CanonicalField::new("processor", &[IT], Text, &[
                "processor", "processeur", "cpu", "proc",
            ]),
            CanonicalField::new("ram_gb", &[IT], Number, &[
                "ram", "memory", "memoire", "memoire vive", "ram go", "ram gb",
            ]),
            CanonicalField::new("storage_gb", &[IT], Number, &[
                "storage", "stockage", "disk", "disque", "disque dur", "hdd", "ssd",
                "capacite disque",
            ]),
            CanonicalField::new("operating_system", &[IT], Text, &[
                "os", "operating system", "systeme", "systeme dexploitation",
                "systeme d exploitation",
            ]),
            // ===== IT assignment =====
            CanonicalField::new("owner", &[IT], Text, &[
                "owner", "proprietaire", "utilisateur", "user", "assigned to", "affecte a",
                "attribue a", "employe", "collaborateur", "beneficiaire", "nom",
                "nom utilisateur", "nom complet", "full name", "name",
            ])
            .with_guard(owner_guard.clone()),
            CanonicalField::new("location", &[IT], Text, &[
                "location", "localisation", "emplacement", "site", "lieu", "bureau",
                "office", "batiment", "ville", "city",
            ]),
            // ===== IT lifecycle =====
            CanonicalField::new("purchase_date", &[IT], Date, &[
                "purchase date", "date achat", "date dachat", "date d achat",
                "date acquisition", "date dacquisition", "acquisition", "bought on",
            ]),
            CanonicalField::new("warranty_end_date", &[IT], Date, &[
                "warranty end", "warranty end date", "warranty expiry", "fin garantie",
                "fin de garantie", "date fin garantie", "expiration garantie",
            ]),
            CanonicalField::new("purchase_price", &[IT], Number, &[
                "price", "purchase price", "cost", "amount", "prix", "prix achat",
                "prix dachat", "cout", "montant", "valeur",
            ]),
            CanonicalField::new("under_warranty", &[IT], Boolean, &[
                "under warranty", "warranty", "sous garantie", "garantie",
            ]),
            CanonicalField::new("ip_address", &[IT], Text, &[
                "ip", "ip address", "adresse ip", "addr ip",
            ]),
            CanonicalField::new("mac_address", &[IT], Text, &[
                "mac", "mac address", "adresse mac",
            ]),
            // ===== Telecom line =====
            CanonicalField::new("sim_number", &[TEL], Text, &[
                "sim number", "numero sim", "n sim", "sim", "tel", "telephone", "phone",
                "phone number", "numero", "numero de telephone", "num tel", "n tel",
                "mobile", "gsm", "ligne", "numero de ligne", "msisdn",
            ]),
            CanonicalField::new("sim_owner", &[TEL], Text, &[
                "sim owner", "owner", "nom", "name", "titulaire", "proprietaire",
                "utilisateur", "user", "nom complet", "full name", "employe",
                "collaborateur", "beneficiaire", "affecte a",
            ])
            .with_guard(owner_guard),
            CanonicalField::new("provider", &[TEL], Text, &[
                "provider", "operateur", "operator", "carrier", "fournisseur", "reseau",
                "network",
            ])
            .with_enum_rule(provider_rule()),
            CanonicalField::new("zone", &[TEL], Text, &[
                "zone", "ville", "city", "region", "site", "localisation", "location",
                "secteur", "agence",
            ]),
            CanonicalField::new("plan", &[TEL], Text, &[
                "plan", "forfait", "offre", "abonnement", "subscription", "tariff", "tarif",
            ]),
            CanonicalField::new("monthly_cost", &[TEL], Number, &[
                "monthly cost", "cout mensuel", "montant mensuel", "prix mensuel",
                "mensualite", "cout", "cost", "prix", "montant",
            ]),
            CanonicalField::new("data_allowance_gb", &[TEL], Number, &[
                "data", "internet", "data go", "data gb", "quota data", "enveloppe data",
                "volume data",
            ]),
            CanonicalField::new("activation_date", &[TEL], Date, &[
                "activation date", "date activation", "date dactivation",
                "date d activation", "mise en service", "date mise en service",
                "activated on", "date",
            ]),
            CanonicalField::new("imei", &[TEL], Text, &["imei", "numero imei", "imei number"]),
            CanonicalField::new("puk_code", &[TEL], Text, &["puk", "code puk", "puk code"]),
            CanonicalField::new("roaming_enabled", &[TEL], Boolean, &[
                "roaming", "roaming enabled", "itinerance", "international",
            ]),
            // ===== Shared =====
            CanonicalField::new("department", &[IT, TEL], Text, &[
                "department", "departement", "dept", "service", "direction", "division",
                "entite", "pole", "unit", "business unit",
            ]),
            CanonicalField::new("status", &[IT, TEL], Text, &[
                "status", "statut", "etat", "state", "situation",
            ])
            .with_enum_rule(status_rule()),
            CanonicalField::new("notes", &[IT, TEL], Text, &[
                "notes", "note", "remarks", "remarques", "commentaire", "commentaires",
                "comments", "observation", "observations",
            ]),
        ];

        Self { fields }
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn variant(code: &str, aliases: &[&str]) -> EnumVariant {
    EnumVariant {
        code: code.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

/// Provider codes accepted by the record store.
pub fn provider_rule() -> EnumRule {
    EnumRule {
        variants: vec![
            variant("maroc_telecom", &[
                "maroc telecom", "iam", "itissalat al maghrib", "itissalat", "mt",
            ]),
            variant("orange", &["orange", "meditel", "medi telecom", "meditelecom"]),
            variant("inwi", &["inwi", "wana", "wana corporate", "bayn"]),
        ],
        fallback: "other".to_string(),
        negation: None,
    }
}

pub fn status_rule() -> EnumRule {
    EnumRule {
        variants: vec![
            variant("active", &[
                "actif", "active", "en service", "in service", "in use", "utilise",
                "operationnel", "ok",
            ]),
            variant("inactive", &[
                "inactif", "inactive", "suspendu", "suspended", "desactive", "disabled",
                "en stock", "stock", "spare",
            ]),
            variant("maintenance", &[
                "maintenance", "en reparation", "reparation", "repair", "en panne", "panne",
                "broken", "defectueux", "hs", "hors service", "out of order",
            ]),
            variant("retired", &[
                "retired", "reforme", "retire", "obsolete", "decommissioned", "resilie",
                "cancelled", "rebut",
            ]),
            variant("lost", &["lost", "perdu", "vole", "stolen", "egare"]),
        ],
        fallback: "active".to_string(),
        negation: Some(EnumNegation {
            prefixes: vec!["non".to_string(), "hors".to_string(), "not".to_string()],
            code: "active".to_string(),
            negated_code: "inactive".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = FieldCatalog::builtin();
        assert!(catalog.validate().is_ok());
        assert!(catalog.get("sim_owner").is_some());
        assert!(catalog.get("serial_number").is_some());
    }

    #[test]
    fn test_eligibility_by_kind() {
        let catalog = FieldCatalog::builtin();
        let telecom: Vec<&str> = catalog
            .eligible(AssetKind::TelecomAsset)
            .map(|f| f.name.as_str())
            .collect();
        assert!(telecom.contains(&"sim_number"));
        assert!(telecom.contains(&"department"));
        assert!(!telecom.contains(&"serial_number"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let fields = vec![
            CanonicalField::new("zone", &[AssetKind::TelecomAsset], ValueType::Text, &["zone"]),
            CanonicalField::new("zone", &[AssetKind::ItAsset], ValueType::Text, &["site"]),
        ];
        assert!(matches!(
            FieldCatalog::new(fields),
            Err(ImportError::CatalogError(_))
        ));
    }

    #[test]
    fn test_field_without_synonyms_rejected() {
        let fields = vec![CanonicalField::new(
            "zone",
            &[AssetKind::TelecomAsset],
            ValueType::Text,
            &["--"],
        )];
        assert!(FieldCatalog::new(fields).is_err());
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = FieldCatalog::builtin();
        let json = catalog.to_json().unwrap();
        let loaded = FieldCatalog::from_json_str(&json).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_guard_rejects_listed_header_and_low_confidence() {
        let guard = MatchGuard {
            min_confidence: Some(0.9),
            rejected_headers: vec!["Check".to_string()],
        };
        assert!(!guard.allows("check", 1.0, true));
        assert!(!guard.allows("owners name", 0.75, false));
        assert!(guard.allows("owners", 0.91, false));
        assert!(guard.allows("nom", 1.0, true));
    }

    #[test]
    fn test_provider_canonicalization() {
        let rule = provider_rule();
        assert_eq!(rule.canonicalize("IAM"), "maroc_telecom");
        assert_eq!(rule.canonicalize("Maroc Télécom"), "maroc_telecom");
        assert_eq!(rule.canonicalize("Méditel"), "orange");
        assert_eq!(rule.canonicalize("Orange Business Services"), "orange");
        assert_eq!(rule.canonicalize("WANA"), "inwi");
        assert_eq!(rule.canonicalize("Free Mobile"), "other");
        assert_eq!(rule.canonicalize(""), "other");
    }

    #[test]
    fn test_status_partial_match_is_word_aligned() {
        let rule = status_rule();
        assert_eq!(rule.canonicalize("Inactif depuis mars"), "inactive");
        assert_eq!(rule.canonicalize("En panne"), "maintenance");
        assert_eq!(rule.canonicalize("ACTIF"), "active");
        assert_eq!(rule.canonicalize("???"), "active");
        assert!(rule.accepts("lost"));
        assert!(!rule.accepts("perdu"));
    }

    #[test]
    fn test_provider_longest_alias_wins() {
        let rule = provider_rule();
        assert_eq!(rule.canonicalize("Orange Maroc"), "orange");
        assert_eq!(rule.canonicalize("Maroc Telecom Entreprises"), "maroc_telecom");
        assert_eq!(rule.canonicalize("Wana Corporate Maroc"), "inwi");
    }

    #[test]
    fn test_status_negation() {
        let rule = status_rule();
        assert_eq!(rule.canonicalize("Non actif"), "inactive");
        assert_eq!(rule.canonicalize("NON ACTIVE"), "inactive");
        assert_eq!(rule.canonicalize("Not in use"), "inactive");
        assert_eq!(rule.canonicalize("Hors service"), "maintenance");
        // negating anything other than active keeps the partial match
        assert_eq!(rule.canonicalize("Non perdu, en panne"), "maintenance");
        assert_eq!(rule.canonicalize("Actif"), "active");
    }
}
