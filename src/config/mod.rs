// ==========================================
// Asset Import Engine - Configuration Layer
// ==========================================
// Scope: field synonym catalog, import settings, config_kv overrides
// ==========================================

pub mod config_manager;
pub mod field_catalog;
pub mod import_config;
pub mod import_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use field_catalog::{
    CanonicalField, EnumNegation, EnumRule, EnumVariant, FieldCatalog, MatchGuard,
};
pub use import_config::{
    DeviceCategory, DeviceTypeRules, ImportConfig, KindProfile, PlaceholderRule, RequiredField,
};
pub use import_config_trait::ImportConfigReader;
