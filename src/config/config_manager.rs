// ==========================================
// Asset Import Engine - Config Manager
// ==========================================
// Scalar overrides stored in the config_kv table (scope_id = 'global'),
// layered on top of a base ImportConfig.
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::AssetKind;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// config_kv keys read by the importer
pub mod config_keys {
    pub const ACCEPTANCE_THRESHOLD: &str = "import.acceptance_threshold";
    pub const PREVIEW_ROW_LIMIT: &str = "import.preview_row_limit";
    pub const SAMPLE_ROW_LIMIT: &str = "import.sample_row_limit";

    /// `import.<kind>.default.<field>`
    pub fn kind_default(kind: crate::domain::types::AssetKind, field: &str) -> String {
        format!("import.{}.default.{}", kind.code(), field)
    }

    pub fn kind_default_prefix(kind: crate::domain::types::AssetKind) -> String {
        format!("import.{}.default.", kind.code())
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    base: ImportConfig,
}

impl ConfigManager {
    /// Open (or create) the database at `db_path`.
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: String::new(),
            message: format!("cannot open {}: {}", db_path, e),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            base: ImportConfig::default(),
        })
    }

    /// Share an existing connection (schema must already exist).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            base: ImportConfig::default(),
        }
    }

    /// Replace the base layer the overrides apply to.
    pub fn with_base(mut self, base: ImportConfig) -> Self {
        self.base = base;
        self
    }

    fn lock(&self) -> ImportResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: String::new(),
            message: format!("lock poisoned: {}", e),
        })
    }

    /// Read one global config value.
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Upsert one global config value.
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// All (key, value) pairs under a key prefix.
    pub fn list_by_prefix(&self, prefix: &str) -> ImportResult<Vec<(String, String)>> {
        let conn = self.lock()?;
        let map_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: prefix.to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare(
                "SELECT key, value FROM config_kv \
                 WHERE scope_id = 'global' AND substr(key, 1, length(?1)) = ?1 \
                 ORDER BY key",
            )
            .map_err(map_err)?;
        let rows = stmt
            .query_map(params![prefix], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(map_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(map_err)
    }

    fn parse_value<T: FromStr>(&self, key: &str, fallback: T) -> ImportResult<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(fallback),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_acceptance_threshold(&self) -> ImportResult<f64> {
        self.parse_value(config_keys::ACCEPTANCE_THRESHOLD, self.base.acceptance_threshold)
    }

    async fn get_preview_row_limit(&self) -> ImportResult<usize> {
        self.parse_value(config_keys::PREVIEW_ROW_LIMIT, self.base.preview_row_limit)
    }

    async fn get_sample_row_limit(&self) -> ImportResult<usize> {
        self.parse_value(config_keys::SAMPLE_ROW_LIMIT, self.base.sample_row_limit)
    }

    async fn get_kind_default(
        &self,
        kind: AssetKind,
        field: &str,
    ) -> ImportResult<Option<String>> {
        match self.get_config_value(&config_keys::kind_default(kind, field))? {
            Some(value) => Ok(Some(value)),
            None => Ok(self.base.profile(kind).defaults.get(field).cloned()),
        }
    }

    async fn load_import_config(&self) -> ImportResult<ImportConfig> {
        let mut config = self.base.clone();
        config.acceptance_threshold = self.get_acceptance_threshold().await?;
        config.preview_row_limit = self.get_preview_row_limit().await?;
        config.sample_row_limit = self.get_sample_row_limit().await?;

        for kind in AssetKind::ALL {
            let prefix = config_keys::kind_default_prefix(kind);
            for (key, value) in self.list_by_prefix(&prefix)? {
                let field = key[prefix.len()..].to_string();
                if field.is_empty() {
                    continue;
                }
                debug!(kind = %kind, field = %field, value = %value, "default overridden");
                config.profile_mut(kind).defaults.insert(field, value);
            }
        }

        config.validate()?;
        Ok(config)
    }
}
