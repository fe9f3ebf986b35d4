// ==========================================
// Asset Import Engine - SQLite Record Store
// ==========================================
// One row per created asset; payload kept as JSON.
// (asset_kind, unique_key) is unique, unique_key being the kind's
// identifier field (asset_tag / sim_number).
// ==========================================

use crate::config::ImportConfig;
use crate::db::{open_in_memory, open_sqlite_connection};
use crate::domain::asset::CandidateRecord;
use crate::domain::types::{AssetKind, FieldValue};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};
use uuid::Uuid;

// ==========================================
// StoredRecord - a persisted asset
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub asset_kind: AssetKind,
    pub unique_key: String,
    pub record: CandidateRecord,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// StoredValue - payload_json encoding of one field
// ==========================================
// Tagged so a text value shaped like a date reads back as text.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum StoredValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl From<&FieldValue> for StoredValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => StoredValue::Null,
            FieldValue::Bool(b) => StoredValue::Bool(*b),
            FieldValue::Number(n) => StoredValue::Number(*n),
            FieldValue::Date(d) => StoredValue::Date(*d),
            FieldValue::Text(s) => StoredValue::Text(s.clone()),
        }
    }
}

impl From<StoredValue> for FieldValue {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Null => FieldValue::Null,
            StoredValue::Bool(b) => FieldValue::Bool(b),
            StoredValue::Number(n) => FieldValue::Number(n),
            StoredValue::Date(d) => FieldValue::Date(d),
            StoredValue::Text(s) => FieldValue::Text(s),
        }
    }
}

fn encode_payload(record: &CandidateRecord) -> serde_json::Result<String> {
    let payload: BTreeMap<&str, StoredValue> = record
        .iter()
        .map(|(field, value)| (field.as_str(), StoredValue::from(value)))
        .collect();
    serde_json::to_string(&payload)
}

fn decode_payload(payload: &str) -> serde_json::Result<CandidateRecord> {
    let payload: BTreeMap<String, StoredValue> = serde_json::from_str(payload)?;
    Ok(payload
        .into_iter()
        .map(|(field, value)| (field, FieldValue::from(value)))
        .collect::<BTreeMap<_, _>>()
        .into())
}

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
    identifier_fields: BTreeMap<AssetKind, String>,
}

impl SqliteRecordStore {
    /// Open (or create) the store at `db_path`.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn in_memory() -> RepositoryResult<Self> {
        let conn =
            open_in_memory().map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// Share an existing connection (schema must already exist).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            identifier_fields: identifier_fields(&ImportConfig::default()),
        }
    }

    /// Take identifier fields from a non-default configuration.
    pub fn with_config(mut self, config: &ImportConfig) -> Self {
        self.identifier_fields = identifier_fields(config);
        self
    }

    fn identifier_field(&self, kind: AssetKind) -> RepositoryResult<&str> {
        self.identifier_fields
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| {
                RepositoryError::InternalError(format!("no identifier field for {}", kind))
            })
    }

    fn map_row(row: &Row) -> rusqlite::Result<(String, String, String, String, DateTime<Utc>)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }

    fn to_stored(
        raw: (String, String, String, String, DateTime<Utc>),
    ) -> RepositoryResult<StoredRecord> {
        let (record_id, kind, unique_key, payload, created_at) = raw;
        let asset_kind = kind
            .parse::<AssetKind>()
            .map_err(RepositoryError::ValidationError)?;
        let record = decode_payload(&payload)?;
        Ok(StoredRecord {
            record_id,
            asset_kind,
            unique_key,
            record,
            created_at,
        })
    }

    /// Fetch one record by id.
    pub fn get_record(&self, record_id: &str) -> RepositoryResult<Option<StoredRecord>> {
        let conn = self.conn.lock()?;
        let raw = conn
            .query_row(
                "SELECT record_id, asset_kind, unique_key, payload_json, created_at \
                 FROM asset_record WHERE record_id = ?1",
                params![record_id],
                Self::map_row,
            )
            .optional()?;
        raw.map(Self::to_stored).transpose()
    }

    /// All records of one kind, in insertion order.
    pub fn list_by_kind(&self, kind: AssetKind) -> RepositoryResult<Vec<StoredRecord>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT record_id, asset_kind, unique_key, payload_json, created_at \
             FROM asset_record WHERE asset_kind = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![kind.code()], Self::map_row)?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(Self::to_stored(raw?)?);
        }
        Ok(records)
    }

    pub fn count_by_kind(&self, kind: AssetKind) -> RepositoryResult<usize> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM asset_record WHERE asset_kind = ?1",
            params![kind.code()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn identifier_fields(config: &ImportConfig) -> BTreeMap<AssetKind, String> {
    AssetKind::ALL
        .iter()
        .map(|kind| (*kind, config.profile(*kind).identifier_field.clone()))
        .collect()
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self, record))]
    async fn create_record(
        &self,
        kind: AssetKind,
        record: &CandidateRecord,
    ) -> RepositoryResult<String> {
        let id_field = self.identifier_field(kind)?;
        let unique_key = match record.get(id_field) {
            Some(value) if !value.is_blank() => value.to_string(),
            _ => {
                return Err(RepositoryError::ValidationError(format!(
                    "{} is required for {}",
                    id_field, kind
                )))
            }
        };

        let payload = encode_payload(record)?;
        let record_id = Uuid::new_v4().to_string();

        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO asset_record \
             (record_id, asset_kind, unique_key, payload_json, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![record_id, kind.code(), unique_key, payload, Utc::now()],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => {
                RepositoryError::UniqueConstraintViolation(format!(
                    "{} '{}' already exists",
                    id_field, unique_key
                ))
            }
            other => other,
        })?;

        debug!(record_id = %record_id, unique_key = %unique_key, "record created");
        Ok(record_id)
    }
}
