// ==========================================
// Asset Import Engine - Domain Types
// ==========================================
// Scope: asset kinds, semantic value types, raw cells, normalized values
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// AssetKind
// ==========================================
// Selected once per import run; scopes eligible fields and defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    ItAsset,
    TelecomAsset,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::ItAsset, AssetKind::TelecomAsset];

    pub fn code(&self) -> &'static str {
        match self {
            AssetKind::ItAsset => "it_asset",
            AssetKind::TelecomAsset => "telecom_asset",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "it_asset" => Ok(AssetKind::ItAsset),
            "telecom_asset" => Ok(AssetKind::TelecomAsset),
            other => Err(format!(
                "unknown asset kind '{}' (expected it_asset or telecom_asset)",
                other
            )),
        }
    }
}

// ==========================================
// ValueType
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Text,
    Number,
    Date,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Text => write!(f, "text"),
            ValueType::Number => write!(f, "number"),
            ValueType::Date => write!(f, "date"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}

// ==========================================
// CellValue - one decoded spreadsheet cell
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Empty cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // 612345678.0 prints as "612345678"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

pub type RawRow = Vec<CellValue>;

/// Decoded sheet: ordered rows of scalar cells, owned by the caller.
pub type RawSheet = Vec<RawRow>;

// ==========================================
// FieldValue - normalized value of one canonical field
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_round_trip_code() {
        for kind in AssetKind::ALL {
            assert_eq!(kind.code().parse::<AssetKind>().unwrap(), kind);
        }
        assert!("printer".parse::<AssetKind>().is_err());
        assert_eq!(
            serde_json::to_string(&AssetKind::TelecomAsset).unwrap(),
            "\"telecom_asset\""
        );
    }

    #[test]
    fn test_cell_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(612345678.0).to_string(), "612345678");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_field_value_serializes_date_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            serde_json::to_string(&FieldValue::Date(date)).unwrap(),
            "\"2024-03-09\""
        );
        assert_eq!(serde_json::to_string(&FieldValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(FieldValue::text("").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }
}
