// ==========================================
// Asset Import Engine - Value Normalizer
// ==========================================
// Raw cell → typed field value. A cell that cannot be coerced becomes
// Null; that is absorbed by synthesis and never reported as an error.
// ==========================================

use crate::domain::types::{CellValue, FieldValue, ValueType};
use crate::importer::asset_importer_trait::ValueNormalizer as ValueNormalizerTrait;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Day-first before month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const TRUTHY: &[&str] = &["true", "1", "yes", "y", "oui", "o", "vrai"];

/// Largest serial Excel can represent (9999-12-31).
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

pub struct ValueNormalizer;

impl ValueNormalizer {
    fn to_number(raw: &CellValue) -> FieldValue {
        match raw {
            CellValue::Number(n) => FieldValue::Number(*n),
            CellValue::Bool(b) => FieldValue::Number(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => parse_number(s).map_or(FieldValue::Null, FieldValue::Number),
            _ => FieldValue::Null,
        }
    }

    fn to_date(raw: &CellValue) -> FieldValue {
        let date = match raw {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Number(n) => from_excel_serial(*n),
            CellValue::Text(s) => parse_date(s),
            _ => None,
        };
        date.map_or(FieldValue::Null, FieldValue::Date)
    }

    fn to_boolean(raw: &CellValue) -> FieldValue {
        let truthy = match raw {
            CellValue::Bool(b) => *b,
            other => {
                let text = other.to_string().trim().to_lowercase();
                TRUTHY.contains(&text.as_str())
            }
        };
        FieldValue::Bool(truthy)
    }

    fn to_text(raw: &CellValue) -> FieldValue {
        match raw {
            CellValue::Empty => FieldValue::Null,
            other => FieldValue::Text(other.to_string().trim().to_string()),
        }
    }
}

impl ValueNormalizerTrait for ValueNormalizer {
    fn normalize(&self, raw: &CellValue, value_type: ValueType) -> FieldValue {
        match value_type {
            ValueType::Number => Self::to_number(raw),
            ValueType::Date => Self::to_date(raw),
            ValueType::Boolean => Self::to_boolean(raw),
            ValueType::Text => Self::to_text(raw),
        }
    }
}

/// Keep digits, '.', '-' and parse what is left.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    // serial numbers exported as text
    value.parse::<f64>().ok().and_then(from_excel_serial)
}

/// Excel day serial (1900 date system, epoch 1899-12-30).
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(serial > 0.0 && serial <= EXCEL_MAX_SERIAL) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::field_catalog::{CanonicalField, FieldCatalog};
    use crate::domain::types::AssetKind;

    fn norm(raw: CellValue, value_type: ValueType) -> FieldValue {
        ValueNormalizer.normalize(&raw, value_type)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_number_strips_noise() {
        assert_eq!(
            norm(CellValue::text("$1,234.56"), ValueType::Number),
            FieldValue::Number(1234.56)
        );
        assert_eq!(norm(CellValue::text(" 16 Go "), ValueType::Number), FieldValue::Number(16.0));
        assert_eq!(norm(CellValue::text("-12.5"), ValueType::Number), FieldValue::Number(-12.5));
        assert_eq!(norm(CellValue::Number(8.0), ValueType::Number), FieldValue::Number(8.0));
        assert_eq!(norm(CellValue::Bool(true), ValueType::Number), FieldValue::Number(1.0));
    }

    #[test]
    fn test_number_unparseable_is_null() {
        assert_eq!(norm(CellValue::text("n/a"), ValueType::Number), FieldValue::Null);
        assert_eq!(norm(CellValue::text("1.2.3"), ValueType::Number), FieldValue::Null);
        assert_eq!(norm(CellValue::Empty, ValueType::Number), FieldValue::Null);
    }

    #[test]
    fn test_date_formats() {
        let expected = FieldValue::Date(ymd(2024, 3, 15));
        for raw in [
            "2024-03-15",
            "15/03/2024",
            "15-03-2024",
            "15.03.2024",
            "2024/03/15",
            "20240315",
            "2024-03-15 10:30:00",
            "2024-03-15T10:30:00",
        ] {
            assert_eq!(norm(CellValue::text(raw), ValueType::Date), expected, "{}", raw);
        }
        // not a valid day-first date, valid month-first
        assert_eq!(
            norm(CellValue::text("03/25/2024"), ValueType::Date),
            FieldValue::Date(ymd(2024, 3, 25))
        );
    }

    #[test]
    fn test_date_from_cells_and_serials() {
        assert_eq!(
            norm(CellValue::Date(ymd(2023, 1, 2)), ValueType::Date),
            FieldValue::Date(ymd(2023, 1, 2))
        );
        let dt = ymd(2023, 1, 2).and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            norm(CellValue::DateTime(dt), ValueType::Date),
            FieldValue::Date(ymd(2023, 1, 2))
        );
        assert_eq!(
            norm(CellValue::Number(45366.0), ValueType::Date),
            FieldValue::Date(ymd(2024, 3, 15))
        );
        assert_eq!(
            norm(CellValue::text("45366"), ValueType::Date),
            FieldValue::Date(ymd(2024, 3, 15))
        );
        assert_eq!(norm(CellValue::Number(0.0), ValueType::Date), FieldValue::Null);
        assert_eq!(norm(CellValue::Number(-3.0), ValueType::Date), FieldValue::Null);
    }

    #[test]
    fn test_date_normalized_value_reparses_as_iso() {
        let value = norm(CellValue::text("09/11/2021"), ValueType::Date);
        let iso = value.to_string();
        assert_eq!(iso, "2021-11-09");
        assert!(NaiveDate::parse_from_str(&iso, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_date_garbage_is_null() {
        assert_eq!(norm(CellValue::text("bientôt"), ValueType::Date), FieldValue::Null);
        assert_eq!(norm(CellValue::text("31/02/2024"), ValueType::Date), FieldValue::Null);
        assert_eq!(norm(CellValue::Bool(true), ValueType::Date), FieldValue::Null);
    }

    #[test]
    fn test_boolean_closed_world() {
        for raw in ["Oui", "TRUE", "1", "yes", "o", "Vrai", " y "] {
            assert_eq!(
                norm(CellValue::text(raw), ValueType::Boolean),
                FieldValue::Bool(true),
                "{}",
                raw
            );
        }
        for raw in ["non", "false", "0", "garbage"] {
            assert_eq!(
                norm(CellValue::text(raw), ValueType::Boolean),
                FieldValue::Bool(false),
                "{}",
                raw
            );
        }
        assert_eq!(norm(CellValue::Empty, ValueType::Boolean), FieldValue::Bool(false));
        assert_eq!(norm(CellValue::Number(1.0), ValueType::Boolean), FieldValue::Bool(true));
        assert_eq!(norm(CellValue::Bool(false), ValueType::Boolean), FieldValue::Bool(false));
    }

    #[test]
    fn test_text_trimmed_and_untouched() {
        assert_eq!(
            norm(CellValue::text("  0612345678 "), ValueType::Text),
            FieldValue::text("0612345678")
        );
        assert_eq!(
            norm(CellValue::text("(212) 6-12-34"), ValueType::Text),
            FieldValue::text("(212) 6-12-34")
        );
        assert_eq!(
            norm(CellValue::Number(612345678.0), ValueType::Text),
            FieldValue::text("612345678")
        );
        assert_eq!(norm(CellValue::text("   "), ValueType::Text), FieldValue::text(""));
        assert_eq!(norm(CellValue::Empty, ValueType::Text), FieldValue::Null);
    }

    #[test]
    fn test_enum_field_canonicalized() {
        let catalog = FieldCatalog::builtin();
        let provider = catalog.get("provider").unwrap();
        assert_eq!(
            ValueNormalizer.normalize_for_field(&CellValue::text("Maroc Télécom"), provider),
            FieldValue::text("maroc_telecom")
        );
        assert_eq!(
            ValueNormalizer.normalize_for_field(&CellValue::text("Free"), provider),
            FieldValue::text("other")
        );
        // absence stays absent so defaults apply
        assert_eq!(
            ValueNormalizer.normalize_for_field(&CellValue::Empty, provider),
            FieldValue::Null
        );

        let plain =
            CanonicalField::new("notes", &[AssetKind::ItAsset], ValueType::Text, &["notes"]);
        assert_eq!(
            ValueNormalizer.normalize_for_field(&CellValue::text("orange"), &plain),
            FieldValue::text("orange")
        );
    }
}
