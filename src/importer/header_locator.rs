// ==========================================
// Asset Import Engine - Header Locator
// ==========================================
// Skips title banners and spacing rows: the first row whose text
// contains any header keyword is the header row (keyword OR, not AND).
// No match → first row. Blank rows below the header are dropped.
// ==========================================

use crate::domain::types::{CellValue, RawSheet};
use crate::importer::asset_importer_trait::{HeaderLocator as HeaderLocatorTrait, LocatedSheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_normalizer::normalize_header;

pub struct HeaderLocator {
    keywords: Vec<String>,
}

impl HeaderLocator {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| normalize_header(k))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn row_text(row: &[CellValue]) -> String {
        let joined = row
            .iter()
            .filter(|c| !c.is_blank())
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        normalize_header(&joined)
    }

    fn looks_like_header(&self, row: &[CellValue]) -> bool {
        let text = Self::row_text(row);
        !text.is_empty() && self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

impl HeaderLocatorTrait for HeaderLocator {
    fn locate<'a>(&self, sheet: &'a RawSheet) -> ImportResult<LocatedSheet<'a>> {
        if sheet.len() < 2 {
            return Err(ImportError::InsufficientRows { found: sheet.len() });
        }

        let header_row_index = sheet
            .iter()
            .position(|row| self.looks_like_header(row))
            .unwrap_or(0);

        let data_rows = sheet
            .iter()
            .enumerate()
            .skip(header_row_index + 1)
            .filter(|(_, row)| !row.iter().all(CellValue::is_blank))
            .collect();

        Ok(LocatedSheet {
            header_row_index,
            headers: &sheet[header_row_index],
            data_rows,
        })
    }
}
