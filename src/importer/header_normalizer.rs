// ==========================================
// Asset Import Engine - Header Normalizer
// ==========================================
// Canonical comparison form for headers and synonyms:
// lowercase, diacritics stripped, only [a-z0-9 ], single spaces, trimmed
// ==========================================

use crate::domain::types::CellValue;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a raw header string. Total and idempotent.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        for lc in ch.to_lowercase() {
            let mapped: &str = match lc {
                'a'..='z' | '0'..='9' => {
                    push_with_space(&mut out, &mut pending_space, lc);
                    continue;
                }
                // ligatures and letters with no decomposition
                'œ' => "oe",
                'æ' => "ae",
                'ß' => "ss",
                'ø' => "o",
                'đ' => "d",
                'ł' => "l",
                _ => continue,
            };
            for c in mapped.chars() {
                push_with_space(&mut out, &mut pending_space, c);
            }
        }
    }

    out
}

/// Header cells that are not text normalize to the empty string.
pub fn normalize_header_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => normalize_header(s),
        _ => String::new(),
    }
}

fn push_with_space(out: &mut String, pending_space: &mut bool, c: char) {
    if *pending_space {
        out.push(' ');
        *pending_space = false;
    }
    out.push(c);
}
