// ==========================================
// Asset Import Engine - Similarity Scorer
// ==========================================
// similarity = (max_len - levenshtein) / max_len, both empty → 1.0
// Inputs are expected to be normalized already
// ==========================================

use strsim::levenshtein;

pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("ville", "ville"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_completely_different() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("", "abc"), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // one substitution over five characters
        assert!((similarity("serie", "serii") - 0.8).abs() < 1e-9);
        // "departement" vs "department": one deletion over eleven
        assert!((similarity("departement", "department") - 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let pairs = [("tel", "telephone"), ("owner", "check"), ("nom", "name")];
        for (a, b) in pairs {
            let s = similarity(a, b);
            assert_eq!(s, similarity(b, a));
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
