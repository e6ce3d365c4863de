//! Document numbers of the form `SP-YYYYMMDD-XXXXXX`.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^SP-\d{8}-[A-Z0-9]{6}$").expect("document number pattern is valid")
    })
}

/// Random uppercase alphanumeric suffix drawn from a v4 UUID.
fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}

/// Generate a fresh document number for the given day.
pub fn generate_nomor_surat(date: NaiveDate) -> String {
    format!("SP-{}-{}", date.format("%Y%m%d"), random_suffix())
}

pub fn is_valid_nomor_surat(value: &str) -> bool {
    pattern().is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 17).unwrap();
        let nomor = generate_nomor_surat(date);
        assert!(nomor.starts_with("SP-20250817-"));
        assert!(is_valid_nomor_surat(&nomor), "{nomor}");
    }

    #[test]
    fn test_same_day_numbers_differ() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 17).unwrap();
        let numbers: std::collections::HashSet<String> =
            (0..200).map(|_| generate_nomor_surat(date)).collect();
        assert_eq!(numbers.len(), 200);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_nomor_surat("SP-2025081-ABCDEF"));
        assert!(!is_valid_nomor_surat("SP-20250817-abcdef"));
        assert!(!is_valid_nomor_surat("XX-20250817-ABCDEF"));
    }
}
