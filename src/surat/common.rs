//! Common utilities for document generation.
//!
//! Shared helpers for Indonesian date formatting and file naming.

use chrono::{Datelike, NaiveDate};

/// Placeholder rendered wherever a value is missing or cannot be parsed.
pub const PLACEHOLDER: &str = "-";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Parse an ISO `YYYY-MM-DD` date, tolerating surrounding whitespace.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Format a date in Indonesian format (e.g., "17 Agustus 1995").
pub fn format_tanggal(date: NaiveDate) -> String {
    let month = MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Format a raw `YYYY-MM-DD` string; empty or unparseable input yields [`PLACEHOLDER`].
pub fn format_indonesian_date(value: &str) -> String {
    match parse_iso_date(value) {
        Some(date) => format_tanggal(date),
        None => PLACEHOLDER.to_string(),
    }
}

/// Return the trimmed value, or [`PLACEHOLDER`] when blank.
pub fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        PLACEHOLDER
    } else {
        trimmed
    }
}

/// File name under which a generated declaration is stored.
pub fn document_filename(nomor_surat: &str) -> String {
    format!("surat-pernyataan-{}.pdf", sanitize_filename(nomor_surat, "dokumen"))
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch);
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty() {
            result.push('-');
            last_dash = true;
        }
    }

    let result = result.trim_matches('-');
    if result.is_empty() {
        return fallback.to_string();
    }

    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_iso_date() {
        assert_eq!(format_indonesian_date("1995-08-17"), "17 Agustus 1995");
        assert_eq!(format_indonesian_date(" 2001-01-05 "), "5 Januari 2001");
    }

    #[test]
    fn test_format_bad_dates_fall_back() {
        assert_eq!(format_indonesian_date(""), PLACEHOLDER);
        assert_eq!(format_indonesian_date("17/08/1995"), PLACEHOLDER);
        assert_eq!(format_indonesian_date("1995-02-30"), PLACEHOLDER);
    }

    #[test]
    fn test_document_filename_keeps_number() {
        assert_eq!(
            document_filename("SP-20250817-AB12CD"),
            "surat-pernyataan-SP-20250817-AB12CD.pdf"
        );
    }

    #[test]
    fn test_sanitize_filename_fallback() {
        assert_eq!(sanitize_filename("  ***  ", "dokumen"), "dokumen");
        assert_eq!(sanitize_filename("a b__c", "x"), "a-b-c");
    }
}
