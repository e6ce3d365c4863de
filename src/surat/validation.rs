//! Input validation for declaration submissions.
//!
//! Produces field-level, Indonesian-language messages that the portal shows
//! next to the offending form input.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::common::parse_iso_date;

/// Validation error with detailed, user-friendly messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message in Indonesian
    pub message: String,
    /// Suggestion for how to fix the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} tidak boleh kosong", label)).with_suggestion(format!(
            "Mohon isi {} dengan data yang valid",
            label.to_lowercase()
        ))
    }

    /// Create error for invalid NIK format
    pub fn invalid_nik(field: &str) -> Self {
        Self::new(field, "NIK harus terdiri dari 16 digit angka")
            .with_suggestion("Periksa kembali NIK sesuai KTP, contoh: 3171234567890123")
    }

    /// Create error for invalid date format
    pub fn invalid_date_format(field: &str, value: &str) -> Self {
        Self::new(field, format!("Format tanggal '{}' tidak valid", value))
            .with_suggestion("Gunakan format: YYYY-MM-DD (contoh: 1995-08-17)")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Convert to Result - Ok if no errors, Err carrying every collected error
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validasi gagal: {} kesalahan ditemukan", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// Validate NIK format (16 digits) - optional, only validate if provided
pub fn validate_nik_optional(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }

    if trimmed.len() != 16 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.add(ValidationError::invalid_nik(field));
    }
}

/// Validate a required `YYYY-MM-DD` date
pub fn validate_date(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field, "Tanggal"));
        return;
    }

    if parse_iso_date(trimmed).is_none() {
        errors.add(ValidationError::invalid_date_format(field, trimmed));
    }
}

/// Validate that `later` does not precede `earlier`; unparseable dates are skipped
pub fn validate_date_order(earlier: &str, later: &str, field: &str, errors: &mut ValidationErrors) {
    if let (Some(start), Some(end)) = (parse_iso_date(earlier), parse_iso_date(later)) {
        if end < start {
            errors.add(
                ValidationError::new(field, "Tanggal meninggal tidak boleh sebelum tanggal lahir")
                    .with_suggestion("Periksa kembali tanggal pada akta kematian"),
            );
        }
    }
}
