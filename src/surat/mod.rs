//! Surat module - business logic for composing the Surat Pernyataan Ahli Waris.
//!
//! The pipeline runs leaf-first:
//! - `kondisi` - checks the submitter's scenario against the heir list
//! - `grouping` - partitions heirs by relationship and marriage
//! - `clauses` - composes the narrative blocks
//! - `layout` - places lines on fixed-size pages
//! - `pdf` - serializes the pages to PDF bytes

pub mod clauses;
pub mod common;
pub mod grouping;
pub mod kondisi;
pub mod layout;
pub mod pdf;
pub mod traits;
pub mod validation;

pub use clauses::{compose, ClauseBlock, ClauseKind, SuratContext};
pub use grouping::HeirGroups;
pub use kondisi::{classify, InvalidScenarioError, Kondisi};
pub use layout::{render, Page, PageGeometry};
pub use pdf::{PdfEmitter, RenderError};
pub use traits::{Generator, Validator};

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::submission::models::Submission;

use common::{document_filename, format_tanggal};

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid scenario: {0}")]
    Scenario(#[from] InvalidScenarioError),
    #[error("failed to render document: {0}")]
    Render(#[from] RenderError),
}

/// Result of a successful document generation.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub tanggal: String,
    pub page_count: usize,
}

/// Stateless generator for the heirs declaration.
#[derive(Debug, Clone)]
pub struct AhliWarisGenerator {
    pub geometry: PageGeometry,
    pub tempat_surat: String,
    pub kelurahan: String,
}

impl AhliWarisGenerator {
    pub fn new(tempat_surat: impl Into<String>, kelurahan: impl Into<String>) -> Self {
        Self {
            geometry: PageGeometry::default(),
            tempat_surat: tempat_surat.into(),
            kelurahan: kelurahan.into(),
        }
    }

    /// Compose the clause blocks without laying them out.
    pub fn compose_blocks(
        &self,
        submission: &Submission,
        tanggal_surat: NaiveDate,
    ) -> Result<Vec<ClauseBlock>, GeneratorError> {
        let kondisi = classify(submission.kondisi.code(), &submission.ahli_waris)?;
        let groups = HeirGroups::from_heirs(&submission.ahli_waris, kondisi);
        let signatories = HeirGroups::signatories(&submission.ahli_waris);
        let context = SuratContext {
            nomor_surat: submission.nomor_surat.clone(),
            tempat_surat: self.tempat_surat.clone(),
            kelurahan: self.kelurahan.clone(),
            tanggal_surat,
        };

        Ok(compose(
            &submission.pewaris,
            kondisi,
            &groups,
            &signatories,
            &submission.catatan,
            &context,
        ))
    }

    /// Run the whole pipeline with an explicit letter date.
    pub fn generate_on(
        &self,
        submission: &Submission,
        tanggal_surat: NaiveDate,
    ) -> Result<GeneratedDocument, GeneratorError> {
        let blocks = self.compose_blocks(submission, tanggal_surat)?;
        let pages = render(&blocks, &self.geometry);
        let emitter = PdfEmitter::new(
            self.geometry.clone(),
            format!("{} {}", clauses::DOCUMENT_TITLE, submission.nomor_surat),
        );
        let pdf = emitter.emit(&pages)?;

        log::info!(
            "Generated declaration {} ({} pages, {} bytes)",
            submission.nomor_surat,
            pages.len(),
            pdf.len()
        );

        Ok(GeneratedDocument {
            filename: document_filename(&submission.nomor_surat),
            pdf,
            tanggal: format_tanggal(tanggal_surat),
            page_count: pages.len(),
        })
    }
}

impl<'a> Generator<&'a Submission> for AhliWarisGenerator {
    fn generate(&self, submission: &'a Submission) -> Result<GeneratedDocument, GeneratorError> {
        self.generate_on(submission, Local::now().date_naive())
    }
}
