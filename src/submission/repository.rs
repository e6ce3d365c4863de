//! Persistence seam for submissions and their audit logs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{DocumentLog, Submission, SubmissionStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("submission {0} not found")]
    NotFound(Uuid),
    #[error("document number {0} already exists")]
    DuplicateNumber(String),
    /// The stored status no longer matches what the caller read.
    #[error("submission status changed: expected {expected}, found {actual}")]
    StatusChanged {
        expected: SubmissionStatus,
        actual: SubmissionStatus,
    },
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        RepositoryError::Database(e.to_string())
    }
}

/// Listing filter. Pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<SubmissionStatus>,
    /// Restrict to one owner's submissions.
    pub owner_id: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListFilter {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

#[async_trait]
pub trait SubmissionRepository {
    /// Fails with [`RepositoryError::DuplicateNumber`] when `nomor_surat` is taken.
    async fn insert(&self, submission: &Submission) -> Result<(), RepositoryError>;

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, RepositoryError>;

    /// Replace the stored submission only if its status is still `expected`.
    async fn update_if_status(
        &self,
        expected: SubmissionStatus,
        submission: &Submission,
    ) -> Result<(), RepositoryError>;

    /// Bump the document's download counter and return the new value.
    async fn increment_download_count(&self, id: Uuid) -> Result<i64, RepositoryError>;

    async fn append_log(&self, log: &DocumentLog) -> Result<(), RepositoryError>;

    /// Logs of one submission, oldest first.
    async fn list_logs(&self, submission_id: Uuid) -> Result<Vec<DocumentLog>, RepositoryError>;

    /// Newest first.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Submission>, RepositoryError>;
}
