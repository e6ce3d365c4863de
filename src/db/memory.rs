//! In-memory submission repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::submission::models::{DocumentLog, Submission, SubmissionStatus};
use crate::submission::repository::{ListFilter, RepositoryError, SubmissionRepository};

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    submissions: RwLock<HashMap<Uuid, Submission>>,
    logs: RwLock<Vec<DocumentLog>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn insert(&self, submission: &Submission) -> Result<(), RepositoryError> {
        let mut submissions = self.submissions.write();
        if submissions
            .values()
            .any(|s| s.nomor_surat == submission.nomor_surat)
        {
            return Err(RepositoryError::DuplicateNumber(
                submission.nomor_surat.clone(),
            ));
        }
        submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, RepositoryError> {
        Ok(self.submissions.read().get(&id).cloned())
    }

    async fn update_if_status(
        &self,
        expected: SubmissionStatus,
        submission: &Submission,
    ) -> Result<(), RepositoryError> {
        let mut submissions = self.submissions.write();
        let stored = submissions
            .get_mut(&submission.id)
            .ok_or(RepositoryError::NotFound(submission.id))?;

        if stored.status != expected {
            return Err(RepositoryError::StatusChanged {
                expected,
                actual: stored.status,
            });
        }

        *stored = submission.clone();
        Ok(())
    }

    async fn increment_download_count(&self, id: Uuid) -> Result<i64, RepositoryError> {
        let mut submissions = self.submissions.write();
        let stored = submissions
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;

        match stored.dokumen.as_mut() {
            Some(dokumen) => {
                dokumen.download_count += 1;
                Ok(dokumen.download_count)
            }
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn append_log(&self, log: &DocumentLog) -> Result<(), RepositoryError> {
        self.logs.write().push(log.clone());
        Ok(())
    }

    async fn list_logs(&self, submission_id: Uuid) -> Result<Vec<DocumentLog>, RepositoryError> {
        Ok(self
            .logs
            .read()
            .iter()
            .filter(|l| l.submission_id == submission_id)
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Submission>, RepositoryError> {
        let mut items: Vec<Submission> = self
            .submissions
            .read()
            .values()
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| {
                filter
                    .owner_id
                    .as_ref()
                    .map_or(true, |owner| &s.owner.user_id == owner)
            })
            .cloned()
            .collect();

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(items
            .into_iter()
            .skip(filter.offset())
            .take(filter.limit as usize)
            .collect())
    }
}
