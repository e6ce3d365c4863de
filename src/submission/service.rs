//! Submission workflow: creation, review decisions, document generation and
//! delivery.
//!
//! Every operation takes the caller's [`Session`] explicitly. A status change
//! is committed with a conditional update against the status that was read,
//! so two reviewers acting on the same submission cannot both win.

use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::models::{
    CreateSubmissionRequest, DocumentLog, DocumentReference, ListQuery, LogAction, Submission,
    SubmissionOwner, SubmissionPage, SubmissionStatus,
};
use super::number::{generate_nomor_surat, is_valid_nomor_surat};
use super::repository::{ListFilter, RepositoryError, SubmissionRepository};
use super::state::{check_transition, is_terminal, required_role, InvalidStateTransitionError};
use crate::auth::{Role, Session};
use crate::mail::{Attachment, EmailJob};
use crate::storage::ObjectStorage;
use crate::surat::kondisi::{classify, InvalidScenarioError};
use crate::surat::traits::{Generator, Validator};
use crate::surat::validation::{ValidationError, ValidationErrors};
use crate::surat::{GeneratedDocument, GeneratorError};

const MAX_NUMBER_ATTEMPTS: usize = 5;
const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;

/// Document generator shared with blocking worker threads.
pub type SharedGenerator = Arc<dyn for<'a> Generator<&'a Submission> + Send + Sync>;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    InvalidScenario(#[from] InvalidScenarioError),
    #[error(transparent)]
    InvalidStateTransition(#[from] InvalidStateTransitionError),
    #[error("gagal membuat dokumen: {0}")]
    Generation(String),
    #[error("pembuatan dokumen melebihi batas waktu {} detik", .0.as_secs())]
    GenerationTimeout(Duration),
    #[error("gagal mengakses penyimpanan dokumen: {0}")]
    Storage(String),
    #[error("{0} tidak ditemukan")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("kesalahan basis data: {0}")]
    Repository(RepositoryError),
}

impl From<ValidationErrors> for SubmissionError {
    fn from(errors: ValidationErrors) -> Self {
        SubmissionError::Validation(errors)
    }
}

impl From<GeneratorError> for SubmissionError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::Scenario(e) => SubmissionError::InvalidScenario(e),
            GeneratorError::Render(e) => SubmissionError::Generation(e.to_string()),
        }
    }
}

impl From<RepositoryError> for SubmissionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => SubmissionError::NotFound(format!("pengajuan {}", id)),
            other => SubmissionError::Repository(other),
        }
    }
}

pub struct SubmissionService {
    repository: Arc<dyn SubmissionRepository + Send + Sync>,
    storage: Arc<dyn ObjectStorage + Send + Sync>,
    generator: SharedGenerator,
    email_sender: mpsc::Sender<EmailJob>,
    generation_timeout: Duration,
}

impl SubmissionService {
    pub fn new(
        repository: Arc<dyn SubmissionRepository + Send + Sync>,
        storage: Arc<dyn ObjectStorage + Send + Sync>,
        generator: SharedGenerator,
        email_sender: mpsc::Sender<EmailJob>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            storage,
            generator,
            email_sender,
            generation_timeout,
        }
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreateSubmissionRequest,
    ) -> Result<Submission, SubmissionError> {
        request.validate()?;
        let kondisi = classify(request.kondisi, &request.ahli_waris)?;

        let now = Utc::now();
        let status = if request.draft {
            SubmissionStatus::Draft
        } else {
            SubmissionStatus::Submitted
        };
        let mut submission = Submission {
            id: Uuid::new_v4(),
            nomor_surat: String::new(),
            owner: SubmissionOwner {
                user_id: session.user_id.clone(),
                nama: session.name.clone(),
                email: session.email.clone(),
            },
            pewaris: request.pewaris,
            ahli_waris: request.ahli_waris,
            kondisi,
            catatan: request.catatan.unwrap_or_default(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            dokumen: None,
            created_at: now,
            updated_at: now,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            submission.nomor_surat = generate_nomor_surat(Local::now().date_naive());
            if !is_valid_nomor_surat(&submission.nomor_surat) {
                return Err(SubmissionError::Generation(format!(
                    "nomor surat tidak valid: {}",
                    submission.nomor_surat
                )));
            }
            match self.repository.insert(&submission).await {
                Ok(()) => break,
                Err(RepositoryError::DuplicateNumber(nomor)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    log::warn!("Document number {} already taken, retrying", nomor);
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::info!(
            "Created submission {} ({}) for {} with status {}",
            submission.id,
            submission.nomor_surat,
            session.user_id,
            submission.status
        );
        self.record(
            submission.id,
            LogAction::Created,
            session,
            format!("kondisi {}", submission.kondisi.code()),
        )
        .await;
        if submission.status == SubmissionStatus::Submitted {
            self.record(submission.id, LogAction::Submitted, session, "").await;
        }

        Ok(submission)
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> Result<Submission, SubmissionError> {
        let submission = self.load(id).await?;
        ensure_can_read(session, &submission)?;
        Ok(submission)
    }

    /// Citizens only see their own submissions; admins see all.
    pub async fn list(
        &self,
        session: &Session,
        query: &ListQuery,
    ) -> Result<SubmissionPage, SubmissionError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let filter = ListFilter {
            status: query.status,
            owner_id: (!session.is_admin()).then(|| session.user_id.clone()),
            page,
            limit,
        };

        let items = self.repository.list(&filter).await?;
        Ok(SubmissionPage { items, page, limit })
    }

    pub async fn logs(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<Vec<DocumentLog>, SubmissionError> {
        let submission = self.load(id).await?;
        ensure_can_read(session, &submission)?;
        Ok(self.repository.list_logs(id).await?)
    }

    /// DRAFT -> SUBMITTED, by the owner.
    pub async fn submit(&self, session: &Session, id: Uuid) -> Result<Submission, SubmissionError> {
        let current = self.load(id).await?;
        if current.owner.user_id != session.user_id {
            return Err(SubmissionError::Forbidden(
                "Hanya pemohon yang dapat mengajukan surat ini".to_string(),
            ));
        }
        let mut updated = self.begin_transition(session, &current, SubmissionStatus::Submitted)?;
        classify(updated.kondisi.code(), &updated.ahli_waris)?;

        updated.updated_at = Utc::now();
        self.commit(current.status, &updated).await?;
        self.record(id, LogAction::Submitted, session, "").await;
        Ok(updated)
    }

    /// SUBMITTED -> VERIFIED.
    pub async fn verify(
        &self,
        session: &Session,
        id: Uuid,
        catatan: Option<String>,
    ) -> Result<Submission, SubmissionError> {
        let current = self.load(id).await?;
        let mut updated = self.begin_transition(session, &current, SubmissionStatus::Verified)?;
        mark_reviewed(&mut updated, session, catatan.clone());

        self.commit(current.status, &updated).await?;
        self.record(id, LogAction::Verified, session, catatan.unwrap_or_default())
            .await;
        Ok(updated)
    }

    /// VERIFIED -> APPROVED. Generates and stores the document, then queues
    /// the approval email. The status is left untouched if any step before the
    /// commit fails.
    pub async fn approve(
        &self,
        session: &Session,
        id: Uuid,
        catatan: Option<String>,
    ) -> Result<Submission, SubmissionError> {
        let current = self.load(id).await?;
        let mut updated = self.begin_transition(session, &current, SubmissionStatus::Approved)?;

        let document = self.generate_document(&current).await?;
        let url = self
            .storage
            .upload_file(&document.filename, &document.pdf)
            .await
            .map_err(SubmissionError::Storage)?;

        let now = Utc::now();
        mark_reviewed(&mut updated, session, catatan);
        updated.dokumen = Some(DocumentReference {
            url,
            filename: document.filename.clone(),
            generated_at: now,
            download_count: 0,
        });

        self.commit(current.status, &updated).await?;
        log::info!(
            "Submission {} approved by {} ({} pages)",
            updated.nomor_surat,
            session.user_id,
            document.page_count
        );
        self.record(id, LogAction::Approved, session, document.filename.clone())
            .await;

        self.enqueue_email(EmailJob::Approval {
            submission_id: id,
            to: updated.owner.email.clone(),
            nama: updated.owner.nama.clone(),
            nomor_surat: updated.nomor_surat.clone(),
            attachment: Attachment {
                filename: document.filename,
                content: document.pdf,
            },
        });

        Ok(updated)
    }

    /// SUBMITTED | VERIFIED -> REJECTED, with a mandatory reason.
    pub async fn reject(
        &self,
        session: &Session,
        id: Uuid,
        alasan: &str,
    ) -> Result<Submission, SubmissionError> {
        if alasan.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(ValidationError::empty_field("alasan", "Alasan penolakan"));
            return Err(SubmissionError::Validation(errors));
        }

        let current = self.load(id).await?;
        let mut updated = self.begin_transition(session, &current, SubmissionStatus::Rejected)?;
        mark_reviewed(&mut updated, session, Some(alasan.trim().to_string()));

        self.commit(current.status, &updated).await?;
        self.record(id, LogAction::Rejected, session, alasan.trim()).await;

        self.enqueue_email(EmailJob::Rejection {
            submission_id: id,
            to: updated.owner.email.clone(),
            nama: updated.owner.nama.clone(),
            nomor_surat: updated.nomor_surat.clone(),
            alasan: alasan.trim().to_string(),
        });

        Ok(updated)
    }

    /// APPROVED -> ARCHIVED.
    pub async fn archive(&self, session: &Session, id: Uuid) -> Result<Submission, SubmissionError> {
        let current = self.load(id).await?;
        let mut updated = self.begin_transition(session, &current, SubmissionStatus::Archived)?;
        updated.updated_at = Utc::now();

        self.commit(current.status, &updated).await?;
        self.record(id, LogAction::Archived, session, "").await;
        Ok(updated)
    }

    /// Render the document without changing any state.
    pub async fn preview(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<GeneratedDocument, SubmissionError> {
        require_admin(session)?;
        let submission = self.load(id).await?;
        self.generate_document(&submission).await
    }

    /// Fetch the stored PDF, counting the download.
    pub async fn download(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<(String, Vec<u8>), SubmissionError> {
        let submission = self.load(id).await?;
        ensure_can_read(session, &submission)?;

        let dokumen = submission
            .dokumen
            .as_ref()
            .ok_or_else(|| SubmissionError::NotFound(format!("dokumen {}", submission.nomor_surat)))?;

        let bytes = self
            .storage
            .download_file(&dokumen.filename)
            .await
            .map_err(SubmissionError::Storage)?;

        let count = self.repository.increment_download_count(id).await?;
        log::debug!("{} downloaded {} times", dokumen.filename, count);
        self.record(id, LogAction::Downloaded, session, format!("unduhan ke-{}", count))
            .await;

        Ok((dokumen.filename.clone(), bytes))
    }

    async fn load(&self, id: Uuid) -> Result<Submission, SubmissionError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| SubmissionError::NotFound(format!("pengajuan {}", id)))
    }

    fn begin_transition(
        &self,
        session: &Session,
        current: &Submission,
        to: SubmissionStatus,
    ) -> Result<Submission, SubmissionError> {
        if required_role(to) == Role::Admin {
            require_admin(session)?;
        }
        if is_terminal(current.status) {
            log::info!(
                "Submission {} is {} and can no longer change",
                current.nomor_surat,
                current.status
            );
        }
        check_transition(current.status, to)?;

        let mut updated = current.clone();
        updated.status = to;
        Ok(updated)
    }

    async fn commit(
        &self,
        expected: SubmissionStatus,
        updated: &Submission,
    ) -> Result<(), SubmissionError> {
        match self.repository.update_if_status(expected, updated).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::StatusChanged { actual, .. }) => {
                log::warn!(
                    "Submission {} changed to {} concurrently, dropping move to {}",
                    updated.id,
                    actual,
                    updated.status
                );
                Err(InvalidStateTransitionError {
                    from: actual,
                    to: updated.status,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn generate_document(
        &self,
        submission: &Submission,
    ) -> Result<GeneratedDocument, SubmissionError> {
        let generator = self.generator.clone();
        let owned = submission.clone();
        let task = tokio::task::spawn_blocking(move || generator.generate(&owned));

        match tokio::time::timeout(self.generation_timeout, task).await {
            Ok(Ok(result)) => result.map_err(|e| {
                log::error!("Generation failed for {}: {}", submission.nomor_surat, e);
                SubmissionError::from(e)
            }),
            Ok(Err(join_error)) => {
                log::error!(
                    "Generation task for {} panicked: {}",
                    submission.nomor_surat,
                    join_error
                );
                Err(SubmissionError::Generation(join_error.to_string()))
            }
            Err(_) => {
                log::error!(
                    "Generation for {} exceeded {:?}",
                    submission.nomor_surat,
                    self.generation_timeout
                );
                Err(SubmissionError::GenerationTimeout(self.generation_timeout))
            }
        }
    }

    fn enqueue_email(&self, job: EmailJob) {
        let kind = job.kind();
        if let Err(e) = self.email_sender.try_send(job) {
            log::error!("Failed to queue {} email: {}", kind, e);
        } else {
            log::debug!("Queued {} email", kind);
        }
    }

    async fn record(&self, id: Uuid, action: LogAction, session: &Session, detail: impl Into<String>) {
        let entry = DocumentLog::new(id, action, session.user_id.clone(), detail);
        if let Err(e) = self.repository.append_log(&entry).await {
            log::error!("Failed to append {} log for {}: {}", action.as_str(), id, e);
        }
    }
}

fn mark_reviewed(submission: &mut Submission, session: &Session, catatan: Option<String>) {
    let now = Utc::now();
    submission.reviewed_by = Some(session.user_id.clone());
    submission.reviewed_at = Some(now);
    submission.review_notes = catatan.filter(|c| !c.trim().is_empty());
    submission.updated_at = now;
}

fn require_admin(session: &Session) -> Result<(), SubmissionError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(SubmissionError::Forbidden(
            "Hanya petugas kelurahan yang dapat melakukan tindakan ini".to_string(),
        ))
    }
}

fn ensure_can_read(session: &Session, submission: &Submission) -> Result<(), SubmissionError> {
    if session.is_admin() || submission.owner.user_id == session.user_id {
        Ok(())
    } else {
        Err(SubmissionError::Forbidden(
            "Anda tidak memiliki akses ke pengajuan ini".to_string(),
        ))
    }
}
