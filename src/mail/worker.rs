//! Background email delivery worker.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::{EmailJob, Mailer};
use crate::submission::models::{DocumentLog, LogAction};
use crate::submission::repository::SubmissionRepository;

const WORKER_ACTOR: &str = "system";

/// Starts the background email worker.
///
/// Each job is delivered once. The outcome is appended to the submission's
/// log as `EMAIL_SENT` or `EMAIL_FAILED`; failures never reach the caller that
/// queued the job.
pub async fn start_email_worker(
    mut receiver: mpsc::Receiver<EmailJob>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    repository: Arc<dyn SubmissionRepository + Send + Sync>,
) {
    log::info!("Email worker started");

    while let Some(job) = receiver.recv().await {
        let result = match &job {
            EmailJob::Approval {
                to,
                nama,
                nomor_surat,
                attachment,
                ..
            } => {
                mailer
                    .send_approval_email(to, nama, nomor_surat, attachment)
                    .await
            }
            EmailJob::Rejection {
                to,
                nama,
                nomor_surat,
                alasan,
                ..
            } => mailer.send_rejection_email(to, nama, nomor_surat, alasan).await,
        };

        let entry = match result {
            Ok(()) => {
                log::info!("Sent {} email to {}", job.kind(), job.recipient());
                DocumentLog::new(
                    job.submission_id(),
                    LogAction::EmailSent,
                    WORKER_ACTOR,
                    format!("{} email ke {}", job.kind(), job.recipient()),
                )
            }
            Err(e) => {
                log::error!(
                    "Failed to send {} email to {}: {}",
                    job.kind(),
                    job.recipient(),
                    e
                );
                DocumentLog::new(
                    job.submission_id(),
                    LogAction::EmailFailed,
                    WORKER_ACTOR,
                    e.to_string(),
                )
            }
        };

        if let Err(e) = repository.append_log(&entry).await {
            log::error!("Failed to record email outcome: {}", e);
        }
    }

    log::info!("Email worker stopped");
}
