//! Outgoing email notifications.
//!
//! Emails never block a review decision: the service queues an [`EmailJob`]
//! and the worker in [`worker`] delivers it, recording the outcome in the
//! submission's audit log.

pub mod worker;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{non_empty_var, ConfigError};

pub use worker::start_email_worker;

/// Capacity of the email queue.
pub const EMAIL_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("mail request failed: {0}")]
    Transport(String),
    #[error("mail API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum EmailJob {
    Approval {
        submission_id: Uuid,
        to: String,
        nama: String,
        nomor_surat: String,
        attachment: Attachment,
    },
    Rejection {
        submission_id: Uuid,
        to: String,
        nama: String,
        nomor_surat: String,
        alasan: String,
    },
}

impl EmailJob {
    pub fn submission_id(&self) -> Uuid {
        match self {
            EmailJob::Approval { submission_id, .. } | EmailJob::Rejection { submission_id, .. } => {
                *submission_id
            }
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            EmailJob::Approval { to, .. } | EmailJob::Rejection { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EmailJob::Approval { .. } => "approval",
            EmailJob::Rejection { .. } => "rejection",
        }
    }
}

#[async_trait]
pub trait Mailer {
    async fn send_approval_email(
        &self,
        to: &str,
        nama: &str,
        nomor_surat: &str,
        attachment: &Attachment,
    ) -> Result<(), DeliveryError>;

    async fn send_rejection_email(
        &self,
        to: &str,
        nama: &str,
        nomor_surat: &str,
        alasan: &str,
    ) -> Result<(), DeliveryError>;
}

pub(crate) fn approval_subject(nomor_surat: &str) -> String {
    format!("Surat Pernyataan Ahli Waris {} telah disetujui", nomor_surat)
}

pub(crate) fn approval_body(nama: &str, nomor_surat: &str) -> String {
    format!(
        "Yth. {},\n\nPengajuan Surat Pernyataan Ahli Waris nomor {} telah disetujui. \
         Dokumen terlampir pada email ini dan juga dapat diunduh melalui portal.\n\n\
         Hormat kami,\nKelurahan",
        nama, nomor_surat
    )
}

pub(crate) fn rejection_subject(nomor_surat: &str) -> String {
    format!("Surat Pernyataan Ahli Waris {} ditolak", nomor_surat)
}

pub(crate) fn rejection_body(nama: &str, nomor_surat: &str, alasan: &str) -> String {
    format!(
        "Yth. {},\n\nPengajuan Surat Pernyataan Ahli Waris nomor {} ditolak dengan alasan:\n\n{}\n\n\
         Silakan perbaiki data dan ajukan kembali.\n\nHormat kami,\nKelurahan",
        nama, nomor_surat, alasan
    )
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl MailConfig {
    /// `Ok(None)` when `MAIL_API_URL` is unset.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_url) = non_empty_var("MAIL_API_URL") else {
            return Ok(None);
        };
        let api_key = non_empty_var("MAIL_API_KEY").ok_or(ConfigError::Missing("MAIL_API_KEY"))?;
        let from = non_empty_var("MAIL_FROM").ok_or(ConfigError::Missing("MAIL_FROM"))?;
        Ok(Some(Self {
            api_url,
            api_key,
            from,
        }))
    }
}

#[derive(Serialize)]
struct OutgoingAttachment<'a> {
    filename: &'a str,
    content: String,
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<OutgoingAttachment<'a>>,
}

/// Sends mail through a JSON HTTP API (Resend-compatible payload).
pub struct HttpMailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: MailConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    async fn send(&self, message: &OutgoingMessage<'_>) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_approval_email(
        &self,
        to: &str,
        nama: &str,
        nomor_surat: &str,
        attachment: &Attachment,
    ) -> Result<(), DeliveryError> {
        let message = OutgoingMessage {
            from: &self.config.from,
            to: vec![to],
            subject: approval_subject(nomor_surat),
            text: approval_body(nama, nomor_surat),
            attachments: vec![OutgoingAttachment {
                filename: &attachment.filename,
                content: BASE64.encode(&attachment.content),
            }],
        };
        self.send(&message).await
    }

    async fn send_rejection_email(
        &self,
        to: &str,
        nama: &str,
        nomor_surat: &str,
        alasan: &str,
    ) -> Result<(), DeliveryError> {
        let message = OutgoingMessage {
            from: &self.config.from,
            to: vec![to],
            subject: rejection_subject(nomor_surat),
            text: rejection_body(nama, nomor_surat, alasan),
            attachments: Vec::new(),
        };
        self.send(&message).await
    }
}

/// Writes emails to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_approval_email(
        &self,
        to: &str,
        _nama: &str,
        nomor_surat: &str,
        attachment: &Attachment,
    ) -> Result<(), DeliveryError> {
        log::info!(
            "[mail] to={} subject=\"{}\" attachment={} ({} bytes)",
            to,
            approval_subject(nomor_surat),
            attachment.filename,
            attachment.content.len()
        );
        Ok(())
    }

    async fn send_rejection_email(
        &self,
        to: &str,
        _nama: &str,
        nomor_surat: &str,
        alasan: &str,
    ) -> Result<(), DeliveryError> {
        log::info!(
            "[mail] to={} subject=\"{}\" reason=\"{}\"",
            to,
            rejection_subject(nomor_surat),
            alasan
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload() {
        let message = OutgoingMessage {
            from: "kelurahan@example.go.id",
            to: vec!["siti@example.com"],
            subject: approval_subject("SP-20250817-AB12CD"),
            text: approval_body("Siti", "SP-20250817-AB12CD"),
            attachments: vec![OutgoingAttachment {
                filename: "surat.pdf",
                content: BASE64.encode(b"%PDF"),
            }],
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"][0], "siti@example.com");
        assert_eq!(json["attachments"][0]["content"], "JVBERg==");
        assert!(json["text"].as_str().unwrap().contains("Yth. Siti"));
    }

    #[test]
    fn test_rejection_has_no_attachments_field() {
        let message = OutgoingMessage {
            from: "a@b.c",
            to: vec!["d@e.f"],
            subject: rejection_subject("SP-20250817-AB12CD"),
            text: rejection_body("Siti", "SP-20250817-AB12CD", "Akta tidak terbaca"),
            attachments: Vec::new(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("attachments").is_none());
        assert!(json["text"].as_str().unwrap().contains("Akta tidak terbaca"));
    }

    #[test]
    fn test_job_accessors() {
        let id = Uuid::new_v4();
        let job = EmailJob::Rejection {
            submission_id: id,
            to: "siti@example.com".to_string(),
            nama: "Siti".to_string(),
            nomor_surat: "SP-20250817-AB12CD".to_string(),
            alasan: "-".to_string(),
        };
        assert_eq!(job.submission_id(), id);
        assert_eq!(job.recipient(), "siti@example.com");
        assert_eq!(job.kind(), "rejection");
    }
}
