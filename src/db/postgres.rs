//! PostgreSQL submission repository
//!
//! Identity data of the decedent and heirs is stored as JSONB so the schema
//! does not change when form fields are added.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::submission::models::{
    AhliWaris, DocumentLog, DocumentReference, LogAction, Pewaris, Submission, SubmissionOwner,
    SubmissionStatus,
};
use crate::submission::repository::{ListFilter, RepositoryError, SubmissionRepository};
use crate::surat::kondisi::Kondisi;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS submissions (
        id UUID PRIMARY KEY,
        nomor_surat TEXT NOT NULL UNIQUE,
        owner_id TEXT NOT NULL,
        owner_nama TEXT NOT NULL,
        owner_email TEXT NOT NULL,
        pewaris JSONB NOT NULL,
        ahli_waris JSONB NOT NULL,
        kondisi SMALLINT NOT NULL,
        catatan TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL,
        reviewed_by TEXT,
        reviewed_at TIMESTAMPTZ,
        review_notes TEXT,
        dokumen JSONB,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_submissions_status_created ON submissions (status, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_submissions_owner ON submissions (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS document_logs (
        id UUID PRIMARY KEY,
        submission_id UUID NOT NULL REFERENCES submissions (id),
        action TEXT NOT NULL,
        actor TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL,
        detail TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_document_logs_submission ON document_logs (submission_id, timestamp)",
];

const SUBMISSION_COLUMNS: &str = "id, nomor_surat, owner_id, owner_nama, owner_email, pewaris, \
     ahli_waris, kondisi, catatan, status, reviewed_by, reviewed_at, review_notes, dokumen, \
     created_at, updated_at";

pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .idle_timeout(std::time::Duration::from_secs(900))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::info!("Submission schema ready");
        Ok(())
    }
}

fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("invalid {} value: {}", column, value).into())
}

fn submission_from_row(row: &PgRow) -> Result<Submission, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let kondisi: i16 = row.try_get("kondisi")?;
    let pewaris: Json<Pewaris> = row.try_get("pewaris")?;
    let ahli_waris: Json<Vec<AhliWaris>> = row.try_get("ahli_waris")?;
    let dokumen: Option<Json<DocumentReference>> = row.try_get("dokumen")?;

    Ok(Submission {
        id: row.try_get("id")?,
        nomor_surat: row.try_get("nomor_surat")?,
        owner: SubmissionOwner {
            user_id: row.try_get("owner_id")?,
            nama: row.try_get("owner_nama")?,
            email: row.try_get("owner_email")?,
        },
        pewaris: pewaris.0,
        ahli_waris: ahli_waris.0,
        kondisi: u8::try_from(kondisi)
            .ok()
            .and_then(|code| Kondisi::from_code(code).ok())
            .ok_or_else(|| decode_error("kondisi", &kondisi.to_string()))?,
        catatan: row.try_get("catatan")?,
        status: SubmissionStatus::parse(&status).ok_or_else(|| decode_error("status", &status))?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get::<Option<DateTime<Utc>>, _>("reviewed_at")?,
        review_notes: row.try_get("review_notes")?,
        dokumen: dokumen.map(|d| d.0),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn log_from_row(row: &PgRow) -> Result<DocumentLog, sqlx::Error> {
    let action: String = row.try_get("action")?;
    Ok(DocumentLog {
        id: row.try_get("id")?,
        submission_id: row.try_get("submission_id")?,
        action: LogAction::parse(&action).ok_or_else(|| decode_error("action", &action))?,
        actor: row.try_get("actor")?,
        timestamp: row.try_get("timestamp")?,
        detail: row.try_get("detail")?,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn insert(&self, submission: &Submission) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO submissions (id, nomor_surat, owner_id, owner_nama, owner_email, pewaris,
                ahli_waris, kondisi, catatan, status, reviewed_by, reviewed_at, review_notes,
                dokumen, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(submission.id)
        .bind(&submission.nomor_surat)
        .bind(&submission.owner.user_id)
        .bind(&submission.owner.nama)
        .bind(&submission.owner.email)
        .bind(Json(&submission.pewaris))
        .bind(Json(&submission.ahli_waris))
        .bind(submission.kondisi.code() as i16)
        .bind(&submission.catatan)
        .bind(submission.status.as_str())
        .bind(submission.reviewed_by.as_deref())
        .bind(submission.reviewed_at)
        .bind(submission.review_notes.as_deref())
        .bind(submission.dokumen.as_ref().map(Json))
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::DuplicateNumber(
                submission.nomor_surat.clone(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM submissions WHERE id = $1",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(submission_from_row).transpose()?)
    }

    async fn update_if_status(
        &self,
        expected: SubmissionStatus,
        submission: &Submission,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $3, reviewed_by = $4, reviewed_at = $5, review_notes = $6,
                dokumen = $7, catatan = $8, updated_at = $9
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(submission.id)
        .bind(expected.as_str())
        .bind(submission.status.as_str())
        .bind(submission.reviewed_by.as_deref())
        .bind(submission.reviewed_at)
        .bind(submission.review_notes.as_deref())
        .bind(submission.dokumen.as_ref().map(Json))
        .bind(&submission.catatan)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get(submission.id).await? {
            Some(current) => Err(RepositoryError::StatusChanged {
                expected,
                actual: current.status,
            }),
            None => Err(RepositoryError::NotFound(submission.id)),
        }
    }

    async fn increment_download_count(&self, id: Uuid) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            r#"
            UPDATE submissions
            SET dokumen = jsonb_set(dokumen, '{download_count}',
                to_jsonb(COALESCE((dokumen->>'download_count')::BIGINT, 0) + 1))
            WHERE id = $1 AND dokumen IS NOT NULL
            RETURNING (dokumen->>'download_count')::BIGINT AS download_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get("download_count")?),
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn append_log(&self, log: &DocumentLog) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO document_logs (id, submission_id, action, actor, timestamp, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(log.id)
        .bind(log.submission_id)
        .bind(log.action.as_str())
        .bind(&log.actor)
        .bind(log.timestamp)
        .bind(&log.detail)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_logs(&self, submission_id: Uuid) -> Result<Vec<DocumentLog>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, submission_id, action, actor, timestamp, detail FROM document_logs \
             WHERE submission_id = $1 ORDER BY timestamp ASC",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(log_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM submissions \
             WHERE ($1::TEXT IS NULL OR status = $1) AND ($2::TEXT IS NULL OR owner_id = $2) \
             ORDER BY created_at DESC, id ASC LIMIT $3 OFFSET $4",
            SUBMISSION_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.owner_id.as_deref())
        .bind(filter.limit as i64)
        .bind(filter.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(submission_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
