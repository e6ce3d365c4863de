//! Database module - AppState and repository backends
//!
//! - `memory` - process-local repository used when no database is configured
//! - `postgres` - PostgreSQL repository backed by sqlx

mod memory;
mod postgres;

pub use memory::InMemorySubmissionRepository;
pub use postgres::PgSubmissionRepository;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::mail::{start_email_worker, HttpMailer, LogMailer, Mailer, EMAIL_QUEUE_CAPACITY};
use crate::storage::{InMemoryStorage, ObjectStorage, SupabaseStorage};
use crate::submission::repository::SubmissionRepository;
use crate::submission::service::{SharedGenerator, SubmissionService};
use crate::surat::AhliWarisGenerator;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubmissionService>,
    pub repository: Arc<dyn SubmissionRepository + Send + Sync>,
    pub storage: Arc<dyn ObjectStorage + Send + Sync>,
}

impl AppState {
    pub async fn new_with_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent(concat!("sitalaris-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let repository: Arc<dyn SubmissionRepository + Send + Sync> = match &config.database_url {
            Some(url) => {
                let repository = PgSubmissionRepository::connect(url).await?;
                repository.ensure_schema().await?;
                log::info!("Using PostgreSQL submission repository");
                Arc::new(repository)
            }
            None => {
                log::warn!("DATABASE_URL not set, submissions are kept in memory");
                Arc::new(InMemorySubmissionRepository::new())
            }
        };

        let storage: Arc<dyn ObjectStorage + Send + Sync> = match &config.storage {
            Some(supabase) => Arc::new(SupabaseStorage::new(supabase.clone(), http_client.clone())),
            None => {
                log::warn!("SUPABASE_URL not set, documents are kept in memory");
                Arc::new(InMemoryStorage::new())
            }
        };

        let mailer: Arc<dyn Mailer + Send + Sync> = match &config.mail {
            Some(mail) => Arc::new(HttpMailer::new(mail.clone(), http_client)),
            None => {
                log::warn!("MAIL_API_URL not set, emails are only logged");
                Arc::new(LogMailer)
            }
        };

        let generator: SharedGenerator = Arc::new(AhliWarisGenerator::new(
            config.tempat_surat.clone(),
            config.kelurahan.clone(),
        ));

        Ok(Self::new_with_components(
            repository,
            storage,
            mailer,
            generator,
            config.generation_timeout,
        ))
    }

    /// Wire the service from ready-made collaborators and spawn the email
    /// worker. Must be called inside a Tokio runtime.
    pub fn new_with_components(
        repository: Arc<dyn SubmissionRepository + Send + Sync>,
        storage: Arc<dyn ObjectStorage + Send + Sync>,
        mailer: Arc<dyn Mailer + Send + Sync>,
        generator: SharedGenerator,
        generation_timeout: Duration,
    ) -> Self {
        let (email_sender, receiver) = mpsc::channel(EMAIL_QUEUE_CAPACITY);

        let worker_repository = repository.clone();
        tokio::spawn(async move {
            start_email_worker(receiver, mailer, worker_repository).await;
        });

        let service = SubmissionService::new(
            repository.clone(),
            storage.clone(),
            generator,
            email_sender,
            generation_timeout,
        );

        AppState {
            service: Arc::new(service),
            repository,
            storage,
        }
    }
}
