//! Object storage for generated documents.
//!
//! Production uses a Supabase Storage bucket over its REST API; local runs and
//! tests fall back to [`InMemoryStorage`].

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::env;

use crate::config::ConfigError;

#[async_trait]
pub trait ObjectStorage {
    /// Store `file_data` under `filename`, replacing any previous object.
    /// Returns the URL of the stored object.
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<String, String>;
    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String>;
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub bucket_name: String,
}

impl SupabaseConfig {
    /// Read the bucket settings. `Ok(None)` when `SUPABASE_URL` is unset.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let url = match env::var("SUPABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => return Ok(None),
        };
        let service_key = env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?;
        let bucket_name = env::var("BUCKET_NAME").unwrap_or_else(|_| "surat".to_string());

        Ok(Some(Self {
            url,
            service_key,
            bucket_name,
        }))
    }

    pub fn object_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.url, self.bucket_name, filename
        )
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, self.bucket_name, filename
        )
    }
}

pub struct SupabaseStorage {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.config.service_key))
            .header("apikey", &self.config.service_key)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<String, String> {
        let response = self
            .authorized(self.client.post(self.config.object_url(filename)))
            .header("Content-Type", "application/pdf")
            .header("x-upsert", "true")
            .body(file_data.to_vec())
            .send()
            .await
            .map_err(|e| format!("Failed to upload {}: {}", filename, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "Upload of {} failed with status {}: {}",
                filename, status, body
            ));
        }

        log::info!("Uploaded {} ({} bytes)", filename, file_data.len());
        Ok(self.config.public_url(filename))
    }

    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String> {
        let response = self
            .authorized(self.client.get(self.config.object_url(filename)))
            .send()
            .await
            .map_err(|e| format!("Failed to download {}: {}", filename, e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Download of {} failed with status {}",
                filename,
                response.status()
            ));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| format!("Failed to read {}: {}", filename, e))
    }
}

/// Process-local storage used when no bucket is configured.
#[derive(Default)]
pub struct InMemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.read().contains_key(filename)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload_file(&self, filename: &str, file_data: &[u8]) -> Result<String, String> {
        self.files
            .write()
            .insert(filename.to_string(), file_data.to_vec());
        Ok(format!("memory://{}", filename))
    }

    async fn download_file(&self, filename: &str) -> Result<Vec<u8>, String> {
        self.files
            .read()
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", filename))
    }
}
