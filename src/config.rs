//! Runtime configuration read from the environment (and `.env`).

use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::mail::MailConfig;
use crate::storage::SupabaseConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_KELURAHAN: &str = "Cakung Barat";
const DEFAULT_TEMPAT_SURAT: &str = "Jakarta";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    /// `None` keeps submissions in memory.
    pub database_url: Option<String>,
    /// `None` keeps generated documents in memory.
    pub storage: Option<SupabaseConfig>,
    /// `None` only logs outgoing emails.
    pub mail: Option<MailConfig>,
    pub kelurahan: String,
    pub tempat_surat: String,
    pub generation_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_url: None,
            storage: None,
            mail: None,
            kelurahan: DEFAULT_KELURAHAN.to_string(),
            tempat_surat: DEFAULT_TEMPAT_SURAT.to_string(),
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let generation_timeout = match env::var("GENERATION_TIMEOUT_SECS") {
            Ok(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or(ConfigError::Invalid {
                        name: "GENERATION_TIMEOUT_SECS",
                        value,
                    })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_address: non_empty_var("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: non_empty_var("DATABASE_URL"),
            storage: SupabaseConfig::from_env()?,
            mail: MailConfig::from_env()?,
            kelurahan: non_empty_var("KELURAHAN").unwrap_or_else(|| DEFAULT_KELURAHAN.to_string()),
            tempat_surat: non_empty_var("TEMPAT_SURAT")
                .unwrap_or_else(|| DEFAULT_TEMPAT_SURAT.to_string()),
            generation_timeout,
        })
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
