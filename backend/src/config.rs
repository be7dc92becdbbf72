//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `HISTORY_EXCERPTOR_*` environment variables or config
//! files. Required values are optional at load time and checked by
//! [`HistoryExcerptorSettings::validate`], so a missing value names its
//! field instead of surfacing as a generic deserialisation error.

use std::num::NonZeroU32;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::ExcerptPollingConfig;
use crate::outbound::persistence::PoolConfig;
use crate::outbound::storage::ObjectStorageSettings;

/// Raw settings as loaded from the environment and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HISTORY_EXCERPTOR")]
pub struct HistoryExcerptorSettings {
    /// PostgreSQL connection string for the registry database.
    pub database_url: Option<String>,
    /// Pool size limit.
    #[ortho_config(default = 10)]
    pub database_max_connections: u32,
    /// Bucket receiving request signatures.
    pub request_signature_bucket: Option<String>,
    /// Status checks before an excerpt is declared timed out.
    pub excerpt_status_check_max_attempts: Option<u32>,
    /// Base URL of the digital seal service.
    pub digital_seal_url: Option<String>,
    /// Base URL of the excerpt generator.
    pub excerpt_service_url: Option<String>,
    /// Per-request HTTP timeout.
    #[ortho_config(default = 30)]
    pub http_timeout_seconds: u64,
    /// S3-compatible endpoint; AWS when unset.
    pub storage_endpoint: Option<String>,
    /// S3 signing region.
    pub storage_region: Option<String>,
    /// S3 access key id.
    pub storage_access_key_id: Option<String>,
    /// S3 secret access key.
    pub storage_secret_access_key: Option<String>,
    /// Permit plain HTTP storage endpoints; off when unset.
    pub storage_allow_http: Option<bool>,
}

/// Settings rejected by [`HistoryExcerptorSettings::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A required value is absent or blank.
    #[error("missing required setting {field}")]
    Missing {
        /// Setting name.
        field: &'static str,
    },
    /// A numeric setting must be positive.
    #[error("setting {field} must be greater than zero")]
    NotPositive {
        /// Setting name.
        field: &'static str,
    },
    /// A URL setting could not be parsed.
    #[error("setting {field} is not a valid URL: {message}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Typed configuration consumed by the binary's wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    /// Database pool configuration.
    pub pool: PoolConfig,
    /// Bucket receiving request signatures.
    pub request_signature_bucket: String,
    /// Excerpt polling budget.
    pub polling: ExcerptPollingConfig,
    /// Digital seal base URL.
    pub digital_seal_url: Url,
    /// Excerpt generator base URL.
    pub excerpt_service_url: Url,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Object storage connection settings.
    pub storage: ObjectStorageSettings,
}

impl HistoryExcerptorSettings {
    /// Check required values and convert into typed configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        let database_url = required("database_url", self.database_url.as_deref())?;
        let max_connections = positive("database_max_connections", self.database_max_connections)?;
        let bucket = required(
            "request_signature_bucket",
            self.request_signature_bucket.as_deref(),
        )?;
        let max_attempts = self
            .excerpt_status_check_max_attempts
            .ok_or(SettingsError::Missing {
                field: "excerpt_status_check_max_attempts",
            })
            .and_then(|value| positive("excerpt_status_check_max_attempts", value))?;
        let digital_seal_url = url("digital_seal_url", self.digital_seal_url.as_deref())?;
        let excerpt_service_url = url("excerpt_service_url", self.excerpt_service_url.as_deref())?;
        if self.http_timeout_seconds == 0 {
            return Err(SettingsError::NotPositive {
                field: "http_timeout_seconds",
            });
        }

        Ok(ValidatedSettings {
            pool: PoolConfig::new(database_url).with_max_size(max_connections.get()),
            request_signature_bucket: bucket.to_owned(),
            polling: ExcerptPollingConfig::new(max_attempts),
            digital_seal_url,
            excerpt_service_url,
            http_timeout: Duration::from_secs(self.http_timeout_seconds),
            storage: ObjectStorageSettings {
                endpoint: self.storage_endpoint.clone(),
                region: self.storage_region.clone(),
                access_key_id: self.storage_access_key_id.clone(),
                secret_access_key: self.storage_secret_access_key.clone(),
                allow_http: self.storage_allow_http.unwrap_or(false),
            },
        })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, SettingsError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(SettingsError::Missing { field })
}

fn positive(field: &'static str, value: u32) -> Result<NonZeroU32, SettingsError> {
    NonZeroU32::new(value).ok_or(SettingsError::NotPositive { field })
}

fn url(field: &'static str, value: Option<&str>) -> Result<Url, SettingsError> {
    Url::parse(required(field, value)?).map_err(|error| SettingsError::InvalidUrl {
        field,
        message: error.to_string(),
    })
}
