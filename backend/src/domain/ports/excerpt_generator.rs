//! Driven port for the remote excerpt generator.
//!
//! Generation is asynchronous: submission returns an identifier that is then
//! polled for status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::define_port_error;

/// Excerpt generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcerptEventDto {
    /// Business record the excerpt describes.
    pub record_id: Option<Uuid>,
    /// Template key understood by the generator.
    pub excerpt_type: String,
    /// Template input data.
    pub excerpt_input_data: Map<String, Value>,
    /// Whether the generator must apply its own system signature.
    pub requires_system_signature: bool,
}

/// Storage references attached to a submission.
///
/// Both headers point at the same stored artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptSignatureHeaders {
    /// Storage key of the request signature.
    pub digital_signature: String,
    /// Storage key of the derived signature.
    pub digital_signature_derived: String,
}

impl ExcerptSignatureHeaders {
    /// Reference one stored signature from both headers.
    pub fn for_stored_signature(key: &str) -> Self {
        Self {
            digital_signature: key.to_owned(),
            digital_signature_derived: key.to_owned(),
        }
    }
}

/// Processing state reported by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExcerptProcessingStatus {
    /// Generation has not finished.
    InProgress,
    /// Document is ready.
    Completed,
    /// Generator gave up.
    Failed,
}

/// Status snapshot for one excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    /// Current processing state.
    pub status: ExcerptProcessingStatus,
    /// Generator-supplied detail, usually set on failure.
    #[serde(default)]
    pub status_details: Option<String>,
}

impl StatusDto {
    /// Whether generation is still running.
    pub fn is_in_progress(&self) -> bool {
        self.status == ExcerptProcessingStatus::InProgress
    }
}

define_port_error! {
    /// Errors surfaced while calling the excerpt generator.
    pub enum ExcerptGeneratorError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "excerpt generator transport failed: {message}",
        /// Call exceeded its timeout.
        Timeout { message: String } =>
            "excerpt generator timeout: {message}",
        /// Generator answered with a non-success status.
        Rejected { message: String } =>
            "excerpt generator rejected request: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "excerpt generator response decode failed: {message}",
    }
}

/// Port for submitting excerpt requests and checking their status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExcerptGenerator: Send + Sync {
    /// Submit a request and return the generator-assigned identifier.
    async fn generate(
        &self,
        event: &ExcerptEventDto,
        headers: &ExcerptSignatureHeaders,
    ) -> Result<Uuid, ExcerptGeneratorError>;

    /// Fetch the current status of an excerpt.
    async fn status(&self, excerpt_id: Uuid) -> Result<StatusDto, ExcerptGeneratorError>;
}
