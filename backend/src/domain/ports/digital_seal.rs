//! Driven port for the digital seal (signing) service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;

/// Payload submitted for sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    /// Canonical JSON text of the signed input.
    pub data: String,
}

/// Seal returned by the signing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    /// Encoded signature.
    pub signature: String,
}

define_port_error! {
    /// Errors surfaced while calling the signing service.
    pub enum DigitalSealError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "digital seal transport failed: {message}",
        /// Call exceeded its timeout.
        Timeout { message: String } =>
            "digital seal timeout: {message}",
        /// Service answered with a non-success status.
        Rejected { message: String } =>
            "digital seal rejected request: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "digital seal response decode failed: {message}",
    }
}

/// Port for sealing serialised payloads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DigitalSealClient: Send + Sync {
    /// Seal one payload.
    async fn sign(&self, request: &SignRequest) -> Result<SignResponse, DigitalSealError>;
}
