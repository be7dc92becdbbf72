//! Request signing and signature persistence.
//!
//! `sign` seals the JSON form of a payload; `save_signature` stores the seal
//! under a fresh random key so the excerpt generator can fetch it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    DigitalSealClient, DigitalSealError, SignRequest, SignatureStorage, SignatureStorageError,
};

/// Errors raised while signing or storing signatures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Payload or seal could not be encoded as JSON.
    #[error("signature payload serialisation failed: {message}")]
    Serialization {
        /// Encoder message.
        message: String,
    },
    /// Signing service call failed.
    #[error(transparent)]
    Seal(#[from] DigitalSealError),
    /// Object storage write failed.
    #[error(transparent)]
    Storage(#[from] SignatureStorageError),
}

impl From<serde_json::Error> for SignatureError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

/// Signs payloads and stores the resulting seals.
#[derive(Clone)]
pub struct DigitalSignatureService {
    bucket: String,
    seal: Arc<dyn DigitalSealClient>,
    storage: Arc<dyn SignatureStorage>,
}

impl DigitalSignatureService {
    /// Build a service writing seals into `bucket`.
    pub fn new(
        bucket: impl Into<String>,
        seal: Arc<dyn DigitalSealClient>,
        storage: Arc<dyn SignatureStorage>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            seal,
            storage,
        }
    }

    /// Seal the JSON encoding of `input` and return the seal as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Serialization`] when `input` cannot be
    /// encoded and [`SignatureError::Seal`] when the signing call fails.
    pub async fn sign<I>(&self, input: &I) -> Result<String, SignatureError>
    where
        I: Serialize + Sync + ?Sized,
    {
        let request = SignRequest {
            data: serde_json::to_string(input)?,
        };
        info!("signing data");
        let response = self.seal.sign(&request).await?;
        Ok(serde_json::to_string(&response)?)
    }

    /// Store `value` under a new random key and return that key.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Storage`] when the write fails.
    pub async fn save_signature(&self, value: &str) -> Result<String, SignatureError> {
        let key = Uuid::new_v4().to_string();
        info!(bucket = %self.bucket, "storing signature");
        debug!(key = %key, "generated signature storage key");
        self.storage.put_content(&self.bucket, &key, value).await?;
        Ok(key)
    }
}
