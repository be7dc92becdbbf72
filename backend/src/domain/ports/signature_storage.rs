//! Driven port for persisting signed artefacts in object storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while writing to object storage.
    pub enum SignatureStorageError {
        /// No store is configured for the bucket.
        UnknownBucket { bucket: String } =>
            "no object store configured for bucket {bucket}",
        /// Key is not a valid object path.
        InvalidKey { key: String, message: String } =>
            "invalid object key {key}: {message}",
        /// Store rejected or failed the write.
        Write { message: String } =>
            "object storage write failed: {message}",
    }
}

/// Port writing text content under a caller-chosen key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignatureStorage: Send + Sync {
    /// Store `content` under `key` in `bucket`, replacing any existing object.
    async fn put_content(
        &self,
        bucket: &str,
        key: &str,
        content: &str,
    ) -> Result<(), SignatureStorageError>;
}
