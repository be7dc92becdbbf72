//! `object_store`-backed signature storage.
//!
//! Buckets map to independent `ObjectStore` handles so one adapter can serve
//! several buckets. Production wiring uses an S3-compatible endpoint (Ceph);
//! tests register `InMemory` stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::domain::ports::{SignatureStorage, SignatureStorageError};

const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible object store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStorageSettings {
    /// Custom endpoint, e.g. a Ceph RADOS gateway. `None` targets AWS.
    pub endpoint: Option<String>,
    /// Signing region; defaults to `us-east-1`.
    pub region: Option<String>,
    /// Access key id. Falls back to the environment when absent.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Permit plain HTTP endpoints.
    pub allow_http: bool,
}

/// Build an S3 store for `bucket`.
///
/// Custom endpoints use path-style requests, which Ceph and MinIO expect.
///
/// # Errors
///
/// Returns the builder error when the settings are incomplete or invalid.
pub fn build_s3_store(
    bucket: &str,
    settings: &ObjectStorageSettings,
) -> Result<Arc<dyn ObjectStore>, object_store::Error> {
    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region(settings.region.as_deref().unwrap_or(DEFAULT_REGION));

    if let Some(endpoint) = &settings.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
    }
    if settings.allow_http {
        builder = builder.with_allow_http(true);
    }
    if let Some(access_key_id) = &settings.access_key_id {
        builder = builder.with_access_key_id(access_key_id);
    }
    if let Some(secret_access_key) = &settings.secret_access_key {
        builder = builder.with_secret_access_key(secret_access_key);
    }

    Ok(Arc::new(builder.build()?))
}

/// Signature storage over a bucket → store registry.
#[derive(Clone, Default)]
pub struct ObjectStoreSignatureStorage {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl ObjectStoreSignatureStorage {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` as the backing store of `bucket`.
    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(bucket.into(), store);
        self
    }

    fn store_for(&self, bucket: &str) -> Result<&Arc<dyn ObjectStore>, SignatureStorageError> {
        self.stores
            .get(bucket)
            .ok_or_else(|| SignatureStorageError::unknown_bucket(bucket))
    }
}

#[async_trait]
impl SignatureStorage for ObjectStoreSignatureStorage {
    async fn put_content(
        &self,
        bucket: &str,
        key: &str,
        content: &str,
    ) -> Result<(), SignatureStorageError> {
        let store = self.store_for(bucket)?;
        let path = ObjectPath::parse(key)
            .map_err(|error| SignatureStorageError::invalid_key(key, error.to_string()))?;

        store
            .put(&path, PutPayload::from(content.to_owned()))
            .await
            .map_err(|error| SignatureStorageError::write(error.to_string()))?;
        debug!(bucket, key, bytes = content.len(), "object stored");
        Ok(())
    }
}
