//! Reqwest-backed excerpt generator adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::dto::ExcerptCreatedDto;
use crate::domain::ports::{
    ExcerptEventDto, ExcerptGenerator, ExcerptGeneratorError, ExcerptSignatureHeaders, StatusDto,
};
use crate::outbound::http_support::{
    HttpAdapterBuildError, HttpFailure, build_client, classify_status, classify_transport_error,
    endpoint,
};

/// Header carrying the storage key of the request signature.
pub const DIGITAL_SIGNATURE_HEADER: &str = "X-Digital-Signature";
/// Header carrying the storage key of the derived signature.
pub const DIGITAL_SIGNATURE_DERIVED_HEADER: &str = "X-Digital-Signature-Derived";

/// Excerpt generator client rooted at one base URL.
pub struct HttpExcerptGenerator {
    client: Client,
    base_url: Url,
    excerpts_url: Url,
}

impl HttpExcerptGenerator {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, HttpAdapterBuildError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.clone(),
            excerpts_url: endpoint(base_url, &["excerpts"])?,
        })
    }

    fn status_url(&self, excerpt_id: Uuid) -> Result<Url, ExcerptGeneratorError> {
        let id = excerpt_id.to_string();
        endpoint(&self.base_url, &["excerpts", id.as_str(), "status"])
            .map_err(|error| ExcerptGeneratorError::transport(error.to_string()))
    }
}

#[async_trait]
impl ExcerptGenerator for HttpExcerptGenerator {
    async fn generate(
        &self,
        event: &ExcerptEventDto,
        headers: &ExcerptSignatureHeaders,
    ) -> Result<Uuid, ExcerptGeneratorError> {
        let request = self
            .client
            .post(self.excerpts_url.clone())
            .header(DIGITAL_SIGNATURE_HEADER, headers.digital_signature.as_str())
            .header(
                DIGITAL_SIGNATURE_DERIVED_HEADER,
                headers.digital_signature_derived.as_str(),
            )
            .json(event);
        let created: ExcerptCreatedDto = execute(request).await?;
        debug!(excerpt_id = %created.excerpt_identifier, "excerpt accepted");
        Ok(created.excerpt_identifier)
    }

    async fn status(&self, excerpt_id: Uuid) -> Result<StatusDto, ExcerptGeneratorError> {
        let request = self.client.get(self.status_url(excerpt_id)?);
        execute(request).await
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ExcerptGeneratorError> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|error| map_failure(classify_transport_error(&error)))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|error| map_failure(classify_transport_error(&error)))?;
    if !status.is_success() {
        return Err(map_failure(classify_status(status, body.as_ref())));
    }
    decode(body.as_ref())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ExcerptGeneratorError> {
    serde_json::from_slice(body).map_err(|error| {
        ExcerptGeneratorError::decode(format!("invalid excerpt service payload: {error}"))
    })
}

fn map_failure(failure: HttpFailure) -> ExcerptGeneratorError {
    match failure {
        HttpFailure::Transport(message) => ExcerptGeneratorError::transport(message),
        HttpFailure::Timeout(message) => ExcerptGeneratorError::timeout(message),
        HttpFailure::Rejected(message) => ExcerptGeneratorError::rejected(message),
    }
}
