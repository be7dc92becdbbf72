//! Reqwest-backed digital seal adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout and
//! HTTP error mapping, and JSON decoding of the returned seal.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::domain::ports::{DigitalSealClient, DigitalSealError, SignRequest, SignResponse};
use crate::outbound::http_support::{
    HttpAdapterBuildError, HttpFailure, build_client, classify_status, classify_transport_error,
    endpoint,
};

const SIGN_PATH: [&str; 3] = ["api", "eseal", "sign"];

/// Signing client posting to `{base}/api/eseal/sign`.
pub struct HttpDigitalSealClient {
    client: Client,
    sign_url: Url,
}

impl HttpDigitalSealClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, HttpAdapterBuildError> {
        Ok(Self {
            client: build_client(timeout)?,
            sign_url: endpoint(base_url, &SIGN_PATH)?,
        })
    }
}

#[async_trait]
impl DigitalSealClient for HttpDigitalSealClient {
    async fn sign(&self, request: &SignRequest) -> Result<SignResponse, DigitalSealError> {
        debug!(url = %self.sign_url, bytes = request.data.len(), "requesting digital seal");
        let response = self
            .client
            .post(self.sign_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
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
        parse_sign_response(body.as_ref())
    }
}

fn parse_sign_response(body: &[u8]) -> Result<SignResponse, DigitalSealError> {
    serde_json::from_slice(body)
        .map_err(|error| DigitalSealError::decode(format!("invalid seal payload: {error}")))
}

fn map_failure(failure: HttpFailure) -> DigitalSealError {
    match failure {
        HttpFailure::Transport(message) => DigitalSealError::transport(message),
        HttpFailure::Timeout(message) => DigitalSealError::timeout(message),
        HttpFailure::Rejected(message) => DigitalSealError::rejected(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::http::serve_once;
    use rstest::rstest;

    fn client(base: &Url) -> HttpDigitalSealClient {
        HttpDigitalSealClient::new(base, Duration::from_secs(5)).expect("client builds")
    }

    #[rstest]
    #[tokio::test]
    async fn posts_payload_and_decodes_seal() {
        let (base, server) = serve_once(200, r#"{"signature":"c2VhbA=="}"#).await;

        let response = client(&base)
            .sign(&SignRequest {
                data: r#"{"recordId":null}"#.to_owned(),
            })
            .await
            .expect("sign succeeds");

        assert_eq!(response.signature, "c2VhbA==");
        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /api/eseal/sign HTTP/1.1"));
        assert!(request.contains(r#"{"data":"{\"recordId\":null}"}"#));
    }

    #[rstest]
    #[tokio::test]
    async fn error_statuses_are_rejections() {
        let (base, server) = serve_once(403, r#"{"message":"key revoked"}"#).await;

        let error = client(&base)
            .sign(&SignRequest {
                data: "{}".to_owned(),
            })
            .await
            .expect_err("403 fails");

        assert_eq!(
            error,
            DigitalSealError::rejected(r#"status 403: {"message":"key revoked"}"#)
        );
        server.await.expect("server task");
    }

    #[rstest]
    fn malformed_seal_is_a_decode_error() {
        let error = parse_sign_response(br#"{"sig":"x"}"#).expect_err("missing field");

        assert!(matches!(error, DigitalSealError::Decode { .. }));
    }
}
