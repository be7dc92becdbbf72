//! Helpers shared by the reqwest-backed adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

/// Errors raised while constructing an HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpAdapterBuildError {
    /// Base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base URL {url} cannot be used as an HTTP endpoint")]
    BaseUrl {
        /// Offending URL.
        url: String,
    },
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// How a failed call should be reported by the calling adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpFailure {
    Transport(String),
    Timeout(String),
    Rejected(String),
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, HttpAdapterBuildError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Append `segments` to `base`, ignoring a trailing slash on the base path.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, HttpAdapterBuildError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| HttpAdapterBuildError::BaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn classify_transport_error(error: &reqwest::Error) -> HttpFailure {
    if error.is_timeout() {
        HttpFailure::Timeout(error.to_string())
    } else {
        HttpFailure::Transport(error.to_string())
    }
}

pub(crate) fn classify_status(status: StatusCode, body: &[u8]) -> HttpFailure {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => HttpFailure::Timeout(message),
        _ if status.is_client_error() || status.is_server_error() => HttpFailure::Rejected(message),
        _ => HttpFailure::Transport(message),
    }
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
