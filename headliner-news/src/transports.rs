//! The ways Headliner reaches the news provider.

mod direct;
mod proxied;

pub use self::direct::DirectTransport;
pub use self::proxied::ProxiedTransport;

use anyhow::Context;
use bytes::Bytes;
use headliner_settings::UpstreamSettings;
use reqwest::header::CONTENT_TYPE;

use crate::{NewsError, SetupError};

/// The header the provider reads the credential from.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// The header the proxy sets when a response describes its own failure rather
/// than the provider's. The value is an [`ErrorKind`](crate::ErrorKind) name.
pub const PROXY_ERROR_HEADER: &str = "X-Headliner-Error";

/// A response, as received, before any classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The canonical reason phrase for `status`, or an empty string.
    pub status_text: String,
    /// The `Content-Type` the response was sent with.
    pub content_type: Option<String>,
    /// The raw body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read a complete response from reqwest.
    async fn read(response: reqwest::Response) -> Result<Self, NewsError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await.map_err(classify_reqwest_error)?;

        Ok(Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
        })
    }
}

/// Build the HTTP client shared by both transports.
fn build_client(upstream: &UpstreamSettings) -> Result<reqwest::Client, SetupError> {
    reqwest::Client::builder()
        .connect_timeout(upstream.connect_timeout)
        .user_agent(upstream.user_agent.as_str())
        .build()
        .context("Unable to create the Reqwest client")
        .map_err(SetupError::Network)
}

/// Failing to build a request is a bug, not a network problem. Everything
/// else reqwest reports happened while talking to the server.
fn classify_reqwest_error(error: reqwest::Error) -> NewsError {
    if error.is_builder() {
        NewsError::Unknown(error.into())
    } else {
        NewsError::Network(error.into())
    }
}
