//! A transport that goes through the Headliner proxy.

use anyhow::anyhow;
use async_trait::async_trait;
use headliner_settings::{ClientSettings, UpstreamSettings};
use serde::Deserialize;
use url::Url;

use super::{build_client, classify_reqwest_error, UpstreamResponse, PROXY_ERROR_HEADER};
use crate::{ErrorKind, NewsError, NewsTransport, SetupError, UpstreamQuery};

/// Sends queries to the proxy served by `headliner-web`, without any
/// credential. The proxy attaches the credential and relays the provider's
/// response unchanged.
pub struct ProxiedTransport {
    /// The HTTP client to query the proxy with.
    client: reqwest::Client,
    /// The full URL of the proxy endpoint.
    proxy_url: Url,
}

/// The body the proxy sends when it fails on its own.
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    /// A human readable description of the failure.
    error: String,
}

impl ProxiedTransport {
    /// Create a ProxiedTransport from settings. Only the connection settings
    /// of `upstream` are used; its credential is never read.
    ///
    /// # Errors
    /// If the HTTP client cannot be created.
    pub fn new(client: &ClientSettings, upstream: &UpstreamSettings) -> Result<Self, SetupError> {
        Ok(Self {
            client: build_client(upstream)?,
            proxy_url: client.proxy_url.clone(),
        })
    }

    /// Create a boxed ProxiedTransport from settings.
    ///
    /// # Errors
    /// See [`ProxiedTransport::new`].
    pub fn new_boxed(
        client: &ClientSettings,
        upstream: &UpstreamSettings,
    ) -> Result<Box<Self>, SetupError> {
        Self::new(client, upstream).map(Box::new)
    }
}

#[async_trait]
impl NewsTransport for ProxiedTransport {
    fn name(&self) -> String {
        "ProxiedTransport".to_owned()
    }

    async fn send(&self, query: &UpstreamQuery) -> Result<UpstreamResponse, NewsError> {
        let url = query.proxy_url(&self.proxy_url);
        tracing::debug!(
            r#type = "news.proxied.request",
            endpoint = %query.endpoint,
            params = ?query.param_names(),
            "Requesting news through the proxy"
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let proxy_error: Option<ErrorKind> = response
            .headers()
            .get(PROXY_ERROR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        let response = UpstreamResponse::read(response).await?;

        match proxy_error {
            Some(ErrorKind::Network) => {
                let message = serde_json::from_slice::<ProxyErrorBody>(&response.body)
                    .map(|body| body.error)
                    .unwrap_or_default();
                Err(NewsError::Network(anyhow!(
                    "the proxy could not reach the news service: {}",
                    message
                )))
            }
            Some(ErrorKind::UnknownEndpoint) => {
                Err(NewsError::UnknownEndpoint(query.endpoint.to_string()))
            }
            Some(ErrorKind::Unknown) => Err(NewsError::Unknown(anyhow!(
                "the proxy failed with status {}",
                response.status
            ))),
            _ => Ok(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchRequest;
    use headliner_settings::Settings;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn transport_for(server: &MockServer) -> ProxiedTransport {
        let settings = Settings::load_for_tests(|settings| {
            settings.client.proxy_url = server.url("/api/news").parse().unwrap();
        });
        ProxiedTransport::new(&settings.client, &settings.upstream).unwrap()
    }

    #[tokio::test]
    async fn sends_endpoint_and_no_credential() {
        let server = MockServer::start_async().await;
        let with_key = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news").header_exists("X-Api-Key");
                then.status(500);
            })
            .await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/news")
                    .query_param("endpoint", "top-headlines")
                    .query_param("country", "us")
                    .query_param("pageSize", "10");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"status": "ok", "articles": []}));
            })
            .await;

        let response = transport_for(&server)
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap();

        mock.assert_async().await;
        with_key.assert_hits_async(0).await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn proxy_network_failures_are_network_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(500)
                    .header(PROXY_ERROR_HEADER, "network_error")
                    .json_body(json!({"error": "connection refused", "kind": "network_error"}));
            })
            .await;

        let error = transport_for(&server)
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn unclassified_proxy_failures_are_unknown_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(500)
                    .header(PROXY_ERROR_HEADER, "unknown_error")
                    .json_body(json!({"error": "Internal error", "kind": "unknown_error"}));
            })
            .await;

        let error = transport_for(&server)
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unknown);
    }

    #[tokio::test]
    async fn relayed_provider_errors_are_left_for_normalization() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/news");
                then.status(429)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"status": "error", "message": "Slow down"}));
            })
            .await;

        let response = transport_for(&server)
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap();
        assert_eq!(response.status, 429);
    }
}
