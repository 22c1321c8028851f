//! A transport that calls the provider itself.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use headliner_settings::UpstreamSettings;
use reqwest::header::HeaderValue;
use url::Url;

use super::{build_client, classify_reqwest_error, UpstreamResponse, API_KEY_HEADER};
use crate::{NewsError, NewsTransport, SetupError, UpstreamQuery};

/// Sends queries straight to the provider, with the credential attached.
///
/// This is what the proxy uses to reach the provider, and what trusted
/// processes like `news-search` use when configured with `transport: direct`.
pub struct DirectTransport {
    /// The HTTP client to query the provider with.
    client: reqwest::Client,
    /// The provider's base URL.
    base_url: Url,
    /// The credential, marked as sensitive.
    api_key: HeaderValue,
}

impl DirectTransport {
    /// Create a DirectTransport from settings.
    ///
    /// # Errors
    /// If no credential is configured, if the credential cannot be sent as a
    /// header, or if the base URL cannot have a path.
    pub fn new(upstream: &UpstreamSettings) -> Result<Self, SetupError> {
        let mut api_key = HeaderValue::from_str(upstream.api_key()?.expose())
            .context("The API key contains characters that cannot be sent in a header")
            .map_err(SetupError::InvalidConfiguration)?;
        api_key.set_sensitive(true);

        if upstream.base_url.cannot_be_a_base() {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "{} cannot be used as the upstream base URL",
                upstream.base_url
            )));
        }

        Ok(Self {
            client: build_client(upstream)?,
            base_url: upstream.base_url.clone(),
            api_key,
        })
    }

    /// Create a boxed DirectTransport from settings.
    ///
    /// # Errors
    /// See [`DirectTransport::new`].
    pub fn new_boxed(upstream: &UpstreamSettings) -> Result<Box<Self>, SetupError> {
        Self::new(upstream).map(Box::new)
    }
}

#[async_trait]
impl NewsTransport for DirectTransport {
    fn name(&self) -> String {
        "DirectTransport".to_owned()
    }

    async fn send(&self, query: &UpstreamQuery) -> Result<UpstreamResponse, NewsError> {
        let url = query.upstream_url(&self.base_url)?;
        tracing::debug!(
            r#type = "news.direct.request",
            endpoint = %query.endpoint,
            params = ?query.param_names(),
            "Requesting news from the provider"
        );

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        UpstreamResponse::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, SearchRequest};
    use headliner_settings::{ApiKey, Settings, SettingsError};
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn upstream_for(server: &MockServer) -> UpstreamSettings {
        Settings::load_for_tests(|settings| {
            settings.upstream.base_url = server.base_url().parse().unwrap();
        })
        .upstream
    }

    #[tokio::test]
    async fn sends_the_credential_and_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/everything")
                    .header("X-Api-Key", "test-api-key")
                    .query_param("q", "rust lang")
                    .query_param("pageSize", "10")
                    .query_param("sortBy", "publishedAt")
                    .query_param("language", "en");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"status": "ok", "articles": []}));
            })
            .await;

        let transport = DirectTransport::new(&upstream_for(&server)).unwrap();
        let query = SearchRequest::topic("rust lang").unwrap().upstream_query();
        let response = transport.send(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(401).body("nope");
            })
            .await;

        let transport = DirectTransport::new(&upstream_for(&server)).unwrap();
        let response = transport
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.status_text, "Unauthorized");
        assert_eq!(&response.body[..], b"nope");
    }

    #[tokio::test]
    async fn unreachable_servers_are_network_errors() {
        let upstream = Settings::load_for_tests(|settings| {
            // Nothing listens on port 1.
            settings.upstream.base_url = "http://127.0.0.1:1".parse().unwrap();
        })
        .upstream;
        let transport = DirectTransport::new(&upstream).unwrap();
        let error = transport
            .send(&SearchRequest::top_headlines().upstream_query())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Network);
    }

    #[test]
    fn requires_a_credential() {
        let mut upstream = Settings::load_for_tests(|_| ()).upstream;
        upstream.api_key = None;
        assert!(matches!(
            DirectTransport::new(&upstream),
            Err(SetupError::Settings(SettingsError::MissingCredential))
        ));
    }

    #[test]
    fn rejects_credentials_that_are_not_header_safe() {
        let mut upstream = Settings::load_for_tests(|_| ()).upstream;
        upstream.api_key = Some(ApiKey::new("line\nbreak"));
        assert!(matches!(
            DirectTransport::new(&upstream),
            Err(SetupError::InvalidConfiguration(_))
        ));
    }
}
