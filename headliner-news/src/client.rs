//! The entry point for searching news.

use headliner_settings::{Settings, TransportKind};

use crate::{
    normalize, Article, DirectTransport, NewsError, NewsTransport, ProxiedTransport,
    SearchRequest, SetupError,
};

/// Searches for news using a transport chosen once, at construction.
///
/// Each search makes exactly one call. Nothing is retried, cached, or
/// de-duplicated, so overlapping searches are independent of each other.
pub struct NewsClient {
    /// How requests reach the provider.
    transport: Box<dyn NewsTransport>,
}

impl NewsClient {
    /// Create a client that uses `transport`.
    pub fn new(transport: Box<dyn NewsTransport>) -> Self {
        Self { transport }
    }

    /// Create a client using the transport selected by `settings.client`.
    ///
    /// # Errors
    /// If the selected transport cannot be set up, for example because the
    /// direct transport has no credential.
    pub fn from_settings(settings: &Settings) -> Result<Self, SetupError> {
        let transport: Box<dyn NewsTransport> = match settings.client.transport {
            TransportKind::Direct => DirectTransport::new_boxed(&settings.upstream)?,
            TransportKind::Proxied => {
                ProxiedTransport::new_boxed(&settings.client, &settings.upstream)?
            }
        };
        tracing::info!(
            r#type = "news.client.configured",
            transport = %transport.name(),
            "Configured news client"
        );
        Ok(Self::new(transport))
    }

    /// The name of the transport in use.
    pub fn transport_name(&self) -> String {
        self.transport.name()
    }

    /// Articles about `topic`, newest first.
    ///
    /// # Errors
    /// [`NewsError::Validation`] without making any request if `topic` is
    /// blank. Otherwise, see [`NewsClient::search`].
    pub async fn fetch_news(&self, topic: &str) -> Result<Vec<Article>, NewsError> {
        let request = SearchRequest::topic(topic).map_err(|error| {
            tracing::debug!(r#type = "news.search.rejected", %error, "Rejected search");
            error
        })?;
        self.search(&request).await
    }

    /// The current top headlines.
    ///
    /// # Errors
    /// See [`NewsClient::search`].
    pub async fn fetch_top_headlines(&self) -> Result<Vec<Article>, NewsError> {
        self.search(&SearchRequest::top_headlines()).await
    }

    /// Perform `request` and classify the result.
    ///
    /// # Errors
    /// The most specific [`NewsError`] describing the failure.
    #[tracing::instrument(skip(self, request), fields(mode = ?request.mode()))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>, NewsError> {
        let query = request.upstream_query();
        tracing::debug!(
            r#type = "news.search.in-flight",
            transport = %self.transport.name(),
            endpoint = %query.endpoint,
            "Searching"
        );

        let result = self
            .transport
            .send(&query)
            .await
            .and_then(|response| normalize(&response));

        match &result {
            Ok(articles) => tracing::debug!(
                r#type = "news.search.succeeded",
                article_count = articles.len(),
                "Search succeeded"
            ),
            Err(error) => tracing::warn!(
                r#type = "news.search.failed",
                kind = %error.kind(),
                %error,
                "Search failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{upstream_body, ErrorKind, UpstreamQuery, UpstreamResponse};
    use async_trait::async_trait;
    use fake::{Fake, Faker};
    use headliner_settings::Settings;
    use httpmock::{Method::GET, MockServer};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Answers every query with the same response, and remembers the queries.
    struct CannedTransport {
        status: u16,
        body: Value,
        queries: Arc<Mutex<Vec<UpstreamQuery>>>,
    }

    #[async_trait]
    impl NewsTransport for CannedTransport {
        fn name(&self) -> String {
            "CannedTransport".to_string()
        }

        async fn send(&self, query: &UpstreamQuery) -> Result<UpstreamResponse, NewsError> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(UpstreamResponse {
                status: self.status,
                status_text: String::new(),
                content_type: Some("application/json".to_string()),
                body: serde_json::to_vec(&self.body).unwrap().into(),
            })
        }
    }

    fn canned(status: u16, body: Value) -> (NewsClient, Arc<Mutex<Vec<UpstreamQuery>>>) {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let transport = CannedTransport {
            status,
            body,
            queries: queries.clone(),
        };
        (NewsClient::new(Box::new(transport)), queries)
    }

    #[tokio::test]
    async fn blank_topics_never_reach_the_transport() {
        let (client, queries) = canned(200, json!({"status": "ok", "articles": []}));
        for topic in ["", "   "] {
            let error = client.fetch_news(topic).await.unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation);
        }
        assert!(queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_search_makes_one_call() {
        let articles: Vec<_> = (0..3).map(|_| Faker.fake()).collect();
        let (client, queries) = canned(200, upstream_body(&articles));

        assert_eq!(client.fetch_news(" rust ").await.unwrap(), articles);
        assert_eq!(client.fetch_top_headlines().await.unwrap(), articles);

        let queries = queries.lock().unwrap();
        assert_eq!(
            *queries,
            vec![
                SearchRequest::topic("rust").unwrap().upstream_query(),
                SearchRequest::top_headlines().upstream_query(),
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let (client, queries) = canned(429, json!({"status": "error"}));
        let error = client.fetch_top_headlines().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RateLimited);
        assert_eq!(queries.lock().unwrap().len(), 1);
    }

    #[test]
    fn transport_is_chosen_by_settings() {
        let direct = Settings::load_for_tests(|settings| {
            settings.client.transport = TransportKind::Direct;
        });
        assert_eq!(
            NewsClient::from_settings(&direct).unwrap().transport_name(),
            "DirectTransport"
        );

        let proxied = Settings::load_for_tests(|settings| {
            settings.client.transport = TransportKind::Proxied;
            settings.upstream.api_key = None;
        });
        assert_eq!(
            NewsClient::from_settings(&proxied).unwrap().transport_name(),
            "ProxiedTransport"
        );
    }

    #[tokio::test]
    async fn direct_search_against_a_mock_provider() {
        let server = MockServer::start_async().await;
        let articles: Vec<_> = (0..10).map(|_| Faker.fake()).collect();
        let body = upstream_body(&articles);
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/top-headlines")
                    .header("X-Api-Key", "test-api-key")
                    .query_param("country", "us");
                then.status(200).json_body(body);
            })
            .await;

        let settings = Settings::load_for_tests(|settings| {
            settings.upstream.base_url = server.base_url().parse().unwrap();
        });
        let client = NewsClient::from_settings(&settings).unwrap();
        assert_eq!(client.fetch_top_headlines().await.unwrap(), articles);
    }
}
