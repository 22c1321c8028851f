//! Tests that Headliner logs behave as expected.
//!
//! Logs from the server's workers are not captured here, since they run on
//! their own threads. The proxy's own logging is tested in `headliner-web`.
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use headliner_news::NewsClient;
use httpmock::Method::GET;
use serde_json::json;

#[headliner_test_macro]
async fn failed_searches_are_logged_with_their_kind(
    TestingTools {
        upstream_mock,
        settings,
        mut log_watcher,
        ..
    }: TestingTools,
) -> Result<()> {
    upstream_mock
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(429)
                .json_body(json!({"status": "error", "code": "rateLimited"}));
        })
        .await;

    let client = NewsClient::from_settings(&settings)?;
    assert!(client.fetch_top_headlines().await.is_err());

    assert!(log_watcher.has(|event| {
        event.field_contains("message", "Search failed")
            && event.field_contains("kind", "rate_limited")
    }));

    Ok(())
}

#[headliner_test_macro]
async fn the_credential_is_never_logged(
    TestingTools {
        upstream_mock,
        settings,
        mut log_watcher,
        ..
    }: TestingTools,
) -> Result<()> {
    let credential = settings.upstream.api_key()?.expose().to_string();
    upstream_mock
        .mock_async(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(401).json_body(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid."
            }));
        })
        .await;

    tracing::info!(?settings, "Settings in use");
    let client = NewsClient::from_settings(&settings)?;
    assert!(client.fetch_news("rust").await.is_err());
    assert!(client.fetch_top_headlines().await.is_err());

    assert!(log_watcher.has(|event| event.field_contains("message", "Settings in use")));
    assert!(!log_watcher.mentions(&credential));

    Ok(())
}
