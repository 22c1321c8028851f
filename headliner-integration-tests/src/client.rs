//! Tests that searching through the proxy behaves exactly like searching the
//! provider directly.
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use fake::{Fake, Faker};
use headliner_news::{upstream_body, Article, ErrorKind, NewsClient, API_KEY_HEADER};
use headliner_settings::{Settings, TransportKind};
use httpmock::Method::GET;
use pretty_assertions::assert_eq;
use serde_json::json;

/// A client for each transport, both reaching the same provider.
fn clients(settings: &Settings) -> (NewsClient, NewsClient) {
    let mut direct = settings.clone();
    direct.client.transport = TransportKind::Direct;
    let mut proxied = settings.clone();
    proxied.client.transport = TransportKind::Proxied;
    proxied.upstream.api_key = None;

    (
        NewsClient::from_settings(&direct).expect("direct client"),
        NewsClient::from_settings(&proxied).expect("proxied client"),
    )
}

#[headliner_test_macro]
async fn both_transports_find_the_same_articles(
    TestingTools {
        upstream_mock,
        settings,
        ..
    }: TestingTools,
) -> Result<()> {
    let articles: Vec<Article> = (0..10).map(|_| Faker.fake()).collect();
    let body = upstream_body(&articles);
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("q", "space exploration")
                .query_param("pageSize", "10")
                .query_param("sortBy", "publishedAt")
                .query_param("language", "en")
                .header(API_KEY_HEADER, "test-api-key");
            then.status(200).json_body(body);
        })
        .await;

    let (direct, proxied) = clients(&settings);
    assert_eq!(direct.fetch_news("space exploration").await?, articles);
    assert_eq!(proxied.fetch_news("  space exploration ").await?, articles);

    mock.assert_hits_async(2).await;
    Ok(())
}

#[headliner_test_macro]
async fn both_transports_classify_errors_the_same(
    TestingTools {
        upstream_mock,
        settings,
        ..
    }: TestingTools,
) -> Result<()> {
    let (direct, proxied) = clients(&settings);

    for (status, body, expected) in [
        (
            401,
            json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}),
            ErrorKind::InvalidCredential,
        ),
        (
            429,
            json!({"status": "error", "code": "rateLimited", "message": "Slow down."}),
            ErrorKind::RateLimited,
        ),
        (503, json!({"status": "error"}), ErrorKind::Upstream),
        (
            200,
            json!({"status": "error", "message": "The country parameter is invalid."}),
            ErrorKind::Upstream,
        ),
        (200, json!({"status": "ok", "articles": "nope"}), ErrorKind::Upstream),
    ] {
        let mut mock = upstream_mock
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(status).json_body(body);
            })
            .await;

        let direct_error = direct.fetch_top_headlines().await.unwrap_err();
        let proxied_error = proxied.fetch_top_headlines().await.unwrap_err();

        assert_eq!(direct_error.kind(), expected, "status {}", status);
        assert_eq!(proxied_error.kind(), expected, "status {}", status);
        assert_eq!(direct_error.to_string(), proxied_error.to_string());

        mock.assert_hits_async(2).await;
        mock.delete_async().await;
    }

    Ok(())
}

#[headliner_test_macro]
async fn empty_results_are_empty_for_both(
    TestingTools {
        upstream_mock,
        settings,
        ..
    }: TestingTools,
) -> Result<()> {
    upstream_mock
        .mock_async(|when, then| {
            when.method(GET).path("/v2/top-headlines");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        })
        .await;

    let (direct, proxied) = clients(&settings);
    assert_eq!(direct.fetch_top_headlines().await?, Vec::<Article>::new());
    assert_eq!(proxied.fetch_top_headlines().await?, Vec::<Article>::new());

    Ok(())
}

#[headliner_test_macro]
async fn blank_topics_are_rejected_by_both(
    TestingTools {
        upstream_mock,
        settings,
        ..
    }: TestingTools,
) -> Result<()> {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"status": "ok", "articles": []}));
        })
        .await;

    let (direct, proxied) = clients(&settings);
    for client in [direct, proxied] {
        let error = client.fetch_news(" \t ").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    assert_eq!(mock.hits_async().await, 0);
    Ok(())
}

#[headliner_test_macro(|settings| settings.upstream.base_url = "http://127.0.0.1:1".parse().unwrap())]
async fn unreachable_provider_is_a_network_error_for_both(
    TestingTools { settings, .. }: TestingTools,
) -> Result<()> {
    let (direct, proxied) = clients(&settings);

    let direct_error = direct.fetch_top_headlines().await.unwrap_err();
    let proxied_error = proxied.fetch_top_headlines().await.unwrap_err();

    assert_eq!(direct_error.kind(), ErrorKind::Network);
    assert_eq!(proxied_error.kind(), ErrorKind::Network);
    assert_eq!(direct_error.to_string(), proxied_error.to_string());

    Ok(())
}
