//! Tests for the news proxy, as browsers use it.
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use headliner_news::{API_KEY_HEADER, PROXY_ERROR_HEADER};
use httpmock::Method::GET;
use parameterized::parameterized;
use pretty_assertions::assert_eq;
use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};

/// A body in the provider's format, kept as text to check it is relayed
/// byte for byte.
const UPSTREAM_BODY: &str =
    r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":null,"name":"Example"},"title":"Hello","url":"https://example.com/hello","publishedAt":"2024-03-01T12:30:00Z"}]}"#;

#[headliner_test_macro]
async fn everything_is_forwarded_with_the_credential(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("q", "foo")
                .header(API_KEY_HEADER, "test-api-key");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .body(UPSTREAM_BODY);
        })
        .await;

    let response = test_client
        .get("/api/news?endpoint=everything&q=foo")
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    assert_eq!(response.text().await?, UPSTREAM_BODY);

    Ok(())
}

#[headliner_test_macro]
async fn parameters_are_passed_along_in_order(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2/top-headlines")
                .matches(|request| {
                    request.query_params
                        == Some(vec![
                            ("country".to_string(), "us".to_string()),
                            ("pageSize".to_string(), "10".to_string()),
                            ("category".to_string(), "science".to_string()),
                        ])
                });
            then.status(200).body(UPSTREAM_BODY);
        })
        .await;

    let response = test_client
        .get("/api/news?country=us&endpoint=top-headlines&pageSize=10&category=science")
        .send()
        .await?;

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    Ok(())
}

#[headliner_test_macro]
async fn unknown_endpoints_never_reach_the_provider(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body(UPSTREAM_BODY);
        })
        .await;

    for path in [
        "/api/news?endpoint=unknown",
        "/api/news?endpoint=sources",
        "/api/news?q=foo",
        "/api/news",
    ] {
        let response = test_client.get(path).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "path {}", path);
        assert_eq!(
            response.headers().get(PROXY_ERROR_HEADER).unwrap(),
            "unknown_endpoint"
        );
        let body: Value = response.json().await?;
        assert_eq!(body["kind"], json!("unknown_endpoint"));
    }

    assert_eq!(mock.hits_async().await, 0);
    Ok(())
}

#[headliner_test_macro]
async fn provider_errors_are_relayed_unchanged(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    for (status, body) in [
        (
            401,
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        ),
        (
            429,
            r#"{"status":"error","code":"rateLimited","message":"You have made too many requests."}"#,
        ),
        (500, r#"{"status":"error","code":"unexpectedError"}"#),
    ] {
        let mut mock = upstream_mock
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines");
                then.status(status)
                    .header("content-type", "application/json")
                    .body(body);
            })
            .await;

        let response = test_client
            .get("/api/news?endpoint=top-headlines&country=us")
            .send()
            .await?;

        assert_eq!(response.status().as_u16(), status);
        assert!(response.headers().get(PROXY_ERROR_HEADER).is_none());
        assert_eq!(response.text().await?, body);
        mock.assert_async().await;
        mock.delete_async().await;
    }

    Ok(())
}

#[headliner_test_macro(|settings| settings.upstream.base_url = "http://127.0.0.1:1".parse().unwrap())]
async fn unreachable_provider_is_a_network_error(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    let response = test_client
        .get("/api/news?endpoint=top-headlines&country=us")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(PROXY_ERROR_HEADER).unwrap(),
        "network_error"
    );
    let body: Value = response.json().await?;
    assert_eq!(
        body,
        json!({
            "error": "Unable to reach the news service. Please check your connection.",
            "kind": "network_error",
        })
    );

    Ok(())
}

#[headliner_test_macro]
async fn only_get_and_options_are_allowed(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.path("/v2/everything");
            then.status(200).body(UPSTREAM_BODY);
        })
        .await;

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = test_client
            .request(method.clone(), "/api/news?endpoint=everything&q=foo")
            .send()
            .await?;
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "method {}",
            method
        );
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, OPTIONS"
        );
        let body: Value = response.json().await?;
        assert_eq!(body["kind"], json!("method_not_allowed"));
    }

    assert_eq!(mock.hits_async().await, 0);
    Ok(())
}

#[headliner_test_macro]
async fn options_is_answered_without_a_body(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    // A bare OPTIONS, and a browser preflight.
    let bare = test_client.request(Method::OPTIONS, "/api/news").send().await?;
    let preflight = test_client
        .request(Method::OPTIONS, "/api/news?endpoint=everything")
        .header(header::ORIGIN, "https://reader.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await?;

    for response in [bare, preflight] {
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "GET, OPTIONS"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Content-Type"
        );
        assert_eq!(response.text().await?, "");
    }

    Ok(())
}

#[headliner_test_macro]
async fn any_origin_may_read_responses(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) -> Result<()> {
    upstream_mock
        .mock_async(|when, then| {
            when.path("/v2/everything");
            then.status(200).body(UPSTREAM_BODY);
        })
        .await;

    let response = test_client
        .get("/api/news?endpoint=everything&q=foo")
        .header(header::ORIGIN, "https://reader.example")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    Ok(())
}

#[headliner_test_macro(|settings, path: &str| settings.proxy.path = path.to_string())]
#[parameterized(path = { "/api/news", "/news", "/v1/proxy" })]
async fn proxy_path_is_configurable(
    TestingTools {
        test_client,
        upstream_mock,
        ..
    }: TestingTools,
) {
    let mock = upstream_mock
        .mock_async(|when, then| {
            when.path("/v2/everything").query_param("q", "foo");
            then.status(200).body(UPSTREAM_BODY);
        })
        .await;

    let response = test_client
        .get(&format!("{}?endpoint=everything&q=foo", path))
        .send()
        .await
        .expect("failed to execute request");

    pretty_assertions::assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}
