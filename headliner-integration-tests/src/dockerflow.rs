//! Tests that Headliner conforms to [Dockerflow](https://github.com/mozilla-services/dockerflow).
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use headliner_news::PROXY_ERROR_HEADER;
use reqwest::StatusCode;
use serde::Deserialize;

#[headliner_test_macro]
async fn lbheartbeat_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__lbheartbeat__").send().await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_length(), Some(0));
    Ok(())
}

#[headliner_test_macro]
async fn heartbeat_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__heartbeat__").send().await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get_all("content-type")
            .iter()
            .collect::<Vec<_>>(),
        vec!["application/json"]
    );

    #[derive(Deserialize, Debug)]
    struct Heartbeat {
        version: String,
        credential_configured: bool,
    }
    let body: Heartbeat = response.json().await?;
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    assert!(body.credential_configured);

    Ok(())
}

#[headliner_test_macro]
async fn version_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__version__").send().await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get_all("content-type")
            .iter()
            .collect::<Vec<_>>(),
        vec!["application/json"]
    );

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct VersionInfo {
        source: String,
        version: String,
        commit: String,
        build: String,
    }
    let body: Result<VersionInfo, _> = response.json().await;
    assert!(body.is_ok());

    Ok(())
}

#[headliner_test_macro]
async fn error_works(TestingTools { test_client, .. }: TestingTools) -> Result<()> {
    let response = test_client.get("/__error__").send().await?;

    assert!(response.status().is_server_error());
    assert_eq!(
        response.headers().get(PROXY_ERROR_HEADER).unwrap(),
        "unknown_error"
    );

    Ok(())
}
