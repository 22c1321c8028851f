//! Tests for the debug endpoints.
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[headliner_test_macro(|settings| settings.debug = true)]
async fn settings_are_shown_without_the_credential(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    let response = test_client.get("/debug/settings").send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["env"], json!("test"));
    assert_eq!(body["upstream"]["api_key"], json!("[redacted]"));
    assert!(!body.to_string().contains("test-api-key"));

    Ok(())
}

#[headliner_test_macro(|settings| settings.debug = false)]
async fn settings_are_hidden_outside_of_debug(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    let response = test_client.get("/debug/settings").send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
