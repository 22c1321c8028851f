//! Tests for the parts of Headliner that are not the proxy.
#![cfg(test)]

use crate::{headliner_test_macro, TestingTools};
use anyhow::Result;
use reqwest::{header::HeaderValue, StatusCode};

#[headliner_test_macro(|settings| settings.public_documentation = Some("https://example.com/".parse().unwrap()))]
async fn root_of_services_provides_public_docs(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    let response = test_client.get("/").send().await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get("location"),
        Some(&HeaderValue::from_static("https://example.com/"))
    );

    Ok(())
}

#[headliner_test_macro(|settings| settings.public_documentation = None)]
async fn root_of_services_has_a_fallback_message(
    TestingTools { test_client, .. }: TestingTools,
) -> Result<()> {
    let response = test_client.get("/").send().await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await?,
        "Headliner relays news searches to its provider. Send requests to /api/news."
    );

    Ok(())
}

#[actix_rt::test]
async fn server_refuses_to_start_without_a_credential() {
    let settings = headliner_settings::Settings::load_for_tests(|settings| {
        settings.upstream.api_key = None;
    });
    let listener = std::net::TcpListener::bind(settings.http.listen).unwrap();

    let error = headliner_web::run(listener, settings).err().expect("server started");
    assert!(
        format!("{:#}", error).contains("No news API credential is configured"),
        "unexpected error {:#}",
        error
    );
}
