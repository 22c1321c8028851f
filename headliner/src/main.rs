// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A news search service, and the proxy that keeps its credential secret.
//!
//! Headliner is split into several subcrates that work in collaboration.
//!
//! - [headliner-integration-tests](../headliner_integration_tests/index.html)
//! - [headliner-news](../headliner_news/index.html)
//! - [headliner-settings](../headliner_settings/index.html)
//! - [headliner-web](../headliner_web/index.html)

mod docs;

use anyhow::{Context, Result};
use headliner_settings::Settings;
use std::net::TcpListener;

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    settings
        .logging
        .init(std::io::stdout)
        .context("Initializing logging")?;

    // Refuse to start rather than answer every request with an error.
    settings
        .upstream
        .api_key()
        .context("Checking the news service credential")?;

    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;
    tracing::info!(
        r#type = "headliner.started",
        address = %settings.http.listen,
        env = %settings.env,
        "Starting Headliner"
    );

    headliner_web::run(listener, settings)
        .context("Starting headliner-web server")?
        .await
        .context("Running headliner-web server")?;

    Ok(())
}
