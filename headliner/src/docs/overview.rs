//! # High level overview of Headliner
//!
//! This project is a [Cargo Workspace][] with one crate for each broad area of
//! behavior. Each crate can be built and tested on its own.
//!
//! [Cargo Workspace]: https://doc.rust-lang.org/book/ch14-03-cargo-workspaces.html
//!
//! ## [`headliner`](../)
//!
//! The service binary. It loads settings, sets up logging, and runs the web
//! server from `headliner-web`.
//!
//! ## [`headliner-settings`](../../headliner_settings/index.html)
//!
//! Defines and documents the settings of the application, including the news
//! service credential and which transport clients use.
//!
//! ## [`headliner-news`](../../headliner_news/index.html)
//!
//! Turns a user's search into a request for the news service, delivers it
//! either directly or through the proxy, and classifies the response into
//! articles or an error. It also provides the `news-search` command line tool.
//!
//! ## [`headliner-web`](../../headliner_web/index.html)
//!
//! The HTTP server. It hosts the news proxy, which attaches the credential to
//! requests from browsers, and the Dockerflow endpoints.
//!
//! ## [`headliner-integration-tests`](../../headliner_integration_tests/index.html)
//!
//! Starts the server against a mocked news service and tests it over HTTP.
