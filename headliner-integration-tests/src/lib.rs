#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for Headliner that work by reading from the external API only.
//!
//! The proxy's URL and the shape of its responses are a public API that
//! browsers depend on, so the paths used in tests here are important details.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `headliner/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`headliner_test`], which mocks the news
//! service, starts the server against it, and provides helpers to inspect the
//! state of the app. It then calls the test function that is passed to it,
//! providing the above tools as an argument.
//!
//! ```ignore
//! use headliner_integration_tests::{headliner_test_macro, TestingTools};
//!
//! #[headliner_test_macro]
//! async fn lbheartbeat_works(TestingTools { test_client, .. }: TestingTools) {
//!    let response = test_client
//!        .get("/__lbheartbeat__")
//!        .send()
//!        .await
//!        .expect("failed to execute request");
//!
//!    assert_eq!(response.status(), StatusCode::OK);
//!    assert_eq!(response.content_length(), Some(0));
//! }
//! ```

mod client;
mod debug;
mod dockerflow;
mod general;
mod logging;
mod proxy;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    test_tools::{headliner_test, TestReqwestClient, TestingTools},
};

pub use headliner_integration_tests_macro::headliner_test as headliner_test_macro;
