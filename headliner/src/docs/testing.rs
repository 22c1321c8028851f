//! # Testing strategies
//!
//! There are two testing strategies used in this repository: unit tests, and
//! integration tests.
//!
//! Unit tests appear close to the code they are testing. Tests that talk to
//! the news service use [httpmock](https://docs.rs/httpmock) instead, and
//! articles are generated with [fake](https://docs.rs/fake).
//!
//! Behaviors that involve the whole server, like the URLs it exposes or what
//! it logs, are tested in `headliner-integration-tests`, which starts an
//! instance of Headliner against a mocked news service.
//!
//! ```ignore
//! #[actix_rt::test]
//! async fn lbheartbeat_works() {
//!     headliner_test(
//!         |_| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/__lbheartbeat__")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!
//!             assert_eq!(response.status(), StatusCode::OK);
//!             assert_eq!(response.content_length(), Some(0));
//!         },
//!     )
//!     .await
//! }
//! ```
