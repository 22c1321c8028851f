//! # Developer documentation for working on Headliner
//!
//! ## tl;dr
//!
//! Run the main app
//! ```shell
//! $ NEWS_API_KEY=... cargo run -p headliner
//! ```
//!
//! Search from the command line
//! ```shell
//! $ NEWS_API_KEY=... cargo run -p headliner-news --bin news-search -- rust
//! ```
//!
//! Run specific tests for one crate
//! ```shell
//! $ cargo test -p headliner-integration-tests -- proxy
//! ```
//!
//! ## Local configuration
//!
//! The default configuration of Headliner is development, which has
//! human-oriented logging. For settings that you wish to change, you have
//! three options.
//!
//! > For full details, make sure to check out the documentation for
//! > `headliner_settings`.
//!
//! ### Update the defaults
//!
//! If the change makes the system better for most development tasks, add it
//! to `config/development.yaml`. `config/base.yaml` defines every setting. It
//! is not suitable to put secrets in either file.
//!
//! ### Create a local override
//!
//! Machine specific changes go in `config/local.yaml`, which is ignored by
//! git. This is a safe place for the news service credential:
//!
//! ```yaml
//! upstream:
//!   api_key: "..."
//! ```
//!
//! ### Use the environment
//!
//! Any setting can be set with an environment variable, such as
//! `HEADLINER_HTTP__LISTEN=0.0.0.0:80`. The credential can also be given as
//! `NEWS_API_KEY`, which takes precedence over everything else.
//!
//! > None of the above overrides are used in tests. To configure the test
//! > environment, edit `config/test.yaml` or create `config/local_test.yaml`.
