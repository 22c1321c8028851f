#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Headliner Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `HEADLINER_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration and secrets if desired.
//! 4. Environment variables that begin with `HEADLINER_` and have a separator
//!    for `__`. For example, `Settings::http::workers` can be controlled from
//!    the environment variable `HEADLINER_HTTP__WORKERS`.
//! 5. The news API credential may also be given as `NEWS_API_KEY`, the name
//!    most deployments of the upstream provider already use. It takes
//!    precedence over every other source.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format supported
//! by the [config] crate can be used, including JSON and TOML. To choose another
//! format, simply use a different extension for your file, like
//! `config/local.toml`.

mod logging;
mod secret;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};
pub use secret::ApiKey;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::{net::SocketAddr, time::Duration};
use thiserror::Error;
use url::Url;

/// The environment variable conventionally used to hold the upstream credential.
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";

/// Top level settings object for Headliner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Headliner is running in. Should only be set with the
    /// `HEADLINER_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// URL to redirect to from the root of the service, if any.
    pub public_documentation: Option<Url>,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// How to reach the upstream news provider.
    pub upstream: UpstreamSettings,

    /// Settings for the server side proxy endpoint.
    pub proxy: ProxySettings,

    /// Settings for library consumers that search for news.
    pub client: ClientSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for the upstream news provider.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the provider, such as `https://newsapi.org`. Requests go to
    /// `${base_url}/v2/${endpoint}`.
    pub base_url: Url,

    /// The credential sent as `X-Api-Key`. Only ever held server side, or in a
    /// trusted local context.
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// How long to wait while establishing a connection to the provider. No
    /// limit is placed on the request as a whole.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// User-Agent sent to the provider, which rejects anonymous clients.
    pub user_agent: String,
}

impl UpstreamSettings {
    /// The configured credential.
    ///
    /// # Errors
    /// [`SettingsError::MissingCredential`] if no credential was configured,
    /// or if it is blank.
    pub fn api_key(&self) -> Result<&ApiKey, SettingsError> {
        self.api_key
            .as_ref()
            .filter(|key| !key.is_blank())
            .ok_or(SettingsError::MissingCredential)
    }
}

/// Settings for the proxy endpoint served by `headliner-web`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxySettings {
    /// The path the proxy is served at, such as `/api/news`.
    pub path: String,
}

/// Settings for consumers of the news client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Which transport to use to reach the provider.
    pub transport: TransportKind,

    /// Where the proxy lives, used by [`TransportKind::Proxied`].
    pub proxy_url: Url,
}

/// The ways a client can reach the upstream provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Talk to the provider directly, sending the credential. Only suitable
    /// where the credential can be safely held.
    Direct,

    /// Talk to the Headliner proxy, which attaches the credential itself.
    Proxied,
}

/// Errors produced while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration sources could not be read or did not deserialize.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// No upstream credential is available.
    #[error(
        "No news API credential is configured. Set HEADLINER_UPSTREAM__API_KEY or NEWS_API_KEY."
    )]
    MissingCredential,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, SettingsError> {
        let headliner_env =
            std::env::var("HEADLINER_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .set_override("env", headliner_env.as_str())?
            .add_source(File::with_name(&format!("config/{}", headliner_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "HEADLINER_" and have
            // "__" to separate levels. For example, `HEADLINER_HTTP__LISTEN`
            // maps to `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("HEADLINER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("upstream.api_key", std::env::var(NEWS_API_KEY_VAR).ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` is applied to the loaded settings before they are returned.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let config = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("../config/base"))
            // Merge in test specific config.
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .build()
            .expect("Could not load settings for tests");

        let mut settings = config
            .try_deserialize()
            .expect("Could not convert settings");
        changer(&mut settings);
        settings
    }

    /// Whether a usable upstream credential is present.
    pub fn api_key_configured(&self) -> bool {
        self.upstream.api_key().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests(|_| ());
        assert_eq!(settings.env, "test");
        assert_eq!(settings.proxy.path, "/api/news");
        assert_eq!(settings.client.transport, TransportKind::Direct);
        assert!(settings.api_key_configured());
    }

    #[test]
    fn changer_is_applied() {
        let settings = Settings::load_for_tests(|settings| settings.upstream.api_key = None);
        assert!(matches!(
            settings.upstream.api_key(),
            Err(SettingsError::MissingCredential)
        ));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let settings = Settings::load_for_tests(|settings| {
            settings.upstream.api_key = Some(ApiKey::new("   "));
        });
        assert!(matches!(
            settings.upstream.api_key(),
            Err(SettingsError::MissingCredential)
        ));
    }

    #[test]
    fn serialized_settings_do_not_contain_the_credential() {
        let settings = Settings::load_for_tests(|settings| {
            settings.upstream.api_key = Some(ApiKey::new("super-secret-value"));
        });
        let serialized = serde_json::to_string(&settings).expect("settings serialize");
        assert!(!serialized.contains("super-secret-value"));
        let debugged = format!("{:?}", settings);
        assert!(!debugged.contains("super-secret-value"));
    }
}
