#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! News search for [Headliner](../headliner/index.html).
//!
//! A [`SearchRequest`] describes what the user asked for. It is turned into an
//! [`UpstreamQuery`], sent by a [`NewsTransport`], and the raw response is
//! classified by [`normalize`] into a list of [`Article`]s or a [`NewsError`].
//!
//! There are two transports. [`DirectTransport`] talks to the provider and
//! carries the credential, so it must only be used where the credential can be
//! held safely. [`ProxiedTransport`] talks to `headliner-web` instead, which
//! attaches the credential server side. Both send the same logical request and
//! their responses are normalized identically.

mod article;
mod client;
mod request;
mod transports;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use headliner_settings::SettingsError;
use thiserror::Error;

pub use crate::article::{normalize, upstream_body, Article, UPSTREAM_FALLBACK_MESSAGE};
pub use crate::client::NewsClient;
pub use crate::request::{Endpoint, ProxyQuery, SearchMode, SearchRequest, UpstreamQuery};
pub use crate::transports::{
    DirectTransport, ProxiedTransport, UpstreamResponse, API_KEY_HEADER, PROXY_ERROR_HEADER,
};

/// A way of delivering an [`UpstreamQuery`] to the news provider.
#[async_trait]
pub trait NewsTransport: Send + Sync {
    /// An operator-visible name for this transport.
    fn name(&self) -> String;

    /// Perform exactly one request for `query` and return the raw response.
    ///
    /// Non-2xx statuses are not errors at this level. Only failures to perform
    /// the call are.
    async fn send(&self, query: &UpstreamQuery) -> Result<UpstreamResponse, NewsError>;
}

/// Errors that may occur while setting up a transport.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SetupError {
    #[error("This news transport cannot be used with the current Headliner configuration")]
    InvalidConfiguration(#[source] anyhow::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("There was a network error while setting up this news transport")]
    Network(#[source] anyhow::Error),
}

/// Errors that may occur while searching for news.
///
/// The `Display` form of each error is a message suitable to show a user. Use
/// [`NewsError::kind`] to decide how to react to an error.
#[derive(Debug, Error)]
pub enum NewsError {
    /// The request was rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The provider rejected the credential.
    #[error("Invalid API key. Please check your configuration.")]
    InvalidCredential,

    /// The provider is rate limiting requests.
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// The provider answered with an error of its own.
    #[error("{message}")]
    Upstream {
        /// The HTTP status of the response.
        status: u16,
        /// The status text, or the message the provider gave.
        message: String,
    },

    /// The request could not be performed at all.
    #[error("Unable to reach the news service. Please check your connection.")]
    Network(#[source] anyhow::Error),

    /// The proxy does not know the requested endpoint.
    #[error("Unknown endpoint {0:?}. Expected one of \"top-headlines\" or \"everything\".")]
    UnknownEndpoint(String),

    /// Anything that could not be classified more precisely.
    #[error(transparent)]
    Unknown(anyhow::Error),
}

impl NewsError {
    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Network(_) => ErrorKind::Network,
            Self::UnknownEndpoint(_) => ErrorKind::UnknownEndpoint,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

/// The classification of a [`NewsError`], without any details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum ErrorKind {
    Validation,
    InvalidCredential,
    RateLimited,
    Upstream,
    Network,
    UnknownEndpoint,
    Unknown,
}

impl ErrorKind {
    /// A stable, machine-readable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::InvalidCredential => "invalid_credential",
            Self::RateLimited => "rate_limited",
            Self::Upstream => "upstream_error",
            Self::Network => "network_error",
            Self::UnknownEndpoint => "unknown_endpoint",
            Self::Unknown => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "validation_error" => Self::Validation,
            "invalid_credential" => Self::InvalidCredential,
            "rate_limited" => Self::RateLimited,
            "upstream_error" => Self::Upstream,
            "network_error" => Self::Network,
            "unknown_endpoint" => Self::UnknownEndpoint,
            "unknown_error" => Self::Unknown,
            _ => anyhow::bail!("unknown error kind {:?}", s),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_names_round_trip() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::InvalidCredential,
            ErrorKind::RateLimited,
            ErrorKind::Upstream,
            ErrorKind::Network,
            ErrorKind::UnknownEndpoint,
            ErrorKind::Unknown,
        ] {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
        }
        assert!("teapot".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn unknown_errors_are_displayed_unchanged() {
        let error = NewsError::Unknown(anyhow::anyhow!("something odd"));
        assert_eq!(error.to_string(), "something odd");
        assert_eq!(error.kind(), ErrorKind::Unknown);
    }
}
