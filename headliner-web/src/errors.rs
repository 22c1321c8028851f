//! Any errors that headliner-web might generate, and supporting implementations.

use std::error::Error;
use std::fmt;

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use backtrace::Backtrace;
use headliner_news::{ErrorKind, NewsError, PROXY_ERROR_HEADER};
use serde::Serialize;
use thiserror::Error;

/// The methods the proxy answers to.
pub(crate) const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// The Standard Error for most of Headliner
pub struct HandlerError {
    /// The wrapped error value.
    kind: HandlerErrorKind,
    /// The backtrace related to the wrapped error.
    pub(crate) backtrace: Backtrace,
}

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// A generic error, when there is nothing more specific to say.
    #[error("Internal error")]
    Internal,

    /// The proxy was asked for an endpoint it does not forward to.
    #[error("{0}")]
    UnknownEndpoint(String),

    /// The proxy only answers `GET` and `OPTIONS`.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The provider could not be reached. The details stay in the logs.
    #[error("Unable to reach the news service. Please check your connection.")]
    Network(#[source] NewsError),

    /// The request to the provider failed for any other reason. The details
    /// stay in the logs.
    #[error("Internal error")]
    Upstream(#[source] NewsError),
}

impl HandlerErrorKind {
    /// Convert the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal | Self::Network(_) | Self::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::UnknownEndpoint(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// A stable, machine-readable name for the error.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Internal => ErrorKind::Unknown.as_str(),
            Self::UnknownEndpoint(_) => ErrorKind::UnknownEndpoint.as_str(),
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Network(error) | Self::Upstream(error) => error.kind().as_str(),
        }
    }
}

impl From<NewsError> for HandlerErrorKind {
    fn from(error: NewsError) -> Self {
        match error {
            NewsError::UnknownEndpoint(_) => Self::UnknownEndpoint(error.to_string()),
            NewsError::Network(_) => Self::Network(error),
            other => Self::Upstream(other),
        }
    }
}

impl HandlerError {
    /// Access the wrapped error.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    /// Get an `HandlerError` representing an `Internal` error.
    pub fn internal() -> Self {
        HandlerErrorKind::Internal.into()
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<T> From<T> for HandlerError
where
    HandlerErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        HandlerError {
            kind: HandlerErrorKind::from(item),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Format the name of this debug struct as `HandlerError/<error name>`
        // so that log searches can group errors by kind.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

/// The body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// A human readable description.
    error: String,
    /// A machine readable classification.
    kind: &'static str,
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        response.insert_header((PROXY_ERROR_HEADER, self.kind().name()));
        if let HandlerErrorKind::MethodNotAllowed = self.kind() {
            response.insert_header((header::ALLOW, ALLOWED_METHODS));
        }
        response.json(ErrorBody {
            error: self.kind().to_string(),
            kind: self.kind().name(),
        })
    }
}
