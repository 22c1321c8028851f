//! A wrapper for the upstream credential that keeps it out of logs.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// What a credential looks like whenever it is printed or serialized.
const REDACTED: &str = "[redacted]";

/// The credential used to authenticate with the upstream news provider.
///
/// The wrapped value is only reachable through [`ApiKey::expose`]. Every other
/// way of rendering it, including `Debug`, `Display`, and `Serialize`, prints a
/// placeholder instead.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential.
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// The raw credential, for placing in an outbound request header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the credential is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&REDACTED).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for ApiKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}
