//! Opaque credentials passed through to the transports.

use serde::Deserialize;
use std::fmt;

/// `Authorization` header value.
///
/// `Debug` never prints the value, so configs and settings holding one can
/// be logged with `?`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    /// Wrap a raw header value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw header value, for the request itself only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}
