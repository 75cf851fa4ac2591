//! Error types for the fact card widget.
//!
//! This module defines the widget's error taxonomy using `thiserror`. Every failure the
//! widget can hit while acquiring a fact falls into one of three families, wrapped by
//! [`WidgetError`] for reporting.
//!
//! # Error Hierarchy
//!
//! - [`WidgetError`] - Diagnostic payload reported by the refresh runtime
//!   - [`ConfigError`] - Attribute values that cannot form a valid `WidgetConfig`
//!   - [`TransportError`] - Network or connection failures (pull request or push stream)
//!   - [`DecodeError`] - Response body not parseable, or the response key is unusable
//! - [`AppError`] - Binary-level failures of the terminal host (config file, logging, terminal IO)
//!
//! # Error Recovery Strategy
//!
//! Widget errors are **never fatal**. They are caught at the refresh engine boundary,
//! logged through `tracing`, and forwarded on the diagnostics channel. The displayed fact
//! is left at its last good value and no extra retry is scheduled; the next tick (if any)
//! acquires again as usual.
//!
//! Host errors ([`AppError`]) are fatal and propagate to `main`.

use thiserror::Error;

/// Any failure reported by a fact card while it is attached.
///
/// Values of this type travel over the diagnostics channel and are stored in
/// [`FetchState::Failed`](crate::model::FetchState::Failed). They are cheap to clone
/// so the same error can be logged, stored and forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Attribute snapshot could not be resolved into a configuration.
    ///
    /// **Recovery**: the widget renders its card but never acquires data for this attach.
    /// The host can fix the attributes and re-attach.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request or subscription failed at the network level.
    ///
    /// **Recovery**: keep the last good fact; the next tick tries again.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response arrived but did not contain a usable fact.
    ///
    /// **Recovery**: keep the last good fact; the next tick tries again.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Attribute values rejected by the configuration resolver.
///
/// # Examples
///
/// ```
/// use factcard::model::error::ConfigError;
///
/// let err = ConfigError::InvalidRefreshInterval { value: "soon".to_string() };
/// assert!(err.to_string().contains("soon"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `refresh-interval` is not a positive integer number of milliseconds.
    ///
    /// Covers non-numeric text, zero, negative numbers and values that overflow `u64`.
    /// The raw attribute value is kept for the diagnostic message.
    #[error("refresh-interval must be a positive integer of milliseconds, got {value:?}")]
    InvalidRefreshInterval {
        /// Raw attribute value as supplied by the host.
        value: String,
    },
}

/// Network-level failures of the pull or push transport.
///
/// Reasons are carried as strings rather than wrapping `reqwest::Error`, so the error
/// stays `Clone` and transports other than reqwest (test doubles included) can report
/// the same variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Source URL of the request.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The server answered with a non-success status code.
    #[error("request to {url} returned status {status}")]
    Status {
        /// Source URL of the request.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The push subscription failed while reading the event stream.
    #[error("event stream from {url} failed: {reason}")]
    Stream {
        /// Stream URL.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The HTTP client could not be constructed from the host settings.
    #[error("HTTP client could not be built: {reason}")]
    Client {
        /// Underlying failure description.
        reason: String,
    },

    /// The push subscription was closed by the server.
    ///
    /// No reconnection is attempted.
    #[error("event stream from {url} closed")]
    Closed {
        /// Stream URL.
        url: String,
    },
}

/// Failures turning a pull response body into display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("response is not valid JSON: {reason}")]
    InvalidJson {
        /// Parser error message.
        reason: String,
    },

    /// The body is valid JSON but not an object, so no key can be looked up.
    #[error("response is not a JSON object")]
    NotAnObject,

    /// The response object has no field with the configured key.
    #[error("response has no field {key:?}")]
    MissingKey {
        /// The configured response key.
        key: String,
    },

    /// The field exists but holds null, an array or an object.
    #[error("response field {key:?} is not text")]
    NotText {
        /// The configured response key.
        key: String,
    },
}

/// Top-level error of the terminal host binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Host configuration file could not be loaded.
    #[error("Failed to load configuration: {0}")]
    ConfigFile(#[from] crate::config::ConfigFileError),

    /// Tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// HTTP transport could not be constructed.
    #[error("Failed to set up transport: {0}")]
    Transport(#[from] TransportError),

    /// Terminal setup, rendering or event reading failed.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Async runtime could not be built.
    #[error("Failed to start runtime: {reason}")]
    Runtime {
        /// Underlying failure description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_error_wraps_each_family_via_from() {
        let config: WidgetError = ConfigError::InvalidRefreshInterval {
            value: "abc".to_string(),
        }
        .into();
        let transport: WidgetError = TransportError::Closed {
            url: "http://x".to_string(),
        }
        .into();
        let decode: WidgetError = DecodeError::NotAnObject.into();

        assert!(matches!(config, WidgetError::Config(_)));
        assert!(matches!(transport, WidgetError::Transport(_)));
        assert!(matches!(decode, WidgetError::Decode(_)));
    }

    #[test]
    fn status_error_message_names_url_and_code() {
        let err = TransportError::Status {
            url: "https://catfact.ninja/fact".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("catfact.ninja"), "got: {}", msg);
        assert!(msg.contains("503"), "got: {}", msg);
    }

    #[test]
    fn missing_key_message_quotes_key() {
        let err = DecodeError::MissingKey {
            key: "fact".to_string(),
        };
        assert_eq!(err.to_string(), "response has no field \"fact\"");
    }

    #[test]
    fn widget_error_display_prefixes_family() {
        let err = WidgetError::from(DecodeError::NotAnObject);
        assert_eq!(err.to_string(), "decode error: response is not a JSON object");
    }
}
