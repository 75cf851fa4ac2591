//! Fact sources.
//!
//! This module provides the transports a fact card acquires data through:
//! - [`PullTransport`]: one request per acquisition, body decoded by key
//! - [`PushTransport`]: a long-lived subscription, every message is a fact
//! - [`HttpTransport`]: both, over HTTP with `reqwest` (GET and Server-Sent Events)
//! - [`memory`]: scripted in-process transports for embedding and tests
//!
//! Transports are driven from a single-threaded `LocalSet`, so their futures
//! are not required to be `Send`.

use crate::model::{Credentials, Fact, TransportError, WidgetError};
use futures_util::stream::LocalBoxStream;
use std::future::Future;
use std::time::Duration;

pub mod decode;
pub mod http;
pub mod memory;
pub mod sse;

pub use decode::extract_fact;
pub use http::HttpTransport;
pub use memory::{PushSender, ScriptedPull, ScriptedPush};
pub use sse::EventParser;

/// Stream of push message payloads.
///
/// Ends after yielding one error describing why the subscription stopped.
pub type MessageStream = LocalBoxStream<'static, Result<String, TransportError>>;

/// Request/response acquisition.
pub trait PullTransport {
    /// Fetch the raw body at `url`.
    ///
    /// Non-success statuses are [`TransportError::Status`].
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, TransportError>>;
}

/// Subscription-based acquisition.
pub trait PushTransport {
    /// Open a subscription to `url`.
    fn subscribe(&self, url: &str) -> impl Future<Output = Result<MessageStream, TransportError>>;
}

/// Settings shared by both HTTP transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Upper bound on a whole pull request. Not applied to push streams.
    pub request_timeout: Duration,
    /// `User-Agent` header for both clients.
    pub user_agent: String,
    /// Opaque `Authorization` header value.
    pub credentials: Option<Credentials>,
}

/// Perform one pull acquisition: fetch, then extract `key`.
pub async fn acquire<P: PullTransport>(
    transport: &P,
    url: &str,
    key: &str,
) -> Result<Fact, WidgetError> {
    let body = transport.fetch(url).await?;
    Ok(extract_fact(&body, key)?)
}
