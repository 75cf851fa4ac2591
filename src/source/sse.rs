//! Server-Sent Events framing.
//!
//! [`EventParser`] turns raw bytes into message payloads following the
//! `text/event-stream` rules: lines end in LF, CRLF or CR; `data` lines
//! accumulate and are joined with `\n`; a blank line dispatches; lines
//! starting with `:` are comments. Only unnamed events (or events named
//! `message`) are delivered. An event whose buffered bytes exceed the
//! parser's limit is an error, so a server that never terminates a line
//! cannot grow memory without bound.
//!
//! [`messages`] adapts a byte stream into a stream of payloads that ends with
//! a [`TransportError`] when the connection fails or closes.

use crate::model::TransportError;
use futures_util::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use thiserror::Error;
use tracing::debug;

/// Upper bound on the bytes buffered for one event (current line plus data).
pub const DEFAULT_MAX_EVENT_BYTES: usize = 1024 * 1024;

/// An event grew past the parser's limit before it was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event exceeds {limit} bytes without being dispatched")]
pub struct EventTooLarge {
    /// Configured limit in bytes.
    pub limit: usize,
}

/// Incremental `text/event-stream` parser.
#[derive(Debug)]
pub struct EventParser {
    line: Vec<u8>,
    skip_lf: bool,
    data: Vec<String>,
    data_bytes: usize,
    event: Option<String>,
    max_event_bytes: usize,
}

impl Default for EventParser {
    fn default() -> Self {
        Self::with_max_event_bytes(DEFAULT_MAX_EVENT_BYTES)
    }
}

impl EventParser {
    /// Parser with the [`DEFAULT_MAX_EVENT_BYTES`] limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that rejects events buffering more than `limit` bytes.
    pub fn with_max_event_bytes(limit: usize) -> Self {
        Self {
            line: Vec::new(),
            skip_lf: false,
            data: Vec::new(),
            data_bytes: 0,
            event: None,
            max_event_bytes: limit,
        }
    }

    /// Feed a chunk of bytes and return every message completed by it.
    ///
    /// Chunks may split lines and multi-byte characters anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`EventTooLarge`] once the pending event outgrows the limit.
    /// The parser should not be fed again afterwards.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, EventTooLarge> {
        let mut out = Vec::new();
        for &byte in chunk {
            if std::mem::take(&mut self.skip_lf) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\n' => self.end_line(&mut out),
                b'\r' => {
                    self.end_line(&mut out);
                    self.skip_lf = true;
                }
                _ => {
                    if self.line.len() + self.data_bytes >= self.max_event_bytes {
                        return Err(EventTooLarge {
                            limit: self.max_event_bytes,
                        });
                    }
                    self.line.push(byte);
                }
            }
        }
        Ok(out)
    }

    fn end_line(&mut self, out: &mut Vec<String>) {
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);
        if let Some(message) = self.process_line(&line) {
            out.push(message);
        }
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data_bytes += value.len();
                self.data.push(value.to_string());
            }
            "event" => self.event = Some(value.to_string()),
            // Reconnection is not supported, so `id` and `retry` carry nothing.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        self.data_bytes = 0;
        let data = std::mem::take(&mut self.data).join("\n");
        match event.as_deref() {
            None | Some("") | Some("message") => Some(data),
            Some(other) => {
                debug!(event = other, "ignoring named event");
                None
            }
        }
    }
}

struct MessageState<S> {
    bytes: Pin<Box<S>>,
    parser: EventParser,
    ready: VecDeque<String>,
    url: String,
    finished: bool,
}

/// Adapt a byte stream into SSE message payloads.
///
/// The returned stream yields `Ok(payload)` per message, then exactly one
/// error: [`TransportError::Stream`] if reading failed or an event outgrew
/// the parser's limit, or [`TransportError::Closed`] if the server ended
/// the stream.
pub fn messages<S, B, E>(bytes: S, url: String) -> impl Stream<Item = Result<String, TransportError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    messages_with_parser(bytes, url, EventParser::new())
}

/// [`messages`] with a caller-supplied parser, e.g. a smaller event limit.
pub fn messages_with_parser<S, B, E>(
    bytes: S,
    url: String,
    parser: EventParser,
) -> impl Stream<Item = Result<String, TransportError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = MessageState {
        bytes: Box::pin(bytes),
        parser,
        ready: VecDeque::new(),
        url,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(message) = state.ready.pop_front() {
                return Some((Ok(message), state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.parser.feed(chunk.as_ref()) {
                    Ok(completed) => state.ready.extend(completed),
                    Err(e) => {
                        state.finished = true;
                        let err = TransportError::Stream {
                            url: state.url.clone(),
                            reason: e.to_string(),
                        };
                        return Some((Err(err), state));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    let err = TransportError::Stream {
                        url: state.url.clone(),
                        reason: e.to_string(),
                    };
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    let err = TransportError::Closed {
                        url: state.url.clone(),
                    };
                    return Some((Err(err), state));
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
