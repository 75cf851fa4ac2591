//! In-process transports.
//!
//! [`ScriptedPull`] answers fetches from a queue of canned responses and
//! [`ScriptedPush`] delivers whatever a [`PushSender`] sends. Both are cheap
//! handles over shared state, so a caller can keep a clone to script and
//! inspect the transport while a fact card owns another.

use crate::model::TransportError;
use crate::source::{MessageStream, PullTransport, PushTransport};
use futures_util::stream::{self, StreamExt};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct PullScript {
    responses: VecDeque<Result<String, TransportError>>,
    last: Option<Result<String, TransportError>>,
    requests: Vec<String>,
    latency: Duration,
}

/// Pull transport answering from a script.
///
/// Responses are consumed in order; once the queue is empty the last
/// response repeats. With nothing scripted every fetch fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPull {
    script: Rc<RefCell<PullScript>>,
}

impl ScriptedPull {
    /// Transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that always answers with `body`.
    pub fn always(body: impl Into<String>) -> Self {
        let pull = Self::new();
        pull.push_ok(body);
        pull
    }

    /// Queue a successful response body.
    pub fn push_ok(&self, body: impl Into<String>) {
        self.script
            .borrow_mut()
            .responses
            .push_back(Ok(body.into()));
    }

    /// Queue a failed fetch.
    pub fn push_err(&self, err: TransportError) {
        self.script.borrow_mut().responses.push_back(Err(err));
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.script.borrow_mut().latency = latency;
    }

    /// URLs fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.script.borrow().requests.clone()
    }

    /// Number of fetches so far.
    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }
}

impl PullTransport for ScriptedPull {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let latency = {
            let mut script = self.script.borrow_mut();
            script.requests.push(url.to_string());
            script.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut script = self.script.borrow_mut();
        match script.responses.pop_front() {
            Some(response) => {
                script.last = Some(response.clone());
                response
            }
            None => script.last.clone().unwrap_or_else(|| {
                Err(TransportError::Request {
                    url: url.to_string(),
                    reason: "no scripted response".to_string(),
                })
            }),
        }
    }
}

type PushItem = Result<String, TransportError>;

#[derive(Debug, Default)]
struct PushScript {
    receiver: Option<mpsc::UnboundedReceiver<PushItem>>,
    subscriptions: Vec<String>,
}

/// Push transport fed by a [`PushSender`].
///
/// Accepts one subscription per sender; a second subscribe fails until
/// [`ScriptedPush::reconnect`] hands out a new sender.
#[derive(Debug, Clone)]
pub struct ScriptedPush {
    script: Rc<RefCell<PushScript>>,
}

/// Sending half of a [`ScriptedPush`].
#[derive(Debug, Clone)]
pub struct PushSender {
    tx: mpsc::UnboundedSender<PushItem>,
}

impl PushSender {
    /// Deliver one message. Returns `false` if the subscriber is gone.
    pub fn send(&self, message: impl Into<String>) -> bool {
        self.tx.send(Ok(message.into())).is_ok()
    }

    /// End the subscription with an error.
    pub fn fail(&self, err: TransportError) -> bool {
        self.tx.send(Err(err)).is_ok()
    }

    /// Whether a subscriber is still listening.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl ScriptedPush {
    /// Transport plus the sender feeding its first subscription.
    pub fn new() -> (Self, PushSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let script = PushScript {
            receiver: Some(rx),
            subscriptions: Vec::new(),
        };
        (
            Self {
                script: Rc::new(RefCell::new(script)),
            },
            PushSender { tx },
        )
    }

    /// Replace the channel so the next subscription succeeds.
    pub fn reconnect(&self) -> PushSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script.borrow_mut().receiver = Some(rx);
        PushSender { tx }
    }

    /// URLs subscribed to so far, in order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.script.borrow().subscriptions.clone()
    }
}

impl PushTransport for ScriptedPush {
    async fn subscribe(&self, url: &str) -> Result<MessageStream, TransportError> {
        let mut script = self.script.borrow_mut();
        script.subscriptions.push(url.to_string());
        let receiver = script.receiver.take().ok_or_else(|| TransportError::Request {
            url: url.to_string(),
            reason: "already subscribed".to_string(),
        })?;

        let url = url.to_string();
        let messages = stream::unfold(Some(receiver), move |receiver| {
            let url = url.clone();
            async move {
                let mut receiver = receiver?;
                match receiver.recv().await {
                    Some(Ok(message)) => Some((Ok(message), Some(receiver))),
                    Some(Err(err)) => Some((Err(err), None)),
                    None => Some((Err(TransportError::Closed { url }), None)),
                }
            }
        });
        Ok(messages.boxed_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_pull_repeats_last_response() {
        let pull = ScriptedPull::new();
        pull.push_ok("one");
        pull.push_ok("two");

        assert_eq!(pull.fetch("u").await, Ok("one".to_string()));
        assert_eq!(pull.fetch("u").await, Ok("two".to_string()));
        assert_eq!(pull.fetch("u").await, Ok("two".to_string()));
        assert_eq!(pull.request_count(), 3);
    }

    #[tokio::test]
    async fn unscripted_pull_fails() {
        let pull = ScriptedPull::new();
        assert!(matches!(
            pull.fetch("u").await,
            Err(TransportError::Request { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_response() {
        let pull = ScriptedPull::always("x");
        pull.set_latency(Duration::from_millis(300));

        let started = tokio::time::Instant::now();
        pull.fetch("u").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn scripted_push_delivers_then_closes() {
        let (push, sender) = ScriptedPush::new();
        let mut messages = push.subscribe("stream").await.unwrap();

        assert!(sender.send("hello"));
        drop(sender);

        assert_eq!(messages.next().await, Some(Ok("hello".to_string())));
        assert_eq!(
            messages.next().await,
            Some(Err(TransportError::Closed {
                url: "stream".to_string()
            }))
        );
        assert_eq!(messages.next().await, None);
    }

    #[tokio::test]
    async fn second_subscription_requires_reconnect() {
        let (push, _sender) = ScriptedPush::new();
        let _first = push.subscribe("s").await.unwrap();

        assert!(push.subscribe("s").await.is_err());
        let _sender = push.reconnect();
        assert!(push.subscribe("s").await.is_ok());
        assert_eq!(push.subscriptions().len(), 3);
    }
}
