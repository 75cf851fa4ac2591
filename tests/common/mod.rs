//! Shared helpers for fact card integration tests.

#![allow(dead_code)]

use factcard::config::AttributeMap;
use factcard::runtime::{CardEvents, FactCard};
use factcard::source::{PushSender, ScriptedPull, ScriptedPush};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

pub type TestCard = FactCard<ScriptedPull, ScriptedPush>;

pub const CAT_FACT: &str = r#"{"fact":"cats sleep a lot","length":16}"#;

pub fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
    AttributeMap::from_pairs(pairs.iter().copied())
}

/// Detached card over scripted transports.
pub fn card_with(pull: &ScriptedPull) -> (TestCard, CardEvents, PushSender) {
    let (push, sender) = ScriptedPush::new();
    let (card, events) = FactCard::new(pull.clone(), push, "Next fact");
    (card, events, sender)
}

/// Deliver card events until `duration` of (paused) time has passed.
pub async fn pump(card: &mut TestCard, events: &mut CardEvents, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        tokio::select! {
            biased;
            Some(event) = events.events.recv() => card.dispatch(event),
            _ = sleep_until(deadline) => break,
        }
    }
}
