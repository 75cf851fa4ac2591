//! Fetch lifecycle state and the fact payload.

use crate::model::error::WidgetError;
use std::fmt;

/// The single piece of text a fact card displays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact(String);

impl Fact {
    /// Wrap display text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The text as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current position in the acquisition lifecycle.
///
/// Exactly one value is live per attached widget. Transitions:
///
/// ```text
/// Idle ──attach/tick/push──▶ Loading ──ok──▶ Loaded(fact)
///                              │   ▲            │
///                              │   └──re-entry──┤
///                              └──err──▶ Failed(err)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    /// No acquisition has started yet.
    #[default]
    Idle,
    /// An acquisition (or push subscription) is in progress.
    Loading,
    /// The most recent acquisition produced this fact.
    Loaded(Fact),
    /// The most recent acquisition failed.
    Failed(WidgetError),
}

impl FetchState {
    /// Whether an acquisition is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Fact carried by a `Loaded` state.
    pub fn fact(&self) -> Option<&Fact> {
        match self {
            FetchState::Loaded(fact) => Some(fact),
            _ => None,
        }
    }
}

/// How facts are acquired, chosen once per attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One request per tick (attach, timer or manual trigger).
    Pull,
    /// Long-lived event stream; every message is a new fact.
    Push,
}

impl Strategy {
    /// Push when the `sse` attribute resolved to true, pull otherwise.
    pub fn from_push_mode(push_mode_enabled: bool) -> Self {
        if push_mode_enabled {
            Strategy::Push
        } else {
            Strategy::Pull
        }
    }
}
