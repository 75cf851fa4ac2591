//! Diagnostic reports emitted by an attached fact card.

use crate::model::WidgetError;
use chrono::{DateTime, Local};
use std::fmt;

/// One reported widget error with the time it was reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// When the error was reported.
    pub at: DateTime<Local>,
    /// What went wrong.
    pub error: WidgetError,
}

impl Diagnostic {
    /// Stamp `error` with the current local time.
    pub fn now(error: WidgetError) -> Self {
        Self {
            at: Local::now(),
            error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.error)
    }
}
