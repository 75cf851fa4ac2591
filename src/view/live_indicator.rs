//! Refresh indicator widget for the status bar.
//!
//! Displays how the card refreshes:
//! - Blinking green `[AUTO]`/`[PUSH]` while a timer or subscription drives it
//! - Gray otherwise (manual, stopped, disconnected, misconfigured, detached)

use crate::state::RefreshMode;
use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Refresh indicator that renders based on [`RefreshMode`] and blink state.
///
/// # Design
///
/// This widget is pure and stateless. The blink phase is passed in by the
/// host's blink timer rather than tracked here.
///
/// # Examples
///
/// ```rust
/// use factcard::state::RefreshMode;
/// use factcard::view::live_indicator::LiveIndicator;
///
/// let visible = LiveIndicator::new(RefreshMode::Auto, true).render();
/// assert_eq!(visible.content, "[AUTO] ");
///
/// let hidden = LiveIndicator::new(RefreshMode::Auto, false).render();
/// assert_eq!(hidden.content, "");
/// ```
#[derive(Debug, Clone)]
pub struct LiveIndicator {
    mode: RefreshMode,
    blink_on: bool,
}

impl LiveIndicator {
    /// Indicator for `mode` in the given blink phase.
    pub fn new(mode: RefreshMode, blink_on: bool) -> Self {
        Self { mode, blink_on }
    }

    /// Label shown for a mode, including the trailing separator space.
    pub fn label(mode: RefreshMode) -> &'static str {
        match mode {
            RefreshMode::Detached => "[DETACHED] ",
            RefreshMode::Misconfigured => "[CONFIG ERROR] ",
            RefreshMode::Manual => "[MANUAL] ",
            RefreshMode::Auto => "[AUTO] ",
            RefreshMode::Stopped => "[STOPPED] ",
            RefreshMode::Push => "[PUSH] ",
            RefreshMode::Disconnected => "[DISCONNECTED] ",
        }
    }

    /// Render the indicator as a ratatui Span.
    ///
    /// Active modes alternate between green text and an empty span;
    /// misconfigured is red, everything else gray.
    pub fn render(&self) -> Span<'static> {
        let label = Self::label(self.mode);
        match self.mode {
            mode if mode.is_active() => {
                if self.blink_on {
                    Span::styled(label, Style::default().fg(Color::Green))
                } else {
                    Span::raw("")
                }
            }
            RefreshMode::Misconfigured => Span::styled(label, Style::default().fg(Color::Red)),
            _ => Span::styled(label, Style::default().fg(Color::Gray)),
        }
    }
}

#[cfg(test)]
#[path = "live_indicator_tests.rs"]
mod tests;
