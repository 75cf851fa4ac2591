//! Terminal host state: control focus, blink phase and the last diagnostic.

use crate::engine::RefreshEngine;
use crate::model::Strategy;
use crate::runtime::Diagnostic;

/// How the attached card is currently refreshing, for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// No card attached.
    Detached,
    /// Attributes did not resolve; nothing is acquired.
    Misconfigured,
    /// Pull without a timer; only the manual trigger acquires.
    Manual,
    /// Recurring pull timer armed.
    Auto,
    /// Auto-refresh was stopped for this attach.
    Stopped,
    /// Push subscription open.
    Push,
    /// Push subscription ended.
    Disconnected,
}

impl RefreshMode {
    /// Mode of the attached engine, `Detached` without one.
    pub fn of(engine: Option<&RefreshEngine>) -> Self {
        let Some(engine) = engine else {
            return RefreshMode::Detached;
        };
        let Some(config) = engine.config() else {
            return RefreshMode::Misconfigured;
        };
        match config.strategy() {
            Strategy::Push if engine.subscription_open() => RefreshMode::Push,
            Strategy::Push => RefreshMode::Disconnected,
            Strategy::Pull if engine.timer_armed() => RefreshMode::Auto,
            Strategy::Pull if config.auto_refresh_enabled => RefreshMode::Stopped,
            Strategy::Pull => RefreshMode::Manual,
        }
    }

    /// Whether the mode is driven by something other than the user.
    pub fn is_active(self) -> bool {
        matches!(self, RefreshMode::Auto | RefreshMode::Push)
    }
}

/// Mutable UI state of the terminal host.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    focus: Option<usize>,
    blink_on: bool,
    last_diagnostic: Option<Diagnostic>,
}

impl HostState {
    /// No focus, blink on.
    pub fn new() -> Self {
        Self {
            blink_on: true,
            ..Self::default()
        }
    }

    /// Index of the focused control, if any.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Move focus forward through `count` controls, wrapping.
    pub fn focus_next(&mut self, count: usize) {
        self.focus = match (self.focus, count) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), n) => Some((i + 1) % n),
        };
    }

    /// Move focus backward through `count` controls, wrapping.
    pub fn focus_prev(&mut self, count: usize) {
        self.focus = match (self.focus, count) {
            (_, 0) => None,
            (None, n) => Some(n - 1),
            (Some(0), n) => Some(n - 1),
            (Some(i), n) => Some((i - 1).min(n - 1)),
        };
    }

    /// Drop focus that no longer points at a rendered control.
    pub fn clamp_focus(&mut self, count: usize) {
        if self.focus.is_some_and(|i| i >= count) {
            self.focus = None;
        }
    }

    /// Current blink phase.
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Advance the blink phase.
    pub fn toggle_blink(&mut self) {
        self.blink_on = !self.blink_on;
    }

    /// Remember the latest diagnostic for the status bar.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.last_diagnostic = Some(diagnostic);
    }

    /// Most recent diagnostic, if any.
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.last_diagnostic.as_ref()
    }

    /// Forget the last diagnostic.
    pub fn clear_diagnostic(&mut self) {
        self.last_diagnostic = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, AttributeMap};
    use crate::engine::Trigger;
    use crate::model::{DecodeError, TransportError};

    fn attached(pairs: &[(&str, &str)]) -> RefreshEngine {
        let mut engine = RefreshEngine::from_resolution(resolve(&AttributeMap::from_pairs(
            pairs.iter().copied(),
        )));
        engine.handle(Trigger::Attach);
        engine
    }

    #[test]
    fn focus_cycles_forward_and_back() {
        let mut state = HostState::new();
        assert_eq!(state.focus(), None);

        state.focus_next(2);
        assert_eq!(state.focus(), Some(0));
        state.focus_next(2);
        assert_eq!(state.focus(), Some(1));
        state.focus_next(2);
        assert_eq!(state.focus(), Some(0));

        state.focus_prev(2);
        assert_eq!(state.focus(), Some(1));
    }

    #[test]
    fn focus_prev_from_none_selects_last() {
        let mut state = HostState::new();
        state.focus_prev(3);
        assert_eq!(state.focus(), Some(2));
    }

    #[test]
    fn no_controls_means_no_focus() {
        let mut state = HostState::new();
        state.focus_next(1);
        state.focus_next(0);
        assert_eq!(state.focus(), None);
    }

    #[test]
    fn clamp_focus_drops_out_of_range_index() {
        let mut state = HostState::new();
        state.focus_prev(2);
        state.clamp_focus(1);
        assert_eq!(state.focus(), None);
    }

    #[test]
    fn blink_starts_on_and_toggles() {
        let mut state = HostState::new();
        assert!(state.blink_on());
        state.toggle_blink();
        assert!(!state.blink_on());
    }

    #[test]
    fn records_latest_diagnostic() {
        let mut state = HostState::new();
        state.record(Diagnostic::now(DecodeError::NotAnObject.into()));
        state.record(Diagnostic::now(
            TransportError::Closed {
                url: "u".to_string(),
            }
            .into(),
        ));

        assert!(matches!(
            state.last_diagnostic().map(|d| &d.error),
            Some(crate::model::WidgetError::Transport(_))
        ));
        state.clear_diagnostic();
        assert!(state.last_diagnostic().is_none());
    }

    #[test]
    fn refresh_mode_follows_engine() {
        assert_eq!(RefreshMode::of(None), RefreshMode::Detached);
        assert_eq!(RefreshMode::of(Some(&attached(&[]))), RefreshMode::Manual);
        assert_eq!(
            RefreshMode::of(Some(&attached(&[("refresh-interval", "-1")]))),
            RefreshMode::Misconfigured
        );
        assert_eq!(RefreshMode::of(Some(&attached(&[("sse", "1")]))), RefreshMode::Push);

        let mut auto = attached(&[("auto-refresh", "true")]);
        assert_eq!(RefreshMode::of(Some(&auto)), RefreshMode::Auto);
        auto.handle(Trigger::Stop);
        assert_eq!(RefreshMode::of(Some(&auto)), RefreshMode::Stopped);
    }

    #[test]
    fn push_mode_becomes_disconnected_after_stream_end() {
        let mut push = attached(&[("sse", "true")]);
        push.handle(Trigger::StreamEnded(
            TransportError::Closed {
                url: "u".to_string(),
            }
            .into(),
        ));
        assert_eq!(RefreshMode::of(Some(&push)), RefreshMode::Disconnected);
        assert!(!RefreshMode::Disconnected.is_active());
    }
}
