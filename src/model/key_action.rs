//! Host-level keyboard actions independent of key bindings.

/// Actions the terminal host can perform on the attached fact card.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Move focus to the next rendered control. Default: Tab
    FocusNext,
    /// Move focus to the previous rendered control. Default: Shift+Tab
    FocusPrev,
    /// Click the focused control. Default: Enter/Space
    ActivateFocused,
    /// Click the manual trigger, if rendered. Default: r
    ManualRefresh,
    /// Click the stop control, if rendered. Default: s
    StopRefresh,
    /// Detach the widget and exit. Default: q/Esc/Ctrl+c
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_refresh_not_equals_stop() {
        assert_ne!(KeyAction::ManualRefresh, KeyAction::StopRefresh);
    }

    #[test]
    fn actions_are_copy() {
        let action = KeyAction::ActivateFocused;
        let copied = action;
        assert_eq!(action, copied);
    }
}
