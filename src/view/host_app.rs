//! Terminal host: attaches one fact card and runs the event loop (impure shell).

use crate::config::{KeyBindings, ResolvedConfig};
use crate::model::{AppError, KeyAction};
use crate::runtime::{CardEvent, CardEvents, Diagnostic, FactCard};
use crate::scene::Control;
use crate::source::{HttpTransport, PullTransport, PushTransport, TransportSettings};
use crate::state::{HostState, RefreshMode};
use crate::view::card_view;
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::task::LocalSet;
use tracing::{debug, info};

/// Blink period of the refresh indicator.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Terminal application hosting a single fact card.
///
/// Generic over backend to support testing with `TestBackend`.
pub struct HostApp<B, P, S>
where
    B: Backend,
{
    terminal: Terminal<B>,
    card: FactCard<P, S>,
    events: CardEvents,
    state: HostState,
    key_bindings: KeyBindings,
}

impl<B, P, S> HostApp<B, P, S>
where
    B: Backend,
    P: PullTransport + 'static,
    S: PushTransport + 'static,
{
    /// Host `card` in `terminal`. The card may already be attached.
    pub fn new(
        terminal: Terminal<B>,
        card: FactCard<P, S>,
        events: CardEvents,
        key_bindings: KeyBindings,
    ) -> Self {
        Self {
            terminal,
            card,
            events,
            state: HostState::new(),
            key_bindings,
        }
    }

    /// The hosted card.
    pub fn card(&self) -> &FactCard<P, S> {
        &self.card
    }

    /// Mutable access to the hosted card.
    pub fn card_mut(&mut self) -> &mut FactCard<P, S> {
        &mut self.card
    }

    /// Focus, blink and diagnostic state.
    pub fn state(&self) -> &HostState {
        &self.state
    }

    /// The terminal, for inspecting test backends.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Refresh mode shown by the status bar.
    pub fn refresh_mode(&self) -> RefreshMode {
        RefreshMode::of(self.card.engine())
    }

    /// Run until the user quits or the terminal event stream ends.
    ///
    /// Redraws only after input, card activity, or a blink while the
    /// indicator is active.
    pub async fn run(&mut self) -> Result<(), AppError> {
        let mut terminal_events = EventStream::new();
        let mut blink = tokio::time::interval(BLINK_INTERVAL);

        self.draw()?;

        loop {
            let dirty = tokio::select! {
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            break;
                        }
                        true
                    }
                    Some(Ok(Event::Resize(..))) => true,
                    Some(Ok(_)) => false,
                    Some(Err(e)) => return Err(AppError::Terminal(e)),
                    None => break,
                },
                Some(event) = self.events.events.recv() => {
                    self.on_card_event(event);
                    true
                }
                Some(diagnostic) = self.events.diagnostics.recv() => {
                    self.on_diagnostic(diagnostic);
                    true
                }
                _ = blink.tick() => {
                    self.state.toggle_blink();
                    self.refresh_mode().is_active()
                }
            };

            if dirty {
                self.draw()?;
            }
        }

        Ok(())
    }

    /// Handle a key press. Returns `true` when the host should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        let control_count = self.card.scene().controls().len();

        match action {
            KeyAction::FocusNext => self.state.focus_next(control_count),
            KeyAction::FocusPrev => self.state.focus_prev(control_count),
            KeyAction::ActivateFocused => {
                let controls = self.card.scene().controls();
                match self.state.focus().and_then(|i| controls.get(i)) {
                    Some((node, _)) => {
                        self.card.click(*node);
                    }
                    None => debug!("no control focused"),
                }
            }
            KeyAction::ManualRefresh => {
                if !self.card.click_control(Control::ManualTrigger) {
                    debug!("card has no manual trigger");
                }
            }
            KeyAction::StopRefresh => {
                if !self.card.click_control(Control::Stop) {
                    debug!("card has no stop control");
                }
            }
            KeyAction::Quit => {
                self.card.detach();
                return true;
            }
        }
        false
    }

    /// Forward a card event and drop focus from controls that went away.
    pub fn on_card_event(&mut self, event: CardEvent) {
        self.card.dispatch(event);
        self.state.clamp_focus(self.card.scene().controls().len());
    }

    /// Record a reported error.
    pub fn on_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.state.record(diagnostic);
    }

    /// Draw one frame.
    pub fn draw(&mut self) -> Result<(), AppError> {
        let mode = self.refresh_mode();
        let scene = self.card.scene();
        let state = &self.state;
        self.terminal
            .draw(|frame| card_view::render_screen(frame, scene, state, mode))?;
        Ok(())
    }
}

/// Attach a card over HTTP and run the terminal host until the user quits.
///
/// Logging must be initialized by the caller.
pub fn run_host(config: ResolvedConfig) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Runtime {
            reason: e.to_string(),
        })?;

    let transport = HttpTransport::new(&TransportSettings {
        request_timeout: config.request_timeout,
        user_agent: config.user_agent.clone(),
        credentials: config.credentials.clone(),
    })?;

    let local = LocalSet::new();
    local.block_on(&runtime, async move {
        let (card, events) = FactCard::new(transport.clone(), transport, &config.button_title);
        let terminal = setup_terminal()?;
        let mut app = HostApp::new(terminal, card, events, KeyBindings::default());

        app.card_mut().attach(&config.attributes);
        info!("host started");

        // Run the app and ensure cleanup happens even on error
        let result = app.run().await;
        app.card_mut().detach();
        restore_terminal()?;

        result
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Restore terminal to normal state.
fn restore_terminal() -> Result<(), AppError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "host_app_tests.rs"]
mod tests;
