//! Fact card runtime: executes refresh engine effects (impure shell).
//!
//! [`FactCard`] wires a [`RefreshEngine`] to real resources: the render sink,
//! a tokio timer, spawned pull acquisitions and the push subscription.
//! Everything runs on one thread inside a `tokio::task::LocalSet`; spawned
//! tasks report back through [`CardEvents`], and the host feeds each event to
//! [`FactCard::dispatch`].
//!
//! Events carry the attach generation they were produced under, so results
//! from a previous attach are dropped after a re-attach.

use crate::config::attributes::ATTR_COLOR;
use crate::config::{resolve, AttributeMap};
use crate::engine::{Effect, RefreshEngine, Trigger};
use crate::model::{FetchState, WidgetError};
use crate::scene::{Control, NodeId, Scene};
use crate::source::{acquire, PullTransport, PushTransport};
use crate::view::render_sink::{CardLayout, RenderSink};
use futures_util::StreamExt;
use std::rc::Rc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub mod diagnostics;
pub mod timer;

pub use diagnostics::Diagnostic;
pub use timer::{TaskGuard, TimerHandle};

/// A trigger produced by a background task of one attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEvent {
    generation: u64,
    trigger: Trigger,
}

impl CardEvent {
    /// The engine input this event carries.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }
}

/// Receiving ends handed to the host when a card is created.
#[derive(Debug)]
pub struct CardEvents {
    /// Results of acquisitions, ticks and push messages. Feed to [`FactCard::dispatch`].
    pub events: mpsc::UnboundedReceiver<CardEvent>,
    /// Every error the card reports.
    pub diagnostics: mpsc::UnboundedReceiver<Diagnostic>,
}

/// Per-attach resources. Dropping a session aborts its timer and subscription.
#[derive(Debug)]
struct Session {
    generation: u64,
    engine: RefreshEngine,
    timer: Option<TimerHandle>,
    subscription: Option<TaskGuard>,
}

/// A fact card widget bound to a pull and a push transport.
pub struct FactCard<P, S> {
    pull: Rc<P>,
    push: Rc<S>,
    sink: RenderSink,
    session: Option<Session>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<CardEvent>,
    diagnostics_tx: mpsc::UnboundedSender<Diagnostic>,
}

impl<P, S> std::fmt::Debug for FactCard<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactCard")
            .field("session", &self.session)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<P, S> FactCard<P, S>
where
    P: PullTransport + 'static,
    S: PushTransport + 'static,
{
    /// Create a detached card.
    ///
    /// `button_title` is the page content offered to the manual trigger slot.
    pub fn new(pull: P, push: S, button_title: &str) -> (Self, CardEvents) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (diagnostics_tx, diagnostics) = mpsc::unbounded_channel();

        let mut sink = RenderSink::new();
        if let Err(e) = sink.set_button_title(button_title) {
            warn!(error = %e, "could not set button title");
        }

        let card = Self {
            pull: Rc::new(pull),
            push: Rc::new(push),
            sink,
            session: None,
            generation: 0,
            events_tx,
            diagnostics_tx,
        };
        (card, CardEvents { events, diagnostics })
    }

    /// Attach the card with an attribute snapshot.
    ///
    /// Resolves the configuration, builds the card and performs the initial
    /// acquisition (or opens the subscription). Must run inside a `LocalSet`.
    /// Attaching an already attached card does nothing.
    pub fn attach(&mut self, attributes: &AttributeMap) {
        if self.session.is_some() {
            debug!("attach ignored, card already attached");
            return;
        }

        let resolution = resolve(attributes);
        let layout = match &resolution {
            Ok(config) => CardLayout::for_config(config),
            Err(_) => CardLayout::inert(attributes.get(ATTR_COLOR).map(str::to_string)),
        };
        if let Err(e) = self.sink.build(&layout) {
            warn!(error = %e, "could not build card");
        }

        self.generation += 1;
        self.session = Some(Session {
            generation: self.generation,
            engine: RefreshEngine::from_resolution(resolution),
            timer: None,
            subscription: None,
        });
        self.handle(Trigger::Attach);
    }

    /// Detach the card: stop the timer, close the subscription and dispose
    /// the surface. In-flight pulls finish but their results are dropped.
    pub fn detach(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.handle(Trigger::Detach);
        self.session = None;
        self.sink.teardown();
    }

    /// Feed an event produced by one of this card's background tasks.
    pub fn dispatch(&mut self, event: CardEvent) {
        let current = self.session.as_ref().map(|s| s.generation);
        if current == Some(event.generation) {
            self.handle(event.trigger);
        } else {
            debug!(generation = event.generation, "dropping event from stale attach");
        }
    }

    /// Click a scene node; the click bubbles to the nearest control.
    ///
    /// Returns the control that handled the click.
    pub fn click(&mut self, node: NodeId) -> Option<Control> {
        let control = self.sink.scene().click(node)?;
        self.activate(control);
        Some(control)
    }

    /// Click the first rendered control of the given kind.
    ///
    /// Returns `false` when the card has no such control.
    pub fn click_control(&mut self, control: Control) -> bool {
        let node = self
            .sink
            .scene()
            .controls()
            .into_iter()
            .find_map(|(node, c)| (c == control).then_some(node));
        match node {
            Some(node) => self.click(node).is_some(),
            None => false,
        }
    }

    /// Stop auto-refresh. Idempotent; there is no restart within one attach.
    pub fn stop_auto_refresh(&mut self) {
        self.handle(Trigger::Stop);
    }

    /// Perform one pull acquisition, as the manual trigger does.
    pub fn refresh_now(&mut self) {
        self.handle(Trigger::ManualTrigger);
    }

    /// The card's scene, for drawing and hit testing.
    pub fn scene(&self) -> &Scene {
        self.sink.scene()
    }

    /// Text of the fact region, `None` when no card is built.
    pub fn displayed_text(&self) -> Option<String> {
        self.sink.displayed_text()
    }

    /// Whether a session is live.
    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Fetch state of the current attach.
    pub fn fetch_state(&self) -> Option<&FetchState> {
        self.session.as_ref().map(|s| s.engine.state())
    }

    /// Engine of the current attach.
    pub fn engine(&self) -> Option<&RefreshEngine> {
        self.session.as_ref().map(|s| &s.engine)
    }

    /// Whether the recurring timer task is currently owned by the card.
    pub fn timer_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.timer.is_some())
    }

    /// Whether the push subscription task is still alive.
    pub fn subscription_running(&self) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.subscription.as_ref())
            .is_some_and(|guard| !guard.is_finished())
    }

    fn activate(&mut self, control: Control) {
        match control {
            Control::ManualTrigger => self.handle(Trigger::ManualTrigger),
            Control::Stop => self.handle(Trigger::Stop),
        }
    }

    fn handle(&mut self, trigger: Trigger) {
        let effects = match self.session.as_mut() {
            Some(session) => session.engine.handle(trigger),
            None => {
                debug!(?trigger, "trigger ignored, card detached");
                return;
            }
        };
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let generation = session.generation;

        match effect {
            Effect::RenderLoading => {
                if let Err(e) = self.sink.show_loading() {
                    debug!(error = %e, "loading state not rendered");
                }
            }
            Effect::RenderFact(fact) => {
                if let Err(e) = self.sink.show_fact(&fact) {
                    debug!(error = %e, "fact not rendered");
                }
            }
            Effect::Report(error) => self.report(error),
            Effect::StartAcquisition(id) => {
                let Some(config) = session.engine.config() else {
                    return;
                };
                let url = config.source_url.clone();
                let key = config.response_key.clone();
                let pull = Rc::clone(&self.pull);
                let tx = self.events_tx.clone();
                // Not retained: in-flight pulls run to completion after detach.
                tokio::task::spawn_local(async move {
                    let outcome = acquire(&*pull, &url, &key).await;
                    let trigger = Trigger::AcquisitionFinished { id, outcome };
                    let _ = tx.send(CardEvent {
                        generation,
                        trigger,
                    });
                });
            }
            Effect::ArmTimer(period) => {
                let tx = self.events_tx.clone();
                session.timer = Some(TimerHandle::start(period, move || {
                    tx.send(CardEvent {
                        generation,
                        trigger: Trigger::Tick,
                    })
                    .is_ok()
                }));
            }
            Effect::DisarmTimer => {
                session.timer = None;
            }
            Effect::OpenSubscription => {
                let Some(config) = session.engine.config() else {
                    return;
                };
                let url = config.source_url.clone();
                let push = Rc::clone(&self.push);
                let tx = self.events_tx.clone();
                let task = tokio::task::spawn_local(async move {
                    let send = |trigger| {
                        tx.send(CardEvent {
                            generation,
                            trigger,
                        })
                        .is_ok()
                    };
                    let mut messages = match push.subscribe(&url).await {
                        Ok(messages) => messages,
                        Err(e) => {
                            send(Trigger::StreamEnded(e.into()));
                            return;
                        }
                    };
                    while let Some(item) = messages.next().await {
                        let delivered = match item {
                            Ok(message) => send(Trigger::PushMessage(message)),
                            Err(e) => {
                                send(Trigger::StreamEnded(e.into()));
                                break;
                            }
                        };
                        if !delivered {
                            break;
                        }
                    }
                });
                session.subscription = Some(TaskGuard::new(task.abort_handle()));
            }
            Effect::CloseSubscription => {
                session.subscription = None;
            }
        }
    }

    fn report(&self, error: WidgetError) {
        warn!(target: "factcard", error = %error, "fact card error");
        let _ = self.diagnostics_tx.send(Diagnostic::now(error));
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
