//! Refresh engine: the pure acquisition state machine (no I/O).
//!
//! The engine decides *when* a fact is acquired and how [`FetchState`] moves,
//! but never touches a timer, socket or scene itself. Every input is a
//! [`Trigger`]; every reaction is a list of [`Effect`]s that the runtime
//! executes in order. This keeps the ordering guarantees (loading before
//! outcome, teardown on detach) checkable without a runtime.
//!
//! One engine covers exactly one attach. Re-attaching builds a new engine.

use crate::config::WidgetConfig;
use crate::model::{ConfigError, Fact, FetchState, Strategy, WidgetError};
use std::time::Duration;
use tracing::{debug, info};

/// Identifies one pull acquisition so late or stale results can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AcquisitionId(u64);

impl AcquisitionId {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Inputs to the refresh engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The widget was attached to its host.
    Attach,
    /// The recurring pull timer fired.
    Tick,
    /// The manual trigger was clicked.
    ManualTrigger,
    /// The stop control was clicked.
    Stop,
    /// A message arrived on the push subscription.
    PushMessage(String),
    /// The push subscription failed or was closed by the server.
    StreamEnded(WidgetError),
    /// A pull acquisition finished.
    AcquisitionFinished {
        /// Acquisition this result belongs to.
        id: AcquisitionId,
        /// The fact, or why acquiring it failed.
        outcome: Result<Fact, WidgetError>,
    },
    /// The widget was removed from its host.
    Detach,
}

/// Side effects requested by the engine, executed in order by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Enter the loading state on the render surface.
    RenderLoading,
    /// Replace the displayed fact.
    RenderFact(Fact),
    /// Surface an error through the diagnostics channel.
    Report(WidgetError),
    /// Issue one pull request; its result comes back as
    /// [`Trigger::AcquisitionFinished`] with the same id.
    StartAcquisition(AcquisitionId),
    /// Arm the recurring timer.
    ArmTimer(Duration),
    /// Tear the recurring timer down.
    DisarmTimer,
    /// Open the push subscription.
    OpenSubscription,
    /// Close the push subscription.
    CloseSubscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    New,
    Attached,
    Detached,
}

/// Acquisition state machine for one attach of a fact card.
#[derive(Debug, Clone)]
pub struct RefreshEngine {
    config: Result<WidgetConfig, ConfigError>,
    phase: Phase,
    state: FetchState,
    timer_armed: bool,
    subscription_open: bool,
    in_flight: Option<AcquisitionId>,
    next_id: u64,
    coalesced: u64,
}

impl RefreshEngine {
    /// Engine for a resolved configuration.
    pub fn new(config: WidgetConfig) -> Self {
        Self::from_resolution(Ok(config))
    }

    /// Build an engine from the resolver's outcome.
    ///
    /// A misconfigured engine reports the error on attach and ignores every
    /// other trigger.
    pub fn from_resolution(config: Result<WidgetConfig, ConfigError>) -> Self {
        Self {
            config,
            phase: Phase::New,
            state: FetchState::Idle,
            timer_armed: false,
            subscription_open: false,
            in_flight: None,
            next_id: 0,
            coalesced: 0,
        }
    }

    /// `None` when the attributes did not resolve.
    pub fn config(&self) -> Option<&WidgetConfig> {
        self.config.as_ref().ok()
    }

    /// Current fetch state.
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Whether a session is live.
    pub fn is_attached(&self) -> bool {
        self.phase == Phase::Attached
    }

    /// Whether the recurring timer should be running.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Whether the push subscription should be open.
    pub fn subscription_open(&self) -> bool {
        self.subscription_open
    }

    /// The acquisition currently holding the single-flight guard.
    pub fn in_flight(&self) -> Option<AcquisitionId> {
        self.in_flight
    }

    /// Number of pull acquisitions issued so far.
    pub fn acquisitions_started(&self) -> u64 {
        self.next_id
    }

    /// Number of ticks or manual triggers dropped by the single-flight guard.
    pub fn coalesced_triggers(&self) -> u64 {
        self.coalesced
    }

    /// Feed one trigger and collect the effects it causes.
    pub fn handle(&mut self, trigger: Trigger) -> Vec<Effect> {
        match trigger {
            Trigger::Attach => self.attach(),
            Trigger::Tick => {
                if self.is_attached() && self.timer_armed {
                    self.begin_pull("tick")
                } else {
                    debug!("tick ignored, no timer armed");
                    Vec::new()
                }
            }
            Trigger::ManualTrigger => {
                if self.is_attached() && self.config.is_ok() {
                    self.begin_pull("manual trigger")
                } else {
                    debug!("manual trigger ignored");
                    Vec::new()
                }
            }
            Trigger::Stop => self.stop(),
            Trigger::PushMessage(text) => self.push_message(text),
            Trigger::StreamEnded(err) => self.stream_ended(err),
            Trigger::AcquisitionFinished { id, outcome } => self.finish(id, outcome),
            Trigger::Detach => self.detach(),
        }
    }

    fn attach(&mut self) -> Vec<Effect> {
        if self.phase != Phase::New {
            debug!(phase = ?self.phase, "attach ignored, engine already used");
            return Vec::new();
        }
        self.phase = Phase::Attached;

        let config = match &self.config {
            Ok(config) => config.clone(),
            Err(err) => {
                let err = WidgetError::from(err.clone());
                self.state = FetchState::Failed(err.clone());
                return vec![Effect::Report(err)];
            }
        };

        info!(
            src = %config.source_url,
            strategy = ?config.strategy(),
            auto_refresh = config.auto_refresh_enabled,
            "fact card attached"
        );

        match config.strategy() {
            Strategy::Pull => {
                let mut effects = self.begin_pull("attach");
                if let Some(interval) = config.timer_interval() {
                    self.timer_armed = true;
                    effects.push(Effect::ArmTimer(interval));
                }
                effects
            }
            Strategy::Push => {
                self.subscription_open = true;
                self.state = FetchState::Loading;
                vec![Effect::RenderLoading, Effect::OpenSubscription]
            }
        }
    }

    fn begin_pull(&mut self, cause: &'static str) -> Vec<Effect> {
        if let Some(id) = self.in_flight {
            self.coalesced += 1;
            debug!(cause, in_flight = id.get(), "acquisition in flight, trigger coalesced");
            return Vec::new();
        }
        let id = AcquisitionId(self.next_id);
        self.next_id += 1;
        self.in_flight = Some(id);
        self.state = FetchState::Loading;
        debug!(cause, id = id.get(), "starting acquisition");
        vec![Effect::RenderLoading, Effect::StartAcquisition(id)]
    }

    fn finish(&mut self, id: AcquisitionId, outcome: Result<Fact, WidgetError>) -> Vec<Effect> {
        if !self.is_attached() || self.in_flight != Some(id) {
            debug!(id = id.get(), "discarding stale acquisition result");
            return Vec::new();
        }
        self.in_flight = None;
        match outcome {
            Ok(fact) => {
                self.state = FetchState::Loaded(fact.clone());
                vec![Effect::RenderFact(fact)]
            }
            Err(err) => {
                self.state = FetchState::Failed(err.clone());
                vec![Effect::Report(err)]
            }
        }
    }

    fn push_message(&mut self, text: String) -> Vec<Effect> {
        if !self.is_attached() || !self.subscription_open {
            debug!("push message ignored, no subscription");
            return Vec::new();
        }
        let fact = Fact::new(text);
        self.state = FetchState::Loaded(fact.clone());
        vec![Effect::RenderLoading, Effect::RenderFact(fact)]
    }

    fn stream_ended(&mut self, err: WidgetError) -> Vec<Effect> {
        if !self.is_attached() || !self.subscription_open {
            return Vec::new();
        }
        self.subscription_open = false;
        self.state = FetchState::Failed(err.clone());
        vec![Effect::Report(err), Effect::CloseSubscription]
    }

    fn stop(&mut self) -> Vec<Effect> {
        if !self.timer_armed {
            debug!("stop ignored, no timer armed");
            return Vec::new();
        }
        self.timer_armed = false;
        info!("auto-refresh stopped");
        vec![Effect::DisarmTimer]
    }

    fn detach(&mut self) -> Vec<Effect> {
        if !self.is_attached() {
            return Vec::new();
        }
        self.phase = Phase::Detached;
        self.in_flight = None;

        let mut effects = Vec::new();
        if std::mem::take(&mut self.timer_armed) {
            effects.push(Effect::DisarmTimer);
        }
        if std::mem::take(&mut self.subscription_open) {
            effects.push(Effect::CloseSubscription);
        }
        info!("fact card detached");
        effects
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
