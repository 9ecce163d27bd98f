//! Countdown driver.
//!
//! Wraps the pure [`transition`] function with a clock, host capabilities
//! and an observable remaining-seconds value. It does not use internal
//! threads: the host calls [`Countdown::on_frame`] on every display frame
//! and [`Countdown::set_state`] when the user presses a control.
//!
//! ## Usage
//!
//! ```ignore
//! let mut countdown = Countdown::new(config, SystemClock::new(), host);
//! countdown.set_state(TimerState::Started);
//! // On every frame:
//! countdown.on_frame();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use super::clock::{Clock, SystemClock};
use super::machine::{transition, Input, MachineState, TimerConfig, TimerState};
use super::session::{Session, SubscriptionId};
use crate::cues::CueDispatcher;
use crate::display;
use crate::events::Event;
use crate::host::{Host, WakeLock};

/// Point-in-time view for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub ticks_per_second: u64,
    /// 0.0 .. 1.0 of the run completed.
    pub progress: f64,
    /// `mm:ss` rendering of `remaining_secs`.
    pub clock: String,
    pub title: String,
    pub finished: bool,
    /// Thresholds fired this session, in the order they were reached.
    pub fired_cues: Vec<u64>,
    pub at: DateTime<Utc>,
}

pub struct Countdown<C: Clock = SystemClock> {
    config: TimerConfig,
    machine: MachineState,
    clock: C,
    dispatcher: CueDispatcher,
    wake_lock: Box<dyn WakeLock>,
    remaining_tx: watch::Sender<u64>,
}

impl<C: Clock> Countdown<C> {
    pub fn new(config: TimerConfig, clock: C, host: Host) -> Self {
        let machine = MachineState::new(&config);
        let (remaining_tx, _) = watch::channel(machine.remaining());
        Self {
            config,
            machine,
            clock,
            dispatcher: CueDispatcher::new(host.speaker, host.player),
            wake_lock: host.wake_lock,
            remaining_tx,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> TimerState {
        self.machine.state()
    }

    pub fn remaining(&self) -> u64 {
        self.machine.remaining()
    }

    pub fn session(&self) -> Option<&Session> {
        self.machine.session()
    }

    /// Id of the attached sampler; frames should be tagged with it.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.machine.subscription()
    }

    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    /// Whether the host should keep delivering frames.
    pub fn wants_frames(&self) -> bool {
        self.subscription().is_some()
    }

    pub fn dispatch_failures(&self) -> u64 {
        self.dispatcher.failures()
    }

    /// Observe remaining seconds. The receiver starts at the current value
    /// and is notified only when the value actually changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        let total = self.config.total_secs();
        let remaining = self.remaining();
        Snapshot {
            state: self.state(),
            remaining_secs: remaining,
            total_secs: total,
            ticks_per_second: self.config.ticks_per_second(),
            progress: display::progress(remaining, total),
            clock: display::format_clock(remaining),
            title: display::title(self.state()).to_string(),
            finished: self.is_finished(),
            fired_cues: self
                .session()
                .map(|s| s.fired().iter().collect())
                .unwrap_or_default(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Issue a user command. Always accepted; repeating the current state
    /// does nothing.
    pub fn set_state(&mut self, next: TimerState) -> Vec<Event> {
        let now_ms = self.clock.now_ms();
        self.handle(Input::Command { next, now_ms })
    }

    /// Sample the clock for the attached sampler. No-op when detached.
    pub fn on_frame(&mut self) -> Vec<Event> {
        match self.subscription() {
            Some(subscription) => self.on_frame_for(subscription),
            None => Vec::new(),
        }
    }

    /// Deliver a frame scheduled under `subscription`. Frames whose
    /// subscription has since been detached are discarded.
    pub fn on_frame_for(&mut self, subscription: SubscriptionId) -> Vec<Event> {
        let now_ms = self.clock.now_ms();
        self.handle(Input::Frame {
            subscription,
            now_ms,
        })
    }

    /// Feed one input through the state machine and perform its effects.
    pub fn handle(&mut self, input: Input) -> Vec<Event> {
        let (next, events) = transition(&self.config, &self.machine, input);
        self.machine = next;
        for event in &events {
            self.apply(event);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, event: &Event) {
        match event {
            Event::Remaining { secs } => {
                let secs = *secs;
                self.remaining_tx.send_if_modified(|current| {
                    if *current == secs {
                        return false;
                    }
                    *current = secs;
                    true
                });
            }
            Event::StateChanged { from, to } => {
                if *to == TimerState::Started {
                    if let Err(e) = self.wake_lock.acquire() {
                        warn!(error = %e, "wake lock unavailable");
                    }
                } else if *from == TimerState::Started {
                    if let Err(e) = self.wake_lock.release() {
                        warn!(error = %e, "wake lock release failed");
                    }
                }
            }
            Event::CueFired { .. } | Event::Metronome { .. } => self.dispatcher.dispatch(event),
            _ => {}
        }
    }
}

impl<C: Clock> std::fmt::Debug for Countdown<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Countdown")
            .field("config", &self.config)
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}
