//! Countdown state machine.
//!
//! All transition and output logic lives in [`transition`], a pure function
//! of `(config, state, input)`. Commands and frame samples arrive as one
//! serialized [`Input`] stream; the caller feeds commands before any frame
//! that follows them, so a pause or reset always preempts later samples.
//!
//! ## State Transitions
//!
//! ```text
//! Reset ──start──▶ Started ──pause──▶ Paused ──start──▶ Started
//!   ▲                 │                  │
//!   └─────reset───────┴──────reset───────┘
//! ```
//!
//! Reaching zero while `Started` halts the run: the sampler detaches and the
//! value stays at zero until the next reset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::sampler::ElapsedSampler;
use super::session::{Session, SubscriptionId};
use crate::cues::{CueEffect, CueTable};
use crate::error::ValidationError;
use crate::events::Event;

/// The externally settable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Started,
    Paused,
    #[default]
    Reset,
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Started => "started",
            TimerState::Paused => "paused",
            TimerState::Reset => "reset",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "started" | "resume" => Ok(TimerState::Started),
            "pause" | "paused" => Ok(TimerState::Paused),
            "reset" => Ok(TimerState::Reset),
            other => Err(ValidationError::UnknownState(other.to_string())),
        }
    }
}

/// Validated, immutable parameters of one countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerConfig {
    total_secs: u64,
    ticks_per_second: u64,
    cues: CueTable,
    metronome: bool,
}

impl TimerConfig {
    /// # Errors
    ///
    /// Rejects `total_secs == 0` and `ticks_per_second == 0`.
    pub fn new(
        total_secs: u64,
        ticks_per_second: u64,
        cues: CueTable,
    ) -> Result<Self, ValidationError> {
        if total_secs == 0 {
            return Err(ValidationError::InvalidTotal(total_secs));
        }
        if ticks_per_second == 0 {
            return Err(ValidationError::InvalidTicksPerSecond(ticks_per_second));
        }
        Ok(Self {
            total_secs,
            ticks_per_second,
            cues,
            metronome: false,
        })
    }

    /// Play a tick on every reached second (alarm at zero), on top of cues.
    pub fn with_metronome(mut self, enabled: bool) -> Self {
        self.metronome = enabled;
        self
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }

    pub fn cues(&self) -> &CueTable {
        &self.cues
    }

    pub fn metronome(&self) -> bool {
        self.metronome
    }
}

/// One input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// User-issued state change, stamped with the clock at issue time.
    Command { next: TimerState, now_ms: u64 },
    /// Host frame for the sampler attached under `subscription`.
    Frame {
        subscription: SubscriptionId,
        now_ms: u64,
    },
}

/// Everything the machine remembers between inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    state: TimerState,
    remaining: u64,
    session: Option<Session>,
    next_subscription: SubscriptionId,
}

impl MachineState {
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            state: TimerState::Reset,
            remaining: config.total_secs(),
            session: None,
            next_subscription: SubscriptionId::FIRST,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the attached sampler. `None` unless running and not finished.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.session.as_ref().and_then(Session::subscription_id)
    }

    pub fn is_finished(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_finished)
    }

    fn command(
        &mut self,
        config: &TimerConfig,
        target: TimerState,
        now_ms: u64,
        events: &mut Vec<Event>,
    ) {
        if target == self.state {
            trace!(state = %target, "command is a no-op");
            return;
        }
        let from = self.state;
        self.state = target;
        debug!(%from, to = %target, remaining = self.remaining, "timer state changed");
        events.push(Event::StateChanged { from, to: target });

        match target {
            TimerState::Reset => {
                self.detach_sampler(events);
                self.session = None;
                self.remaining = config.total_secs();
                events.push(Event::TimerReset {
                    total_secs: config.total_secs(),
                });
                events.push(Event::Remaining {
                    secs: self.remaining,
                });
            }
            TimerState::Paused => self.detach_sampler(events),
            TimerState::Started => self.start(config, now_ms, events),
        }
    }

    fn start(&mut self, config: &TimerConfig, now_ms: u64, events: &mut Vec<Event>) {
        let id = self.next_subscription;
        match self.session.as_mut() {
            Some(session) if session.is_finished() => {
                debug!("run already finished, holding at zero until reset");
            }
            Some(session) => {
                let elapsed = config.total_secs().saturating_sub(self.remaining);
                session.attach(
                    id,
                    ElapsedSampler::resumed(now_ms, elapsed, config.ticks_per_second()),
                );
                self.next_subscription = id.next();
                debug!(subscription = %id, elapsed, "sampler resumed");
                events.push(Event::SamplerAttached { subscription: id });
            }
            None => {
                let mut session = Session::new(config.total_secs(), config.ticks_per_second());
                session.attach(id, ElapsedSampler::new(now_ms, config.ticks_per_second()));
                self.next_subscription = id.next();
                self.remaining = config.total_secs();
                debug!(subscription = %id, total_secs = config.total_secs(), "session started");
                events.push(Event::SessionStarted {
                    total_secs: config.total_secs(),
                });
                events.push(Event::SamplerAttached { subscription: id });
                reach(config, &mut session, self.remaining, events);
                self.session = Some(session);
            }
        }
    }

    fn frame(
        &mut self,
        config: &TimerConfig,
        subscription: SubscriptionId,
        now_ms: u64,
        events: &mut Vec<Event>,
    ) {
        if self.state != TimerState::Started {
            trace!(state = %self.state, "frame ignored outside started");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(active) = session.subscription_mut() else {
            return;
        };
        if active.id != subscription {
            trace!(stale = %subscription, active = %active.id, "discarding stale sample");
            return;
        }
        let Some(elapsed) = active.sampler.sample(now_ms) else {
            return;
        };

        // Step through every crossed second so no value or cue is skipped
        // when frames arrive late.
        let target = config.total_secs().saturating_sub(elapsed);
        while self.remaining > target {
            self.remaining -= 1;
            reach(config, session, self.remaining, events);
            if session.is_finished() {
                break;
            }
        }
    }

    fn detach_sampler(&mut self, events: &mut Vec<Event>) {
        if let Some(id) = self.session.as_mut().and_then(Session::detach) {
            debug!(subscription = %id, "sampler detached");
            events.push(Event::SamplerDetached { subscription: id });
        }
    }
}

/// Emit a newly reached value with its cues; finish the run at zero.
fn reach(config: &TimerConfig, session: &mut Session, secs: u64, events: &mut Vec<Event>) {
    events.push(Event::Remaining { secs });

    let planned = config.cues().plan(secs, session.fired_mut());
    let sound = if secs == 0 {
        CueEffect::Alarm
    } else {
        CueEffect::Tick
    };
    let covered = planned.as_ref().is_some_and(|effects| effects.contains(&sound));
    if let Some(effects) = planned {
        events.push(Event::CueFired {
            remaining: secs,
            effects,
        });
    }
    if config.metronome() && !covered {
        events.push(Event::Metronome {
            remaining: secs,
            effect: sound,
        });
    }

    if secs == 0 {
        session.finish();
        if let Some(id) = session.detach() {
            events.push(Event::SamplerDetached { subscription: id });
        }
        debug!("countdown reached zero");
        events.push(Event::Finished);
    }
}

/// Apply one input. Pure: `current` is left untouched.
pub fn transition(
    config: &TimerConfig,
    current: &MachineState,
    input: Input,
) -> (MachineState, Vec<Event>) {
    let mut next = current.clone();
    let mut events = Vec::new();
    match input {
        Input::Command { next: target, now_ms } => {
            next.command(config, target, now_ms, &mut events)
        }
        Input::Frame {
            subscription,
            now_ms,
        } => next.frame(config, subscription, now_ms, &mut events),
    }
    (next, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(total: u64) -> TimerConfig {
        TimerConfig::new(total, 1, CueTable::new()).unwrap()
    }

    fn command(next: TimerState, now_ms: u64) -> Input {
        Input::Command { next, now_ms }
    }

    fn frame(state: &MachineState, now_ms: u64) -> Input {
        Input::Frame {
            subscription: state.subscription().expect("sampler attached"),
            now_ms,
        }
    }

    fn start_fresh(cfg: &TimerConfig) -> (MachineState, Vec<Event>) {
        transition(
            cfg,
            &MachineState::new(cfg),
            command(TimerState::Started, 0),
        )
    }

    fn remaining_values(events: &[Event]) -> Vec<u64> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Remaining { secs } => Some(*secs),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(
            TimerConfig::new(0, 1, CueTable::new()),
            Err(ValidationError::InvalidTotal(0))
        );
        assert_eq!(
            TimerConfig::new(10, 0, CueTable::new()),
            Err(ValidationError::InvalidTicksPerSecond(0))
        );
    }

    #[test]
    fn initial_state_is_reset_at_total() {
        let cfg = config(10);
        let state = MachineState::new(&cfg);
        assert_eq!(state.state(), TimerState::Reset);
        assert_eq!(state.remaining(), 10);
        assert!(state.session().is_none());
        assert!(state.subscription().is_none());
    }

    #[test]
    fn start_emits_total_immediately() {
        let cfg = config(10);
        let (state, events) = start_fresh(&cfg);
        assert_eq!(state.state(), TimerState::Started);
        assert_eq!(
            events,
            vec![
                Event::StateChanged {
                    from: TimerState::Reset,
                    to: TimerState::Started
                },
                Event::SessionStarted { total_secs: 10 },
                Event::SamplerAttached {
                    subscription: SubscriptionId::FIRST
                },
                Event::Remaining { secs: 10 },
            ]
        );
    }

    #[test]
    fn transition_does_not_mutate_input_state() {
        let cfg = config(10);
        let initial = MachineState::new(&cfg);
        let before = initial.clone();
        let _ = transition(&cfg, &initial, command(TimerState::Started, 0));
        assert_eq!(initial, before);
    }

    #[test]
    fn frames_count_down_one_second_at_a_time() {
        let cfg = config(3);
        let (mut state, _) = start_fresh(&cfg);
        let mut seen = Vec::new();
        for now in (0..=3_200).step_by(16) {
            let (next, events) = transition(&cfg, &state, frame(&state, now));
            seen.extend(remaining_values(&events));
            state = next;
            if state.is_finished() {
                break;
            }
        }
        assert_eq!(seen, vec![2, 1, 0]);
        assert_eq!(state.remaining(), 0);
        assert_eq!(state.state(), TimerState::Started);
        assert!(state.subscription().is_none());
    }

    #[test]
    fn late_frame_steps_through_every_crossed_second() {
        let cfg = config(10);
        let (state, _) = start_fresh(&cfg);
        let (state, events) = transition(&cfg, &state, frame(&state, 4_500));
        assert_eq!(remaining_values(&events), vec![9, 8, 7, 6]);
        assert_eq!(state.remaining(), 6);
    }

    #[test]
    fn overshooting_frame_stops_at_zero() {
        let cfg = config(2);
        let (state, _) = start_fresh(&cfg);
        let (state, events) = transition(&cfg, &state, frame(&state, 60_000));
        assert_eq!(remaining_values(&events), vec![1, 0]);
        assert_eq!(events.last(), Some(&Event::Finished));
        assert!(state.is_finished());
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let cfg = config(10);
        let (state, _) = start_fresh(&cfg);
        let (state, _) = transition(&cfg, &state, frame(&state, 3_000));
        assert_eq!(state.remaining(), 7);

        let (state, events) = transition(&cfg, &state, command(TimerState::Paused, 3_100));
        assert!(events.contains(&Event::SamplerDetached {
            subscription: SubscriptionId::FIRST
        }));
        assert!(state.subscription().is_none());

        let (state, events) = transition(&cfg, &state, command(TimerState::Started, 8_100));
        assert!(remaining_values(&events).is_empty());
        let (state, events) = transition(&cfg, &state, frame(&state, 8_200));
        assert!(events.is_empty());
        let (state, events) = transition(&cfg, &state, frame(&state, 10_100));
        assert_eq!(remaining_values(&events), vec![6, 5]);
        assert_eq!(state.remaining(), 5);
    }

    #[test]
    fn stale_subscription_is_discarded() {
        let cfg = config(10);
        let (state, _) = start_fresh(&cfg);
        let old = state.subscription().unwrap();
        let (state, _) = transition(&cfg, &state, command(TimerState::Reset, 500));
        let (state, _) = transition(&cfg, &state, command(TimerState::Started, 600));
        assert_ne!(state.subscription(), Some(old));

        let stale = Input::Frame {
            subscription: old,
            now_ms: 5_000,
        };
        let (state, events) = transition(&cfg, &state, stale);
        assert!(events.is_empty());
        assert_eq!(state.remaining(), 10);
    }

    #[test]
    fn frames_are_ignored_while_paused() {
        let cfg = config(10);
        let (state, _) = start_fresh(&cfg);
        let id = state.subscription().unwrap();
        let (state, _) = transition(&cfg, &state, command(TimerState::Paused, 100));
        let (state, events) = transition(
            &cfg,
            &state,
            Input::Frame {
                subscription: id,
                now_ms: 9_000,
            },
        );
        assert!(events.is_empty());
        assert_eq!(state.remaining(), 10);
    }

    #[test]
    fn duplicate_commands_are_no_ops() {
        let cfg = config(10);
        let initial = MachineState::new(&cfg);
        let (state, events) = transition(&cfg, &initial, command(TimerState::Reset, 0));
        assert!(events.is_empty());
        assert_eq!(state, initial);

        let (started, _) = transition(&cfg, &initial, command(TimerState::Started, 0));
        let (again, events) = transition(&cfg, &started, command(TimerState::Started, 50));
        assert!(events.is_empty());
        assert_eq!(again, started);
    }

    #[test]
    fn reset_restores_total_and_drops_session() {
        let cfg = config(10);
        let (state, _) = start_fresh(&cfg);
        let (state, _) = transition(&cfg, &state, frame(&state, 4_000));
        let (state, events) = transition(&cfg, &state, command(TimerState::Reset, 4_100));
        assert_eq!(state.remaining(), 10);
        assert_eq!(state.state(), TimerState::Reset);
        assert!(state.session().is_none());
        assert_eq!(events.last(), Some(&Event::Remaining { secs: 10 }));
    }

    #[test]
    fn pause_from_reset_then_start_opens_fresh_session() {
        let cfg = config(5);
        let (state, _) = transition(&cfg, &MachineState::new(&cfg), command(TimerState::Paused, 0));
        assert!(state.session().is_none());
        let (state, events) = transition(&cfg, &state, command(TimerState::Started, 1_000));
        assert!(events.contains(&Event::SessionStarted { total_secs: 5 }));
        assert_eq!(state.remaining(), 5);
    }

    #[test]
    fn finished_run_holds_at_zero_across_pause_and_start() {
        let cfg = config(1);
        let (state, _) = start_fresh(&cfg);
        let (state, _) = transition(&cfg, &state, frame(&state, 1_000));
        assert!(state.is_finished());
        let (state, _) = transition(&cfg, &state, command(TimerState::Paused, 2_000));
        let (state, events) = transition(&cfg, &state, command(TimerState::Started, 3_000));
        assert_eq!(
            events,
            vec![Event::StateChanged {
                from: TimerState::Paused,
                to: TimerState::Started
            }]
        );
        assert_eq!(state.remaining(), 0);
        assert!(state.subscription().is_none());
    }

    #[test]
    fn metronome_ticks_every_second_and_alarms_at_zero() {
        let cfg = TimerConfig::new(2, 1, CueTable::new().with(1, CueEffect::speak("jeden...")))
            .unwrap()
            .with_metronome(true);
        let (state, events) = start_fresh(&cfg);
        assert!(events.contains(&Event::Metronome {
            remaining: 2,
            effect: CueEffect::Tick
        }));
        let (_, events) = transition(&cfg, &state, frame(&state, 2_000));
        assert!(events.contains(&Event::CueFired {
            remaining: 1,
            effects: vec![CueEffect::speak("jeden...")]
        }));
        assert!(events.contains(&Event::Metronome {
            remaining: 1,
            effect: CueEffect::Tick
        }));
        assert!(events.contains(&Event::Metronome {
            remaining: 0,
            effect: CueEffect::Alarm
        }));
    }

    #[test]
    fn metronome_does_not_double_a_cue_sound() {
        let cfg = TimerConfig::new(1, 1, CueTable::new().with(0, CueEffect::Alarm))
            .unwrap()
            .with_metronome(true);
        let (state, _) = start_fresh(&cfg);
        let (_, events) = transition(&cfg, &state, frame(&state, 1_000));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::Metronome { remaining: 0, .. })));
    }

    #[test]
    fn parses_state_names() {
        assert_eq!("start".parse::<TimerState>(), Ok(TimerState::Started));
        assert_eq!("Paused".parse::<TimerState>(), Ok(TimerState::Paused));
        assert_eq!("reset".parse::<TimerState>(), Ok(TimerState::Reset));
        assert!("stop".parse::<TimerState>().is_err());
    }
}
