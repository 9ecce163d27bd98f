//! # cuetimer Core Library
//!
//! This library provides the countdown logic behind the cuetimer interval
//! clock. Front ends (the bundled CLI, or any other host) only forward user
//! commands and display frames, and render what the core reports.
//!
//! ## Architecture
//!
//! - **Sampler**: turns frame timestamps into deduplicated integer
//!   "seconds elapsed" values, scaled by `ticks_per_second`
//! - **State Machine**: a pure `(config, state, input) -> (state, events)`
//!   function over start/pause/reset commands and samples
//! - **Cues**: a static threshold table, per-session fired-cue bookkeeping
//!   and a dispatcher that performs speech and sound effects
//! - **Host**: injected `Speaker`, `AlarmPlayer` and `WakeLock` capabilities
//!
//! ## Key Components
//!
//! - [`Countdown`]: Driver combining clock, state machine and host
//! - [`TimerConfig`]: Validated countdown parameters
//! - [`CueTable`]: Threshold to effect mapping
//! - [`Config`]: Application configuration management

pub mod cues;
pub mod display;
pub mod error;
pub mod events;
pub mod host;
pub mod presets;
pub mod storage;
pub mod timer;

pub use cues::{CueDispatcher, CueEffect, CueTable, FiredCues};
pub use error::{ConfigError, CoreError, HostError, ValidationError};
pub use events::Event;
pub use host::{AlarmPlayer, Host, HostCall, Recorder, Speaker, WakeLock};
pub use presets::{Preset, DEFAULT_PRESET};
pub use storage::Config;
pub use timer::{
    transition, Clock, Countdown, ElapsedSampler, Input, MachineState, ManualClock, Session,
    Snapshot, SubscriptionId, SystemClock, TimerConfig, TimerState,
};
