//! Host capability ports.
//!
//! ```text
//!   Countdown ──▶ CueDispatcher ──▶ Speaker / AlarmPlayer
//!       └──────────────────────────▶ WakeLock
//! ```
//!
//! The countdown never touches audio, speech or power management directly.
//! Hosts inject implementations of these traits; tests use [`Recorder`].

mod recording;

pub use recording::{HostCall, Recorder};

use crate::error::HostError;

/// Speech output.
pub trait Speaker: Send {
    fn speak(&mut self, text: &str) -> Result<(), HostError>;
}

/// Short audio cues.
pub trait AlarmPlayer: Send {
    fn play_tick(&mut self) -> Result<(), HostError>;
    fn play_alarm(&mut self) -> Result<(), HostError>;
}

/// Keeps the display awake while the countdown runs.
pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<(), HostError>;
    fn release(&mut self) -> Result<(), HostError>;
}

/// Accepts every request and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Speaker for Silent {
    fn speak(&mut self, _text: &str) -> Result<(), HostError> {
        Ok(())
    }
}

impl AlarmPlayer for Silent {
    fn play_tick(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn play_alarm(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}

impl WakeLock for Silent {
    fn acquire(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}

/// A capability the host lacks. Every call fails with
/// [`HostError::Unavailable`].
#[derive(Debug, Clone, Copy)]
pub struct Unavailable(pub &'static str);

impl Speaker for Unavailable {
    fn speak(&mut self, _text: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable(self.0))
    }
}

impl AlarmPlayer for Unavailable {
    fn play_tick(&mut self) -> Result<(), HostError> {
        Err(HostError::Unavailable(self.0))
    }

    fn play_alarm(&mut self) -> Result<(), HostError> {
        Err(HostError::Unavailable(self.0))
    }
}

impl WakeLock for Unavailable {
    fn acquire(&mut self) -> Result<(), HostError> {
        Err(HostError::Unavailable(self.0))
    }

    fn release(&mut self) -> Result<(), HostError> {
        Err(HostError::Unavailable(self.0))
    }
}

/// The full set of capabilities handed to a countdown.
pub struct Host {
    pub speaker: Box<dyn Speaker>,
    pub player: Box<dyn AlarmPlayer>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Host {
    pub fn new(
        speaker: impl Speaker + 'static,
        player: impl AlarmPlayer + 'static,
        wake_lock: impl WakeLock + 'static,
    ) -> Self {
        Self {
            speaker: Box::new(speaker),
            player: Box::new(player),
            wake_lock: Box::new(wake_lock),
        }
    }

    pub fn silent() -> Self {
        Self::new(Silent, Silent, Silent)
    }

    /// A host whose every capability records into the returned [`Recorder`].
    pub fn recording() -> (Self, Recorder) {
        let recorder = Recorder::default();
        let host = Self::new(recorder.clone(), recorder.clone(), recorder.clone());
        (host, recorder)
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
