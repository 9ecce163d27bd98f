use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AlarmPlayer, Speaker, WakeLock};
use crate::error::HostError;

/// One capability call observed by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Speak(String),
    Tick,
    Alarm,
    WakeLockAcquired,
    WakeLockReleased,
}

/// Recording test double for every host capability.
///
/// Clones share one call log. With [`Recorder::fail`] set, calls are still
/// recorded but report a rejection, which exercises the swallow-and-log path.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<HostCall>>>,
    failing: Arc<AtomicBool>,
}

impl Recorder {
    /// Make every subsequent call return an error.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.lock().iter().filter(|c| *c == call).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HostCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, capability: &'static str, call: HostCall) -> Result<(), HostError> {
        self.lock().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::Rejected {
                capability,
                message: "recorder set to fail".into(),
            });
        }
        Ok(())
    }
}

impl Speaker for Recorder {
    fn speak(&mut self, text: &str) -> Result<(), HostError> {
        self.record("speech", HostCall::Speak(text.to_string()))
    }
}

impl AlarmPlayer for Recorder {
    fn play_tick(&mut self) -> Result<(), HostError> {
        self.record("audio", HostCall::Tick)
    }

    fn play_alarm(&mut self) -> Result<(), HostError> {
        self.record("audio", HostCall::Alarm)
    }
}

impl WakeLock for Recorder {
    fn acquire(&mut self) -> Result<(), HostError> {
        self.record("wake lock", HostCall::WakeLockAcquired)
    }

    fn release(&mut self) -> Result<(), HostError> {
        self.record("wake lock", HostCall::WakeLockReleased)
    }
}
