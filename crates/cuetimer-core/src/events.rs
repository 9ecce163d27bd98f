use serde::{Deserialize, Serialize};

use crate::cues::CueEffect;
use crate::timer::{SubscriptionId, TimerState};

/// Every transition of the countdown produces events.
/// Presentation renders from them; the cue dispatcher performs the effects
/// they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StateChanged {
        from: TimerState,
        to: TimerState,
    },
    /// A fresh session began; fired cues start empty.
    SessionStarted {
        total_secs: u64,
    },
    SamplerAttached {
        subscription: SubscriptionId,
    },
    SamplerDetached {
        subscription: SubscriptionId,
    },
    /// New remaining-seconds value.
    Remaining {
        secs: u64,
    },
    /// A cue-table threshold was reached for the first time this session.
    CueFired {
        remaining: u64,
        effects: Vec<CueEffect>,
    },
    /// Per-second sound when the metronome is enabled.
    Metronome {
        remaining: u64,
        effect: CueEffect,
    },
    /// The run reached zero and halted there.
    Finished,
    TimerReset {
        total_secs: u64,
    },
}
