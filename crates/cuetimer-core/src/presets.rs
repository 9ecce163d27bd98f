//! Built-in countdown presets.
//!
//! A preset counts `ticks` seconds after a short `lead_in`, so a run lasts
//! `ticks + lead_in` steps. The standard cue table is keyed on `ticks`:
//! "start!" is spoken when the lead-in ends.

use serde::{Deserialize, Serialize};

use crate::cues::CueTable;
use crate::error::ValidationError;
use crate::timer::TimerConfig;

pub const DEFAULT_PRESET: &str = "180_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub ticks: u64,
    pub lead_in: u64,
    pub ticks_per_second: u64,
}

impl Preset {
    pub const fn new(ticks: u64, lead_in: u64, ticks_per_second: u64) -> Self {
        Self {
            ticks,
            lead_in,
            ticks_per_second,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.ticks.saturating_add(self.lead_in)
    }

    /// Menu label: `"180s"`, or `"30 x 3s"` for stretched presets.
    pub fn label(&self) -> String {
        if self.ticks_per_second == 1 {
            format!("{}s", self.ticks)
        } else {
            format!("{} x {}s", self.ticks, self.ticks_per_second)
        }
    }

    pub fn cue_table(&self) -> CueTable {
        CueTable::for_ticks(self.ticks).retain_within(self.total_secs())
    }

    /// # Errors
    ///
    /// Fails when the preset would produce an empty run or a zero divisor.
    pub fn timer_config(&self) -> Result<TimerConfig, ValidationError> {
        TimerConfig::new(self.total_secs(), self.ticks_per_second, self.cue_table())
    }
}

pub const PRESETS: &[(&str, Preset)] = &[
    ("300_1", Preset::new(300, 5, 1)),
    ("270_1", Preset::new(270, 5, 1)),
    ("240_1", Preset::new(240, 5, 1)),
    ("210_1", Preset::new(210, 5, 1)),
    ("180_1", Preset::new(180, 5, 1)),
    ("150_1", Preset::new(150, 5, 1)),
    ("120_1", Preset::new(120, 5, 1)),
    ("090_1", Preset::new(90, 5, 1)),
    ("060_1", Preset::new(60, 5, 1)),
    ("045_1", Preset::new(45, 5, 1)),
    ("030_1", Preset::new(30, 5, 1)),
    ("030_2", Preset::new(30, 3, 2)),
    ("030_3", Preset::new(30, 3, 3)),
    ("015_3", Preset::new(15, 3, 3)),
];

pub fn lookup(key: &str) -> Result<Preset, ValidationError> {
    PRESETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, preset)| *preset)
        .ok_or_else(|| ValidationError::UnknownPreset(key.to_string()))
}

pub fn iter() -> impl Iterator<Item = (&'static str, Preset)> {
    PRESETS.iter().copied()
}
