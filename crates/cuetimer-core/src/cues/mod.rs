//! Cue table, fired-cue bookkeeping and effect dispatch.
//!
//! Planning (which effects a newly reached value triggers) is pure and runs
//! inside the state machine. Execution against host capabilities happens in
//! [`CueDispatcher`], where failures are logged and dropped.

mod dispatcher;
pub mod phrases;
mod table;

use std::collections::BTreeSet;

pub use dispatcher::CueDispatcher;
pub use table::{CueEffect, CueTable};

/// Thresholds already dispatched in the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiredCues(BTreeSet<u64>);

impl FiredCues {
    /// Record `threshold`. Returns `false` if it had already fired.
    pub fn insert(&mut self, threshold: u64) -> bool {
        self.0.insert(threshold)
    }

    pub fn contains(&self, threshold: u64) -> bool {
        self.0.contains(&threshold)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fired thresholds in descending order (the order a run reaches them).
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().rev().copied()
    }
}
