use std::fmt;

use serde::{Deserialize, Serialize};

use super::sampler::ElapsedSampler;
use crate::cues::FiredCues;

/// Identifies one sampler attachment.
///
/// Every transition into `Started` attaches a fresh sampler under a new id.
/// Frames tagged with any other id are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const FIRST: SubscriptionId = SubscriptionId(1);

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) sampler: ElapsedSampler,
}

/// One run of the countdown, from a fresh start until reset.
///
/// Owns the fired-cue set, so dropping the session is what clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    total_secs: u64,
    ticks_per_second: u64,
    fired: FiredCues,
    subscription: Option<Subscription>,
    finished: bool,
}

impl Session {
    pub(crate) fn new(total_secs: u64, ticks_per_second: u64) -> Self {
        Self {
            total_secs,
            ticks_per_second,
            fired: FiredCues::default(),
            subscription: None,
            finished: false,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }

    pub fn fired(&self) -> &FiredCues {
        &self.fired
    }

    /// Wall-clock origin of the active sampler, if one is attached.
    pub fn start_wall_clock_ms(&self) -> Option<i64> {
        self.subscription.as_ref().map(|s| s.sampler.origin_ms())
    }

    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(|s| s.id)
    }

    /// The run reached zero. Terminal until the next reset.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn fired_mut(&mut self) -> &mut FiredCues {
        &mut self.fired
    }

    pub(crate) fn subscription_mut(&mut self) -> Option<&mut Subscription> {
        self.subscription.as_mut()
    }

    pub(crate) fn attach(&mut self, id: SubscriptionId, sampler: ElapsedSampler) {
        self.subscription = Some(Subscription { id, sampler });
    }

    pub(crate) fn detach(&mut self) -> Option<SubscriptionId> {
        self.subscription.take().map(|s| s.id)
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach_track_subscription() {
        let mut session = Session::new(10, 1);
        assert!(session.subscription_id().is_none());
        session.attach(SubscriptionId::FIRST, ElapsedSampler::new(250, 1));
        assert_eq!(session.subscription_id(), Some(SubscriptionId::FIRST));
        assert_eq!(session.start_wall_clock_ms(), Some(250));
        assert_eq!(session.detach(), Some(SubscriptionId::FIRST));
        assert!(session.detach().is_none());
        assert!(session.start_wall_clock_ms().is_none());
    }

    #[test]
    fn subscription_ids_increase() {
        let a = SubscriptionId::FIRST;
        let b = a.next();
        assert!(b > a);
        assert_eq!(b.get(), 2);
        assert_eq!(b.to_string(), "#2");
    }
}
