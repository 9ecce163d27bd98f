//! Elapsed-time sampler.
//!
//! Turns raw frame timestamps into integer "virtual seconds since start",
//! emitting only when that integer advances. One real second counts as
//! `1 / ticks_per_second` virtual seconds, so `ticks_per_second = 3` makes
//! each countdown step last three real seconds.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElapsedSampler {
    /// Wall-clock origin in ms. Signed so a resumed origin may precede the
    /// clock's own zero.
    origin_ms: i64,
    ticks_per_second: u64,
    last: Option<u64>,
}

impl ElapsedSampler {
    /// Sampler for a run that starts counting at `origin_ms`.
    pub fn new(origin_ms: u64, ticks_per_second: u64) -> Self {
        Self {
            origin_ms: origin_ms as i64,
            ticks_per_second: ticks_per_second.max(1),
            last: None,
        }
    }

    /// Sampler re-anchored after a pause.
    ///
    /// The origin is moved back by the seconds already counted, so the next
    /// emitted value is `already_elapsed + 1` and the paused interval never
    /// counts against the run.
    pub fn resumed(now_ms: u64, already_elapsed: u64, ticks_per_second: u64) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        let offset = already_elapsed
            .saturating_mul(ticks_per_second)
            .saturating_mul(1000);
        Self {
            origin_ms: (now_ms as i64).saturating_sub(offset as i64),
            ticks_per_second,
            last: Some(already_elapsed),
        }
    }

    pub fn origin_ms(&self) -> i64 {
        self.origin_ms
    }

    /// Integer virtual seconds elapsed at `now_ms`, without recording it.
    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        let delta = (now_ms as i64).saturating_sub(self.origin_ms).max(0) as u64;
        delta / self.ticks_per_second.saturating_mul(1000)
    }

    /// Sample at `now_ms`. Returns `Some` only when the integer value moved
    /// past the last one emitted.
    pub fn sample(&mut self, now_ms: u64) -> Option<u64> {
        let elapsed = self.elapsed_at(now_ms);
        match self.last {
            Some(last) if elapsed <= last => None,
            _ => {
                self.last = Some(elapsed);
                Some(elapsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_emits_zero() {
        let mut s = ElapsedSampler::new(1_000, 1);
        assert_eq!(s.sample(1_000), Some(0));
    }

    #[test]
    fn dedups_within_a_second() {
        let mut s = ElapsedSampler::new(0, 1);
        assert_eq!(s.sample(0), Some(0));
        assert_eq!(s.sample(16), None);
        assert_eq!(s.sample(999), None);
        assert_eq!(s.sample(1_000), Some(1));
        assert_eq!(s.sample(1_016), None);
    }

    #[test]
    fn ticks_per_second_stretches_each_step() {
        let mut s = ElapsedSampler::new(0, 3);
        assert_eq!(s.sample(0), Some(0));
        assert_eq!(s.sample(2_999), None);
        assert_eq!(s.sample(3_000), Some(1));
        assert_eq!(s.elapsed_at(9_500), 3);
    }

    #[test]
    fn resumed_sampler_continues_from_offset() {
        // Paused after 3 counted seconds, resumed 5s later at t=8s.
        let mut s = ElapsedSampler::new(0, 1);
        s.sample(3_200);
        let mut resumed = ElapsedSampler::resumed(8_000, 3, 1);
        assert_eq!(resumed.origin_ms(), 5_000);
        assert_eq!(resumed.sample(8_016), None);
        assert_eq!(resumed.sample(9_000), Some(4));
        assert_eq!(resumed.sample(10_000), Some(5));
    }

    #[test]
    fn resumed_origin_may_be_negative() {
        let mut s = ElapsedSampler::resumed(500, 2, 1);
        assert_eq!(s.origin_ms(), -1_500);
        assert_eq!(s.sample(600), None);
        assert_eq!(s.sample(1_500), Some(3));
    }

    #[test]
    fn zero_ticks_per_second_is_treated_as_one() {
        let s = ElapsedSampler::new(0, 0);
        assert_eq!(s.elapsed_at(2_000), 2);
    }
}
