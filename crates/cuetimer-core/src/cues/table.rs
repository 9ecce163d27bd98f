use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{phrases, FiredCues};

/// A side effect bound to a remaining-seconds threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum CueEffect {
    Speak(String),
    Tick,
    Alarm,
}

impl CueEffect {
    pub fn speak(text: impl Into<String>) -> Self {
        CueEffect::Speak(text.into())
    }
}

/// Immutable mapping from remaining seconds to the cue fired there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueTable {
    entries: BTreeMap<u64, CueEffect>,
}

impl CueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard spoken table for a run of `ticks` counted seconds.
    ///
    /// Entries are inserted warn, start, halfway, five..one, finished; a
    /// later entry replaces an earlier one on the same threshold, so with
    /// short runs the countdown words win over "halfway".
    pub fn for_ticks(ticks: u64) -> Self {
        let mut table = Self::new()
            .with(ticks.saturating_add(2), CueEffect::speak(phrases::WARN))
            .with(ticks, CueEffect::speak(phrases::START))
            .with(ticks / 2, CueEffect::speak(phrases::HALFWAY));
        for (secs, word) in phrases::COUNTDOWN {
            table.insert(secs, CueEffect::speak(word));
        }
        table.with(0, CueEffect::speak(phrases::FINISHED))
    }

    pub fn with(mut self, threshold: u64, effect: CueEffect) -> Self {
        self.insert(threshold, effect);
        self
    }

    pub fn insert(&mut self, threshold: u64, effect: CueEffect) -> Option<CueEffect> {
        self.entries.insert(threshold, effect)
    }

    /// Drop thresholds a run of `total_secs` can never reach.
    pub fn retain_within(mut self, total_secs: u64) -> Self {
        self.entries.retain(|&threshold, _| threshold <= total_secs);
        self
    }

    pub fn get(&self, threshold: u64) -> Option<&CueEffect> {
        self.entries.get(&threshold)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Thresholds in the order a run reaches them (descending).
    pub fn thresholds(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().rev().copied()
    }

    pub fn max_threshold(&self) -> Option<u64> {
        self.entries.keys().next_back().copied()
    }

    /// Effects to perform on reaching `remaining`, if a cue is due.
    ///
    /// Records the threshold in `fired`; a threshold already fired in this
    /// session yields `None`. At zero the sound is always the alarm, with
    /// the mapped phrase (if any) spoken first.
    pub fn plan(&self, remaining: u64, fired: &mut FiredCues) -> Option<Vec<CueEffect>> {
        let effect = self.entries.get(&remaining)?;
        if !fired.insert(remaining) {
            return None;
        }
        let effects = match (remaining, effect) {
            (0, CueEffect::Speak(text)) => vec![CueEffect::Speak(text.clone()), CueEffect::Alarm],
            (0, _) => vec![CueEffect::Alarm],
            (_, effect) => vec![effect.clone()],
        };
        Some(effects)
    }
}

impl FromIterator<(u64, CueEffect)> for CueTable {
    fn from_iter<I: IntoIterator<Item = (u64, CueEffect)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_for_sixty_ticks() {
        let table = CueTable::for_ticks(60);
        assert_eq!(table.get(62), Some(&CueEffect::speak("uwaga!")));
        assert_eq!(table.get(60), Some(&CueEffect::speak("start!")));
        assert_eq!(table.get(30), Some(&CueEffect::speak("połowa czasu!")));
        assert_eq!(table.get(5), Some(&CueEffect::speak("pięć...")));
        assert_eq!(table.get(1), Some(&CueEffect::speak("jeden...")));
        assert_eq!(table.get(0), Some(&CueEffect::speak(phrases::FINISHED)));
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn later_entries_override_halfway() {
        // ticks = 8: halfway lands on 4, which the countdown words replace.
        let table = CueTable::for_ticks(8);
        assert_eq!(table.get(4), Some(&CueEffect::speak("cztery...")));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn retain_within_drops_unreachable_thresholds() {
        let table = CueTable::for_ticks(30).retain_within(31);
        assert!(table.get(32).is_none());
        assert_eq!(table.max_threshold(), Some(30));
    }

    #[test]
    fn thresholds_are_descending() {
        let table: CueTable = [(0, CueEffect::Alarm), (5, CueEffect::Tick), (3, CueEffect::Tick)]
            .into_iter()
            .collect();
        assert_eq!(table.thresholds().collect::<Vec<_>>(), vec![5, 3, 0]);
    }

    #[test]
    fn plan_fires_each_threshold_once() {
        let table = CueTable::new().with(5, CueEffect::speak("pięć..."));
        let mut fired = FiredCues::default();
        assert_eq!(
            table.plan(5, &mut fired),
            Some(vec![CueEffect::speak("pięć...")])
        );
        assert_eq!(table.plan(5, &mut fired), None);
        assert_eq!(table.plan(4, &mut fired), None);
        assert!(fired.contains(5));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn plan_at_zero_always_sounds_alarm() {
        let table = CueTable::new().with(0, CueEffect::Tick);
        assert_eq!(
            table.plan(0, &mut FiredCues::default()),
            Some(vec![CueEffect::Alarm])
        );

        let spoken = CueTable::new().with(0, CueEffect::speak("koniec"));
        assert_eq!(
            spoken.plan(0, &mut FiredCues::default()),
            Some(vec![CueEffect::speak("koniec"), CueEffect::Alarm])
        );
    }

    #[test]
    fn effect_serializes_with_kind_tag() {
        let json = serde_json::to_string(&CueEffect::speak("start!")).unwrap();
        assert_eq!(json, r#"{"kind":"speak","text":"start!"}"#);
        let json = serde_json::to_string(&CueEffect::Alarm).unwrap();
        assert_eq!(json, r#"{"kind":"alarm"}"#);
    }
}
