use tracing::{debug, warn};

use super::CueEffect;
use crate::events::Event;
use crate::host::{AlarmPlayer, Speaker};

/// Executes planned cue effects against host capabilities.
///
/// Fire-and-forget: a rejected effect is logged and counted, never returned.
pub struct CueDispatcher {
    speaker: Box<dyn Speaker>,
    player: Box<dyn AlarmPlayer>,
    failures: u64,
}

impl CueDispatcher {
    pub fn new(speaker: Box<dyn Speaker>, player: Box<dyn AlarmPlayer>) -> Self {
        Self {
            speaker,
            player,
            failures: 0,
        }
    }

    /// Number of effects the host rejected so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Perform the effects carried by `event`. Other events are ignored.
    pub fn dispatch(&mut self, event: &Event) {
        match event {
            Event::CueFired { remaining, effects } => {
                for effect in effects {
                    self.perform(*remaining, effect);
                }
            }
            Event::Metronome { remaining, effect } => self.perform(*remaining, effect),
            _ => {}
        }
    }

    pub fn perform(&mut self, remaining: u64, effect: &CueEffect) {
        debug!(remaining, ?effect, "dispatching cue");
        let result = match effect {
            CueEffect::Speak(text) => self.speaker.speak(text),
            CueEffect::Tick => self.player.play_tick(),
            CueEffect::Alarm => self.player.play_alarm(),
        };
        if let Err(e) = result {
            self.failures += 1;
            warn!(remaining, ?effect, error = %e, "cue effect failed");
        }
    }
}

impl std::fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, Recorder, Unavailable};

    fn recording() -> (CueDispatcher, Recorder) {
        let recorder = Recorder::default();
        let dispatcher =
            CueDispatcher::new(Box::new(recorder.clone()), Box::new(recorder.clone()));
        (dispatcher, recorder)
    }

    #[test]
    fn performs_every_effect_of_a_cue() {
        let (mut dispatcher, recorder) = recording();
        dispatcher.dispatch(&Event::CueFired {
            remaining: 0,
            effects: vec![CueEffect::speak("koniec"), CueEffect::Alarm],
        });
        assert_eq!(
            recorder.calls(),
            vec![HostCall::Speak("koniec".into()), HostCall::Alarm]
        );
    }

    #[test]
    fn ignores_events_without_effects() {
        let (mut dispatcher, recorder) = recording();
        dispatcher.dispatch(&Event::Remaining { secs: 3 });
        dispatcher.dispatch(&Event::Finished);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn metronome_plays_its_sound() {
        let (mut dispatcher, recorder) = recording();
        dispatcher.dispatch(&Event::Metronome {
            remaining: 9,
            effect: CueEffect::Tick,
        });
        assert_eq!(recorder.calls(), vec![HostCall::Tick]);
    }

    #[test]
    fn missing_capabilities_are_swallowed() {
        let mut dispatcher = CueDispatcher::new(
            Box::new(Unavailable("speech")),
            Box::new(Unavailable("audio")),
        );
        dispatcher.dispatch(&Event::CueFired {
            remaining: 0,
            effects: vec![CueEffect::speak("koniec"), CueEffect::Alarm],
        });
        assert_eq!(dispatcher.failures(), 2);
    }
}
