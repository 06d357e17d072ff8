//! The voice-trigger seam between the scheduler and whatever makes sound.

use crate::types::DrumSymbol;

/// Receives every resolved hit, in non-decreasing `at_time` order.
///
/// `at_time` is in the same time base as the scheduler's
/// [`AudioClock`](super::AudioClock). Implementations must not block.
pub trait VoiceTrigger: Send {
    fn trigger(&mut self, voice: DrumSymbol, at_time: f64, velocity: f32);

    /// Whether samples (or synth voices) are loaded; `start` is refused until then
    fn is_ready(&self) -> bool {
        true
    }
}

/// One submitted trigger
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    pub voice: DrumSymbol,
    pub at_time: f64,
    pub velocity: f32,
}

/// Collects triggers in memory; used by tests and offline rendering
#[derive(Clone, Debug, Default)]
pub struct RecordingVoices {
    events: Vec<TriggerEvent>,
    not_ready: bool,
}

impl RecordingVoices {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that reports itself not ready
    pub fn not_ready() -> Self {
        Self {
            events: Vec::new(),
            not_ready: true,
        }
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl VoiceTrigger for RecordingVoices {
    fn trigger(&mut self, voice: DrumSymbol, at_time: f64, velocity: f32) {
        self.events.push(TriggerEvent {
            voice,
            at_time,
            velocity,
        });
    }

    fn is_ready(&self) -> bool {
        !self.not_ready
    }
}

impl<T: VoiceTrigger + ?Sized> VoiceTrigger for Box<T> {
    fn trigger(&mut self, voice: DrumSymbol, at_time: f64, velocity: f32) {
        (**self).trigger(voice, at_time, velocity);
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_voices() {
        let mut voices: Box<dyn VoiceTrigger> = Box::new(RecordingVoices::new());
        assert!(voices.is_ready());
        voices.trigger(DrumSymbol::Kick, 0.5, 0.8);

        let mut rec = RecordingVoices::new();
        rec.trigger(DrumSymbol::Snare, 1.0, 0.7);
        assert_eq!(rec.events().len(), 1);
        assert_eq!(rec.take()[0].voice, DrumSymbol::Snare);
        assert!(rec.events().is_empty());
        assert!(!RecordingVoices::not_ready().is_ready());
    }
}
