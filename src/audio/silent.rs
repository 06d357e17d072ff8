//! Output for machines without an audio device

use groove_core::{DrumSymbol, VoiceTrigger};
use tracing::debug;

/// Logs every trigger instead of playing it
#[derive(Clone, Debug, Default)]
pub struct LoggingVoices {
    triggered: u64,
}

impl LoggingVoices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> u64 {
        self.triggered
    }
}

impl VoiceTrigger for LoggingVoices {
    fn trigger(&mut self, voice: DrumSymbol, at_time: f64, velocity: f32) {
        self.triggered += 1;
        debug!(%voice, at_time, velocity, "trigger");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_triggers() {
        let mut voices = LoggingVoices::new();
        assert!(voices.is_ready());
        voices.trigger(DrumSymbol::Kick, 0.0, 0.8);
        voices.trigger(DrumSymbol::Snare, 0.125, 0.8);
        assert_eq!(voices.triggered(), 2);
    }
}
