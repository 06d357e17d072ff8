//! Audio host: where triggers go and where time comes from.

pub mod drum_synth;
pub mod output;
pub mod silent;

pub use output::{AudioOutput, DrumVoices, StreamClock};
pub use silent::LoggingVoices;

use anyhow::Result;
use groove_core::{AudioClock, SystemClock, VoiceTrigger};
use std::sync::Arc;
use tracing::warn;

/// A clock paired with the voices that play against it
pub struct AudioBackend {
    pub clock: Arc<dyn AudioClock>,
    pub voices: Box<dyn VoiceTrigger>,
    /// The open stream, if any; dropping it stops the sound
    pub output: Option<AudioOutput>,
}

impl AudioBackend {
    /// Open the default output device
    pub fn open(volume: f32) -> Result<Self> {
        let output = AudioOutput::open(volume)?;
        Ok(Self {
            clock: output.clock(),
            voices: Box::new(output.voices()),
            output: Some(output),
        })
    }

    /// Wall-clock time and logged triggers
    pub fn silent() -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            voices: Box::new(LoggingVoices::new()),
            output: None,
        }
    }

    /// Open the device unless `silent`; falls back to silent when it can't
    pub fn open_or_silent(silent: bool, volume: f32) -> Self {
        if silent {
            return Self::silent();
        }
        match Self::open(volume) {
            Ok(backend) => backend,
            Err(err) => {
                warn!(%err, "no audio output, running silent");
                Self::silent()
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }
}
