//! Playback engine: the note-shaping pipeline and the lookahead scheduler.
//!
//! Leaves first: `feel`, `humanize`, `density` and `fill` shape notes;
//! `playback_mode` decides pattern advance; `scheduler` drives them all
//! against an [`AudioClock`] and a [`VoiceTrigger`].

pub mod clock;
pub mod config;
pub mod density;
pub mod feel;
pub mod fill;
pub mod humanize;
pub mod playback_mode;
pub mod scheduler;
pub mod voice;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use config::SchedulerConfig;
pub use density::{DensityCurve, DensityGenerator};
pub use fill::Fill;
pub use humanize::Humanizer;
pub use playback_mode::{CycleDecision, PlaybackModeController};
pub use scheduler::{PlaybackListener, Scheduler, SchedulerState};
pub use voice::{RecordingVoices, TriggerEvent, VoiceTrigger};
