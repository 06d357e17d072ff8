// groove-core/src/types/mod.rs

pub mod drum;
pub mod drum_set;
pub mod pattern;
pub mod playback;
pub mod step;
pub mod time;

pub use drum::DrumSymbol;
pub use drum_set::{DrumSet, IdRemap};
pub use pattern::{Pattern, PatternId};
pub use playback::{Feel, PlaybackMode, PlaybackState};
pub use step::{Hit, Step, DEFAULT_VELOCITY};
pub use time::{StepTimeline, Time};
