//! # Groove Core
//!
//! Device-independent core of the Groove drum sequencer: turns compact
//! pattern text into timed voice triggers and plays them against an audio
//! clock with swing, humanize, ghost notes and fills.
//!
//! ## Modules
//!
//! - `types`: voices, hits, steps, patterns, drum sets and playback state.
//! - `parser`: pattern text notation (`"kh . sh h"`).
//! - `engine`: the note-shaping pipeline (feel, humanize, density, fill),
//!   the loop/cycle controller and the lookahead `Scheduler`.
//! - `session`: the host-side owner of the drum set and playback state.
//! - `sequencer`: a session and a scheduler driven together.
//!
//! ## Features
//!
//! - **serde**: derive `Serialize`/`Deserialize` for the plain enums
//!   (`DrumSymbol`, `Feel`, `PlaybackMode`) so hosts can persist settings.
//!
//! ## Example
//!
//! ```
//! use groove_core::parser::{bar_count, parse};
//!
//! let steps = parse("kh . sh h").unwrap();
//! assert_eq!(steps.len(), 4);
//! assert!(steps[1].is_rest());
//! assert_eq!(bar_count(steps.len()), 1);
//! ```

pub mod engine;
pub mod error;
pub mod parser;
pub mod sequencer;
pub mod session;
pub mod tap_tempo;
pub mod types;

// Re-export commonly used types
pub use engine::{
    AudioClock, ManualClock, PlaybackListener, Scheduler, SchedulerConfig, SystemClock,
    VoiceTrigger,
};
pub use error::{EngineError, ParseError, PatternError};
pub use sequencer::Sequencer;
pub use session::{Session, SwitchOutcome};
pub use tap_tempo::TapTempo;
pub use types::{
    DrumSet, DrumSymbol, Feel, Hit, Pattern, PatternId, PlaybackMode, PlaybackState, Step,
};
