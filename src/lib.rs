//! # Groove
//!
//! A live, text-driven drum sequencer. Patterns are typed as compact step
//! strings (`"kh . sh h"`), played through a synthesized drum kit with
//! swing, humanize, generated ghost notes and on-demand fills, and edited
//! while they play.
//!
//! The sequencing itself lives in `groove-core`; this crate is the host
//! around it.
//!
//! ## Modules
//!
//! - `audio`: the cpal output stream, the synthesized drum voices and a
//!   silent fallback for machines without a sound device.
//! - `engine`: the shared sequencer and the ticker thread that drives it.
//! - `set_file`: JSON set files for load, save and hot reload.
//! - `commands`: the REPL command registry.
//! - `repl`: the interactive loop and the set file watcher.

pub mod audio;
pub mod commands;
pub mod engine;
pub mod repl;
pub mod set_file;

pub use crate::engine::Engine;
pub use crate::set_file::SetFile;
pub use groove_core::{DrumSet, DrumSymbol, Feel, PatternId, PlaybackMode};
