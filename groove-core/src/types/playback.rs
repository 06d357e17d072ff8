//! Feel, playback mode and the host-owned playback state.

use super::pattern::PatternId;
use std::fmt;
use std::str::FromStr;

/// Systematic delay applied to the off-beat sixteenths
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Feel {
    #[default]
    Straight,
    Swing,
    Shuffle,
}

impl fmt::Display for Feel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feel::Straight => "straight",
            Feel::Swing => "swing",
            Feel::Shuffle => "shuffle",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Feel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "straight" => Ok(Feel::Straight),
            "swing" => Ok(Feel::Swing),
            "shuffle" => Ok(Feel::Shuffle),
            other => Err(format!(
                "Unknown feel '{}' (expected straight, swing or shuffle)",
                other
            )),
        }
    }
}

/// How playback advances between patterns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlaybackMode {
    /// Repeat the current pattern forever
    #[default]
    Loop,
    /// Step through the patterns marked for cycling, each `repeat_count` times
    Cycle,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackMode::Loop => write!(f, "loop"),
            PlaybackMode::Cycle => write!(f, "cycle"),
        }
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loop" => Ok(PlaybackMode::Loop),
            "cycle" => Ok(PlaybackMode::Cycle),
            other => Err(format!("Unknown mode '{}' (expected loop or cycle)", other)),
        }
    }
}

/// Where playback is. The session is the only writer; the scheduler
/// reports progress through its listener callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_pattern_id: PatternId,
    /// Pending switch, applied at the next pattern boundary
    pub next_pattern_id: Option<PatternId>,
    pub current_step: usize,
    pub current_bar: u64,
    /// Completed loops of the current pattern (cycle mode)
    pub repeat_count: u32,
}

impl PlaybackState {
    pub fn new(current_pattern_id: PatternId) -> Self {
        Self {
            is_playing: false,
            current_pattern_id,
            next_pattern_id: None,
            current_step: 0,
            current_bar: 0,
            repeat_count: 0,
        }
    }
}
