//! Drum voice symbols and their General MIDI mappings
//!
//! Every voice is written as a single character in pattern text; a token
//! like `kh` layers a kick and a closed hi-hat on the same step.

use std::fmt;

/// Percussion voice, one per pattern-text character
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrumSymbol {
    /// `k` - bass drum (GM 36)
    Kick,
    /// `B` - bass drum alias (GM 35)
    BassDrum,
    /// `s` - acoustic snare (GM 38)
    Snare,
    /// `h` - closed hi-hat (GM 42)
    ClosedHat,
    /// `H` - open hi-hat (GM 46)
    OpenHat,
    /// `c` - crash cymbal (GM 49)
    Crash,
    /// `r` - ride cymbal (GM 51)
    Ride,
    /// `t` - mid tom (GM 47)
    MidTom,
    /// `T` - high tom (GM 50)
    HighTom,
    /// `f` - floor / low tom (GM 43)
    LowTom,
    /// `p` - hand clap (GM 39)
    Clap,
    /// `w` - cowbell (GM 56)
    Cowbell,
    /// `m` - tambourine (GM 54)
    Tambourine,
    /// `S` - splash cymbal (GM 55)
    Splash,
    /// `C` - china cymbal (GM 52)
    China,
    /// `a` - high agogo (GM 67)
    HighAgogo,
    /// `A` - low agogo (GM 68)
    LowAgogo,
}

impl DrumSymbol {
    /// Every voice, in pattern-symbol order
    pub const ALL: [DrumSymbol; 17] = [
        DrumSymbol::Kick,
        DrumSymbol::BassDrum,
        DrumSymbol::Snare,
        DrumSymbol::ClosedHat,
        DrumSymbol::OpenHat,
        DrumSymbol::Crash,
        DrumSymbol::Ride,
        DrumSymbol::MidTom,
        DrumSymbol::HighTom,
        DrumSymbol::LowTom,
        DrumSymbol::Clap,
        DrumSymbol::Cowbell,
        DrumSymbol::Tambourine,
        DrumSymbol::Splash,
        DrumSymbol::China,
        DrumSymbol::HighAgogo,
        DrumSymbol::LowAgogo,
    ];

    /// Look up the voice written as `c` in pattern text (case-sensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'k' => Some(DrumSymbol::Kick),
            'B' => Some(DrumSymbol::BassDrum),
            's' => Some(DrumSymbol::Snare),
            'h' => Some(DrumSymbol::ClosedHat),
            'H' => Some(DrumSymbol::OpenHat),
            'c' => Some(DrumSymbol::Crash),
            'r' => Some(DrumSymbol::Ride),
            't' => Some(DrumSymbol::MidTom),
            'T' => Some(DrumSymbol::HighTom),
            'f' => Some(DrumSymbol::LowTom),
            'p' => Some(DrumSymbol::Clap),
            'w' => Some(DrumSymbol::Cowbell),
            'm' => Some(DrumSymbol::Tambourine),
            'S' => Some(DrumSymbol::Splash),
            'C' => Some(DrumSymbol::China),
            'a' => Some(DrumSymbol::HighAgogo),
            'A' => Some(DrumSymbol::LowAgogo),
            _ => None,
        }
    }

    /// The character this voice is written as
    pub fn symbol(&self) -> char {
        match self {
            DrumSymbol::Kick => 'k',
            DrumSymbol::BassDrum => 'B',
            DrumSymbol::Snare => 's',
            DrumSymbol::ClosedHat => 'h',
            DrumSymbol::OpenHat => 'H',
            DrumSymbol::Crash => 'c',
            DrumSymbol::Ride => 'r',
            DrumSymbol::MidTom => 't',
            DrumSymbol::HighTom => 'T',
            DrumSymbol::LowTom => 'f',
            DrumSymbol::Clap => 'p',
            DrumSymbol::Cowbell => 'w',
            DrumSymbol::Tambourine => 'm',
            DrumSymbol::Splash => 'S',
            DrumSymbol::China => 'C',
            DrumSymbol::HighAgogo => 'a',
            DrumSymbol::LowAgogo => 'A',
        }
    }

    /// Sample (or synth model) name; aliases share a sample
    pub fn sample_name(&self) -> &'static str {
        match self {
            DrumSymbol::Kick | DrumSymbol::BassDrum => "kick",
            DrumSymbol::Snare => "snare",
            DrumSymbol::ClosedHat => "hatClosed",
            DrumSymbol::OpenHat => "hatOpen",
            DrumSymbol::Crash => "crash",
            DrumSymbol::Ride => "ride",
            DrumSymbol::MidTom => "midTom",
            DrumSymbol::HighTom => "hiTom",
            DrumSymbol::LowTom => "lowTom",
            DrumSymbol::Clap => "clap",
            DrumSymbol::Cowbell => "cowbell",
            DrumSymbol::Tambourine => "tamb",
            DrumSymbol::Splash => "splash",
            DrumSymbol::China => "china",
            DrumSymbol::HighAgogo => "hiAgogo",
            DrumSymbol::LowAgogo => "lowAgogo",
        }
    }

    /// General MIDI percussion note number (channel 10)
    pub fn midi_note(&self) -> u8 {
        match self {
            DrumSymbol::Kick => 36,
            DrumSymbol::BassDrum => 35,
            DrumSymbol::Snare => 38,
            DrumSymbol::ClosedHat => 42,
            DrumSymbol::OpenHat => 46,
            DrumSymbol::Crash => 49,
            DrumSymbol::Ride => 51,
            DrumSymbol::MidTom => 47,
            DrumSymbol::HighTom => 50,
            DrumSymbol::LowTom => 43,
            DrumSymbol::Clap => 39,
            DrumSymbol::Cowbell => 56,
            DrumSymbol::Tambourine => 54,
            DrumSymbol::Splash => 55,
            DrumSymbol::China => 52,
            DrumSymbol::HighAgogo => 67,
            DrumSymbol::LowAgogo => 68,
        }
    }

    /// Kick voices anchor the groove and survive fills
    pub fn is_kick(&self) -> bool {
        matches!(self, DrumSymbol::Kick | DrumSymbol::BassDrum)
    }

    /// Timekeeping voices; density never doubles a step that has one
    pub fn is_timekeeper(&self) -> bool {
        matches!(
            self,
            DrumSymbol::ClosedHat | DrumSymbol::OpenHat | DrumSymbol::Ride
        )
    }
}

impl fmt::Display for DrumSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(DrumSymbol::from_char('k'), Some(DrumSymbol::Kick));
        assert_eq!(DrumSymbol::from_char('B'), Some(DrumSymbol::BassDrum));
        assert_eq!(DrumSymbol::from_char('H'), Some(DrumSymbol::OpenHat));
        assert_eq!(DrumSymbol::from_char('T'), Some(DrumSymbol::HighTom));
        assert_eq!(DrumSymbol::from_char('x'), None);
        assert_eq!(DrumSymbol::from_char('K'), None); // case sensitive
    }

    #[test]
    fn test_every_voice_round_trips_through_its_symbol() {
        for voice in DrumSymbol::ALL {
            assert_eq!(DrumSymbol::from_char(voice.symbol()), Some(voice));
        }
    }

    #[test]
    fn test_aliases_share_a_sample() {
        assert_eq!(
            DrumSymbol::Kick.sample_name(),
            DrumSymbol::BassDrum.sample_name()
        );
        assert!(DrumSymbol::BassDrum.is_kick());
        assert!(!DrumSymbol::Snare.is_kick());
    }

    #[test]
    fn test_midi_notes() {
        assert_eq!(DrumSymbol::Kick.midi_note(), 36);
        assert_eq!(DrumSymbol::Snare.midi_note(), 38);
        assert_eq!(DrumSymbol::ClosedHat.midi_note(), 42);
        assert_eq!(DrumSymbol::Crash.midi_note(), 49);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DrumSymbol::Kick), "k");
        assert_eq!(format!("{}", DrumSymbol::LowAgogo), "A");
    }
}
