//! Error types for pattern editing and engine preconditions.

use crate::types::pattern::{MAX_STEPS, MIN_STEPS};
use crate::types::PatternId;
use thiserror::Error;

/// Malformed pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid drum symbol: '{symbol}' in token '{token}'")]
    InvalidSymbol { symbol: char, token: String },
}

/// A rejected pattern edit. The last-known-good pattern stays active.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Pattern is empty")]
    Empty,
    #[error("Too short ({len} steps, min {MIN_STEPS})")]
    TooShort { len: usize },
    #[error("Too long ({len} steps, max {MAX_STEPS})")]
    TooLong { len: usize },
    #[error("No pattern with id {0}")]
    UnknownPattern(PatternId),
    #[error("Cannot remove the last pattern")]
    LastPattern,
    #[error("Pattern limit reached (max {0})")]
    LimitReached(usize),
}

/// An engine operation invoked while its preconditions do not hold.
///
/// These are non-fatal: the engine logs them and leaves playback as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("voices are not ready yet")]
    NotReady,
    #[error("cannot play an empty pattern")]
    EmptyPattern,
    #[error("not playing")]
    NotPlaying,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_symbol_and_token() {
        let err = ParseError::InvalidSymbol {
            symbol: 'x',
            token: "kx".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid drum symbol: 'x' in token 'kx'");
    }

    #[test]
    fn test_pattern_error_messages() {
        assert_eq!(
            PatternError::TooShort { len: 1 }.to_string(),
            "Too short (1 steps, min 2)"
        );
        assert_eq!(
            PatternError::TooLong { len: 65 }.to_string(),
            "Too long (65 steps, max 64)"
        );
    }
}
