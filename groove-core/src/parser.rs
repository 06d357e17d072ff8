//! Pattern text notation.
//!
//! Whitespace-separated tokens, one per sixteenth-note step. `.` is a rest;
//! any other token is one or more voice symbols sounding together:
//!
//! ```text
//! kh . sh h      kick+hat, rest, snare+hat, hat
//! ```

use crate::error::{ParseError, PatternError};
use crate::types::pattern::{MAX_STEPS, MIN_STEPS};
use crate::types::{DrumSymbol, Hit, Step, DEFAULT_VELOCITY};

/// Steps in one 4/4 bar
pub const STEPS_PER_BAR: usize = 16;

/// Token that marks a rest
pub const REST_TOKEN: &str = ".";

/// Parse pattern text into steps. Blank text yields no steps.
pub fn parse(text: &str) -> Result<Vec<Step>, ParseError> {
    text.split_whitespace().map(parse_token).collect()
}

fn parse_token(token: &str) -> Result<Step, ParseError> {
    if token == REST_TOKEN {
        return Ok(Step::rest());
    }
    let hits = token
        .chars()
        .map(|c| {
            DrumSymbol::from_char(c)
                .map(|voice| Hit::new(voice, DEFAULT_VELOCITY))
                .ok_or_else(|| ParseError::InvalidSymbol {
                    symbol: c,
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Step::new(hits))
}

/// Bars needed to hold `steps` steps
pub fn bar_count(steps: usize) -> usize {
    steps.div_ceil(STEPS_PER_BAR)
}

/// Check a parsed length against the editor's bounds
pub fn validate_length(len: usize) -> Result<(), PatternError> {
    match len {
        0 => Err(PatternError::Empty),
        n if n < MIN_STEPS => Err(PatternError::TooShort { len: n }),
        n if n > MAX_STEPS => Err(PatternError::TooLong { len: n }),
        _ => Ok(()),
    }
}

/// Render steps back into notation
pub fn format_steps(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
