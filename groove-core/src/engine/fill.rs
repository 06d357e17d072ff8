//! Drum fills.
//!
//! A fill replaces the tail of the pattern from the current position on.
//! Kicks stay where they are; every other voice is swapped for a tom/snare
//! figure picked from a table keyed by how many steps the fill spans.

use crate::types::{DrumSymbol, Hit, Step};

pub const FILL_VELOCITY: f32 = 0.85;
pub const ACCENT_VELOCITY: f32 = 1.0;
/// The last this-many steps of a fill are accented
pub const ACCENT_STEPS: usize = 2;

/// Result of [`generate`]
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    /// The whole pattern with its tail replaced
    pub steps: Vec<Step>,
    /// Whether a crash should land on the next downbeat
    pub should_crash: bool,
}

/// Build a fill running from `current_step` to the end of the pattern.
///
/// With one step or less remaining there is no room for a fill: the pattern
/// comes back unchanged and no crash is requested.
pub fn generate(pattern: &[Step], current_step: usize, pattern_length: usize) -> Fill {
    if pattern_length == 0 {
        return Fill {
            steps: pattern.to_vec(),
            should_crash: false,
        };
    }
    let position = current_step % pattern_length;
    let remaining = pattern_length - position;
    if remaining <= 1 {
        return Fill {
            steps: pattern.to_vec(),
            should_crash: false,
        };
    }

    let steps = pattern
        .iter()
        .enumerate()
        .map(|(i, step)| {
            if i < position || i >= pattern_length {
                return step.clone();
            }
            let mut hits: Vec<Hit> = step
                .hits()
                .iter()
                .copied()
                .filter(|h| h.voice().is_kick())
                .collect();
            hits.extend(fill_hit(pattern_length - i, remaining));
            Step::new(hits)
        })
        .collect();

    Fill {
        steps,
        should_crash: true,
    }
}

/// The crash that closes a fill
pub fn crash_hit() -> Hit {
    Hit::new(DrumSymbol::Crash, ACCENT_VELOCITY)
}

/// Fill voice for a step `steps_to_end` from the end of a `length`-step fill
fn fill_hit(steps_to_end: usize, length: usize) -> Option<Hit> {
    let progress = length - steps_to_end;
    let even = progress % 2 == 0;
    let snare = || {
        let velocity = if steps_to_end <= ACCENT_STEPS {
            ACCENT_VELOCITY
        } else {
            FILL_VELOCITY
        };
        Some(Hit::new(DrumSymbol::Snare, velocity))
    };
    let tom = |voice| Some(Hit::new(voice, FILL_VELOCITY));

    match length {
        // Snare roll
        0..=4 => snare(),
        // Alternating hi/mid toms, then snare
        5..=8 => {
            if progress < length.div_ceil(2) {
                tom(if even { DrumSymbol::HighTom } else { DrumSymbol::MidTom })
            } else {
                snare()
            }
        }
        // Sparse hi tom, mid tom, snare
        9..=12 => {
            let third = length.div_ceil(3);
            if progress < third {
                even.then(|| Hit::new(DrumSymbol::HighTom, FILL_VELOCITY))
            } else if progress < third * 2 {
                tom(DrumSymbol::MidTom)
            } else {
                snare()
            }
        }
        // Sparse hi tom, mid tom, low/mid alternating, snare
        _ => {
            let quarter = length.div_ceil(4);
            if progress < quarter {
                even.then(|| Hit::new(DrumSymbol::HighTom, FILL_VELOCITY * 0.9))
            } else if progress < quarter * 2 {
                tom(DrumSymbol::MidTom)
            } else if progress < quarter * 3 {
                tom(if even { DrumSymbol::LowTom } else { DrumSymbol::MidTom })
            } else {
                snare()
            }
        }
    }
}
