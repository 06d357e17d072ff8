//! Swing and shuffle timing.

use crate::parser::STEPS_PER_BAR;
use crate::types::Feel;

/// Fraction of a step the "and" of each beat is delayed under swing
pub const SWING_RATIO: f64 = 0.15;
/// Fraction of a step the "and" of each beat is delayed under shuffle
pub const SHUFFLE_RATIO: f64 = 0.25;

/// Delay in seconds for the step at `step_index`.
///
/// Only the third sixteenth of each beat (`index % 16 % 4 == 2`) moves.
pub fn timing_offset(step_index: usize, step_duration: f64, feel: Feel) -> f64 {
    if step_index % STEPS_PER_BAR % 4 != 2 {
        return 0.0;
    }
    match feel {
        Feel::Straight => 0.0,
        Feel::Swing => SWING_RATIO * step_duration,
        Feel::Shuffle => SHUFFLE_RATIO * step_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: f64 = 0.125;

    #[test]
    fn test_straight_never_moves() {
        for i in 0..64 {
            assert_eq!(timing_offset(i, DURATION, Feel::Straight), 0.0);
        }
    }

    #[test]
    fn test_swing_and_shuffle_delay_the_and() {
        for i in [2, 6, 10, 14, 18, 34] {
            assert!((timing_offset(i, DURATION, Feel::Swing) - 0.15 * DURATION).abs() < 1e-12);
            assert!((timing_offset(i, DURATION, Feel::Shuffle) - 0.25 * DURATION).abs() < 1e-12);
        }
    }

    #[test]
    fn test_other_steps_never_move() {
        for i in (0..64).filter(|i| i % 4 != 2) {
            assert_eq!(timing_offset(i, DURATION, Feel::Swing), 0.0);
            assert_eq!(timing_offset(i, DURATION, Feel::Shuffle), 0.0);
        }
    }
}
