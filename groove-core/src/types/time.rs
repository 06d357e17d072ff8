//! Rational step timing
//!
//! A step lasts `60 / bpm / 4 = 15 / bpm` seconds. Step start times are
//! computed as `origin + steps * duration` with exact rationals instead of
//! summing floats, so a long performance never drifts against the clock.

use num_rational::Ratio;
use num_traits::ToPrimitive;

/// Exact duration in seconds
pub type Time = Ratio<i64>;

/// Sixteenth notes per beat
pub const STEPS_PER_BEAT: i64 = 4;

/// Duration of one sixteenth-note step at `bpm`
pub fn step_duration(bpm: u16) -> Time {
    Ratio::new(60, i64::from(bpm.max(1)) * STEPS_PER_BEAT)
}

/// Convert rational to f64 for the audio clock
#[inline]
pub fn to_f64(t: Time) -> f64 {
    t.to_f64().unwrap_or(0.0)
}

/// The step grid of a running scheduler.
///
/// Each tempo segment counts its steps exactly; on a tempo change the
/// elapsed segment is folded into the float base and a fresh segment starts
/// at the same instant, so already-elapsed steps keep their times.
#[derive(Clone, Debug)]
pub struct StepTimeline {
    origin: f64,
    step_duration: Time,
    steps_in_segment: i64,
}

impl StepTimeline {
    /// A timeline whose step 0 starts at clock time `origin`
    pub fn new(origin: f64, bpm: u16) -> Self {
        Self {
            origin,
            step_duration: step_duration(bpm),
            steps_in_segment: 0,
        }
    }

    /// Clock time at which the next unscheduled step starts
    pub fn next_step_time(&self) -> f64 {
        self.origin + to_f64(self.step_duration * self.steps_in_segment)
    }

    /// Step duration in seconds
    pub fn step_seconds(&self) -> f64 {
        to_f64(self.step_duration)
    }

    /// Move past the step just scheduled
    pub fn advance(&mut self) {
        self.steps_in_segment += 1;
    }

    /// Change tempo for every step not yet scheduled
    pub fn set_bpm(&mut self, bpm: u16) {
        self.origin = self.next_step_time();
        self.steps_in_segment = 0;
        self.step_duration = step_duration(bpm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_duration() {
        assert_eq!(step_duration(120), Ratio::new(1, 8));
        assert_eq!(step_duration(60), Ratio::new(1, 4));
        assert!((to_f64(step_duration(90)) - 60.0 / 90.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_timeline_has_no_drift() {
        let mut timeline = StepTimeline::new(1.0, 110);
        for _ in 0..100_000 {
            timeline.advance();
        }
        let expected = 1.0 + 100_000.0 * 15.0 / 110.0;
        assert!((timeline.next_step_time() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_keeps_elapsed_time() {
        let mut timeline = StepTimeline::new(0.0, 120);
        for _ in 0..4 {
            timeline.advance();
        }
        assert!((timeline.next_step_time() - 0.5).abs() < 1e-12);

        timeline.set_bpm(60);
        assert!((timeline.next_step_time() - 0.5).abs() < 1e-12);
        timeline.advance();
        assert!((timeline.next_step_time() - 0.75).abs() < 1e-12);
    }
}
