//! Tap tempo.

use crate::types::drum_set::{MAX_BPM, MIN_BPM};
use std::collections::VecDeque;

/// Taps kept for averaging
pub const MAX_TAPS: usize = 4;
/// A pause longer than this starts a new tap sequence
pub const TAP_TIMEOUT: f64 = 2.0;

/// Turns a series of taps (timestamps in seconds) into a tempo
#[derive(Clone, Debug, Default)]
pub struct TapTempo {
    taps: VecDeque<f64>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap at `now`. Returns the tempo once two taps are in.
    pub fn tap(&mut self, now: f64) -> Option<u16> {
        if self
            .taps
            .back()
            .is_some_and(|&last| now - last > TAP_TIMEOUT || now < last)
        {
            self.taps.clear();
        }
        self.taps.push_back(now);
        while self.taps.len() > MAX_TAPS {
            self.taps.pop_front();
        }
        self.bpm()
    }

    /// Tempo from the taps so far, rounded and clamped to 40..=240
    pub fn bpm(&self) -> Option<u16> {
        let (first, last) = (self.taps.front()?, self.taps.back()?);
        let intervals = self.taps.len().checked_sub(1).filter(|&n| n > 0)?;
        let average = (last - first) / intervals as f64;
        if average <= 0.0 {
            return None;
        }
        let bpm = (60.0 / average).round();
        Some(bpm.clamp(f64::from(MIN_BPM), f64::from(MAX_BPM)) as u16)
    }

    pub fn reset(&mut self) {
        self.taps.clear();
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_two_taps() {
        let mut tap = TapTempo::new();
        assert_eq!(tap.tap(10.0), None);
        assert_eq!(tap.tap(10.5), Some(120));
    }

    #[test]
    fn test_averages_last_four() {
        let mut tap = TapTempo::new();
        // a slow first interval falls out of the window
        for t in [0.0, 1.5, 2.0, 2.5, 3.0] {
            tap.tap(t);
        }
        assert_eq!(tap.tap_count(), 4);
        assert_eq!(tap.bpm(), Some(120));
    }

    #[test]
    fn test_pause_starts_over() {
        let mut tap = TapTempo::new();
        tap.tap(0.0);
        tap.tap(0.5);
        assert_eq!(tap.tap(3.0), None);
        assert_eq!(tap.tap_count(), 1);
        assert_eq!(tap.tap(3.6), Some(100));
    }

    #[test]
    fn test_result_is_clamped() {
        let mut tap = TapTempo::new();
        tap.tap(0.0);
        assert_eq!(tap.tap(0.05), Some(240));
        tap.reset();
        tap.tap(10.0);
        assert_eq!(tap.tap(11.9), Some(40));
    }
}
