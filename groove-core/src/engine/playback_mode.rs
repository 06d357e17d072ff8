//! Loop and cycle pattern advance.

use crate::types::{Pattern, PatternId, PlaybackMode};
use tracing::debug;

/// What to do after the current pattern finishes a loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDecision {
    Stay,
    /// Queue this pattern as the pending switch
    Advance(PatternId),
}

/// Counts loops of the current pattern and picks the next one in cycle mode.
///
/// Decisions are only ever queued; the session applies them at a bar
/// boundary, so a pattern never changes mid-bar.
#[derive(Clone, Debug)]
pub struct PlaybackModeController {
    mode: PlaybackMode,
    current: PatternId,
    repeat_count: u32,
}

impl PlaybackModeController {
    pub fn new(mode: PlaybackMode, current: PatternId) -> Self {
        Self {
            mode,
            current,
            repeat_count: 0,
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.repeat_count = 0;
    }

    pub fn current(&self) -> PatternId {
        self.current
    }

    /// Make `id` current and start counting its repeats from zero
    pub fn set_current(&mut self, id: PatternId) {
        self.current = id;
        self.repeat_count = 0;
    }

    /// Follow a renumbering without losing the repeat count
    pub fn remap_current(&mut self, id: PatternId) {
        self.current = id;
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn reset(&mut self) {
        self.repeat_count = 0;
    }

    /// Called each time the current pattern plays through once
    pub fn on_pattern_loop(&mut self, patterns: &[Pattern]) -> CycleDecision {
        if self.mode == PlaybackMode::Loop {
            self.repeat_count = 0;
            return CycleDecision::Stay;
        }

        self.repeat_count += 1;
        let target = patterns
            .get(self.current.index())
            .map_or(1, |p| u32::from(p.repeat_count()));
        if self.repeat_count < target {
            return CycleDecision::Stay;
        }

        self.repeat_count = 0;
        match next_in_cycle(patterns, self.current) {
            Some(next) if next != self.current => {
                debug!(from = %self.current, to = %next, "cycle advance");
                CycleDecision::Advance(next)
            }
            _ => CycleDecision::Stay,
        }
    }
}

/// First pattern after `current` (wrapping) that is included in the cycle
fn next_in_cycle(patterns: &[Pattern], current: PatternId) -> Option<PatternId> {
    let len = patterns.len();
    if len == 0 {
        return None;
    }
    let start = current.index().min(len - 1);
    (1..=len)
        .map(|offset| (start + offset) % len)
        .find(|&i| patterns[i].include_in_cycle())
        .map(PatternId::from_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrumSet;

    fn two_patterns() -> DrumSet {
        DrumSet::from_texts(["k h s h", "k k s h"]).unwrap()
    }

    #[test]
    fn test_loop_mode_never_advances() {
        let set = two_patterns();
        let mut ctl = PlaybackModeController::new(PlaybackMode::Loop, PatternId(1));
        for _ in 0..10 {
            assert_eq!(ctl.on_pattern_loop(set.patterns()), CycleDecision::Stay);
            assert_eq!(ctl.repeat_count(), 0);
        }
    }

    #[test]
    fn test_cycle_round_robin() {
        let set = two_patterns();
        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(1));
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(2))
        );
        ctl.set_current(PatternId(2));
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(1))
        );
    }

    #[test]
    fn test_cycle_skips_excluded_patterns() {
        let mut set = DrumSet::from_texts(["k s", "k h", "s h"]).unwrap();
        set.pattern_mut(PatternId(2)).unwrap().set_include_in_cycle(false);
        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(1));
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(3))
        );

        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(2));
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(3))
        );
    }

    #[test]
    fn test_excluded_second_pattern_returns_to_first() {
        let mut set = two_patterns();
        set.pattern_mut(PatternId(2)).unwrap().set_include_in_cycle(false);
        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(2));
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(1))
        );
        ctl.set_current(PatternId(1));
        assert_eq!(ctl.on_pattern_loop(set.patterns()), CycleDecision::Stay);
    }

    #[test]
    fn test_repeat_target_is_honoured() {
        let mut set = two_patterns();
        set.pattern_mut(PatternId(1)).unwrap().set_repeat_count(3);
        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(1));
        assert_eq!(ctl.on_pattern_loop(set.patterns()), CycleDecision::Stay);
        assert_eq!(ctl.repeat_count(), 1);
        assert_eq!(ctl.on_pattern_loop(set.patterns()), CycleDecision::Stay);
        assert_eq!(
            ctl.on_pattern_loop(set.patterns()),
            CycleDecision::Advance(PatternId(2))
        );
        assert_eq!(ctl.repeat_count(), 0);
    }

    #[test]
    fn test_nothing_included_stays_and_resets() {
        let mut set = two_patterns();
        for id in [PatternId(1), PatternId(2)] {
            set.pattern_mut(id).unwrap().set_include_in_cycle(false);
        }
        let mut ctl = PlaybackModeController::new(PlaybackMode::Cycle, PatternId(1));
        for _ in 0..5 {
            assert_eq!(ctl.on_pattern_loop(set.patterns()), CycleDecision::Stay);
            assert_eq!(ctl.repeat_count(), 0);
        }
    }
}
