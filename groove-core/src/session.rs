//! Host-side playback state.
//!
//! The [`Session`] owns the drum set and is the only writer of
//! [`PlaybackState`]. It hears about progress through [`PlaybackListener`]
//! and answers bar boundaries with the pattern to switch to, if any.

use crate::engine::{CycleDecision, PlaybackListener, PlaybackModeController};
use crate::error::PatternError;
use crate::types::{DrumSet, IdRemap, Pattern, PatternId, PlaybackMode, PlaybackState, Step};
use std::sync::Arc;
use tracing::{debug, info};

/// What a pattern switch request did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Stopped: the pattern is current right away
    Switched,
    /// Playing: the pattern takes over at the next bar boundary
    Queued,
    /// Playing and already current; hosts usually answer with a fill
    AlreadyActive,
}

#[derive(Debug)]
pub struct Session {
    set: DrumSet,
    controller: PlaybackModeController,
    is_playing: bool,
    next: Option<PatternId>,
    current_step: usize,
    current_bar: u64,
    fill_on_switch: bool,
}

impl Session {
    pub fn new(set: DrumSet) -> Self {
        let controller = PlaybackModeController::new(set.mode(), set.first_id());
        Self {
            set,
            controller,
            is_playing: false,
            next: None,
            current_step: 0,
            current_bar: 0,
            fill_on_switch: false,
        }
    }

    pub fn set(&self) -> &DrumSet {
        &self.set
    }

    /// Mutable access for plain parameter edits (tempo, feel, volume ...).
    /// Structural edits go through the session so ids stay consistent.
    pub fn set_mut(&mut self) -> &mut DrumSet {
        &mut self.set
    }

    /// Snapshot of where playback is
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_playing,
            current_pattern_id: self.controller.current(),
            next_pattern_id: self.next,
            current_step: self.current_step,
            current_bar: self.current_bar,
            repeat_count: self.controller.repeat_count(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_id(&self) -> PatternId {
        self.controller.current()
    }

    pub fn next_id(&self) -> Option<PatternId> {
        self.next
    }

    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.set.pattern(self.controller.current())
    }

    /// Steps of the current pattern (empty only if the set is inconsistent)
    pub fn current_steps(&self) -> Arc<[Step]> {
        self.current_pattern()
            .map(|p| p.steps().clone())
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn fill_on_switch(&self) -> bool {
        self.fill_on_switch
    }

    pub fn set_fill_on_switch(&mut self, enabled: bool) {
        self.fill_on_switch = enabled;
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.set.set_mode(mode);
        self.controller.set_mode(mode);
    }

    /// Record a transport change. Starting resets position and repeat
    /// counting; stopping promotes a queued switch.
    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
        self.current_step = 0;
        self.current_bar = 0;
        self.controller.reset();
        if !playing {
            if let Some(next) = self.next.take() {
                self.controller.set_current(next);
            }
        }
    }

    /// Select a pattern: immediate when stopped, queued when playing
    pub fn switch_pattern(&mut self, id: PatternId) -> Result<SwitchOutcome, PatternError> {
        if self.set.pattern(id).is_none() {
            return Err(PatternError::UnknownPattern(id));
        }
        if !self.is_playing {
            self.controller.set_current(id);
            self.next = None;
            return Ok(SwitchOutcome::Switched);
        }
        if id == self.controller.current() {
            self.next = None;
            return Ok(SwitchOutcome::AlreadyActive);
        }
        debug!(pattern = %id, "switch queued");
        self.next = Some(id);
        Ok(SwitchOutcome::Queued)
    }

    pub fn set_pattern_text(&mut self, id: PatternId, text: &str) -> Result<(), PatternError> {
        self.set.set_pattern_text(id, text)
    }

    pub fn add_pattern(&mut self, text: &str) -> Result<PatternId, PatternError> {
        self.set.add_pattern(text)
    }

    pub fn remove_pattern(&mut self, id: PatternId) -> Result<(), PatternError> {
        let remap = self.set.remove_pattern(id)?;
        self.apply_remap(&remap);
        Ok(())
    }

    pub fn move_pattern(&mut self, from: PatternId, to: PatternId) -> Result<(), PatternError> {
        let remap = self.set.move_pattern(from, to)?;
        self.apply_remap(&remap);
        Ok(())
    }

    pub fn set_repeat_count(&mut self, id: PatternId, count: u32) -> Result<u8, PatternError> {
        Ok(self.set.pattern_mut(id)?.set_repeat_count(count))
    }

    pub fn set_include_in_cycle(&mut self, id: PatternId, include: bool) -> Result<(), PatternError> {
        self.set.pattern_mut(id)?.set_include_in_cycle(include);
        Ok(())
    }

    pub fn set_display_name(
        &mut self,
        id: PatternId,
        name: Option<String>,
    ) -> Result<(), PatternError> {
        self.set.pattern_mut(id)?.set_display_name(name);
        Ok(())
    }

    /// Replace the whole drum set, keeping the current id where it still exists
    pub fn load_set(&mut self, set: DrumSet) {
        let remap = set.unchanged();
        self.set = set;
        self.controller.set_mode(self.set.mode());
        self.apply_remap(&remap);
    }

    fn apply_remap(&mut self, remap: &IdRemap) {
        let current = remap.resolve(self.controller.current());
        if current != self.controller.current() {
            debug!(from = %self.controller.current(), to = %current, "current pattern renumbered");
        }
        self.controller.remap_current(current);
        self.next = self
            .next
            .map(|id| remap.resolve(id))
            .filter(|&id| id != current);
    }
}

impl PlaybackListener for Session {
    fn on_step(&mut self, step: usize) {
        self.current_step = step;
    }

    fn on_bar(&mut self, bar: u64, step: usize) -> Option<Arc<[Step]>> {
        self.current_bar = bar;
        if !self.is_playing {
            return None;
        }
        if step == 0 {
            if let CycleDecision::Advance(id) = self.controller.on_pattern_loop(self.set.patterns())
            {
                self.next.get_or_insert(id);
            }
        }

        let next = self.next.take()?;
        if next == self.controller.current() || self.set.pattern(next).is_none() {
            return None;
        }
        info!(from = %self.controller.current(), to = %next, bar, "pattern switch");
        self.controller.set_current(next);
        Some(self.current_steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(set: DrumSet) -> Session {
        let mut session = Session::new(set);
        session.set_playing(true);
        session
    }

    #[test]
    fn test_switch_when_stopped_is_immediate() {
        let mut session = Session::new(DrumSet::default());
        assert_eq!(session.switch_pattern(PatternId(3)), Ok(SwitchOutcome::Switched));
        assert_eq!(session.current_id(), PatternId(3));
        assert_eq!(session.next_id(), None);
    }

    #[test]
    fn test_switch_while_playing_waits_for_bar() {
        let mut session = playing(DrumSet::default());
        assert_eq!(session.switch_pattern(PatternId(2)), Ok(SwitchOutcome::Queued));
        assert_eq!(session.current_id(), PatternId(1));
        assert_eq!(session.next_id(), Some(PatternId(2)));

        session.on_step(5);
        assert_eq!(session.current_id(), PatternId(1));

        let steps = session.on_bar(1, 0).unwrap();
        assert_eq!(session.current_id(), PatternId(2));
        assert_eq!(session.next_id(), None);
        assert_eq!(steps.len(), 8);
    }

    #[test]
    fn test_selecting_active_pattern_reports_it() {
        let mut session = playing(DrumSet::default());
        assert_eq!(
            session.switch_pattern(PatternId(1)),
            Ok(SwitchOutcome::AlreadyActive)
        );
        assert_eq!(
            session.switch_pattern(PatternId(9)),
            Err(PatternError::UnknownPattern(PatternId(9)))
        );
    }

    #[test]
    fn test_cycle_mode_round_robin() {
        let mut set = DrumSet::from_texts(["k h s h", "k k s h"]).unwrap();
        set.set_mode(PlaybackMode::Cycle);
        let mut session = playing(set);

        assert!(session.on_bar(1, 0).is_some());
        assert_eq!(session.current_id(), PatternId(2));
        assert!(session.on_bar(2, 0).is_some());
        assert_eq!(session.current_id(), PatternId(1));
    }

    #[test]
    fn test_cycle_waits_for_pattern_loop() {
        let texts = [vec!["h"; 32].join(" "), "k s".to_string()];
        let mut set = DrumSet::from_texts(texts.iter().map(String::as_str)).unwrap();
        set.set_mode(PlaybackMode::Cycle);
        let mut session = playing(set);

        // mid-pattern bar boundary of a two-bar pattern
        assert!(session.on_bar(1, 16).is_none());
        assert_eq!(session.state().repeat_count, 0);
        assert!(session.on_bar(2, 0).is_some());
        assert_eq!(session.current_id(), PatternId(2));
    }

    #[test]
    fn test_user_switch_beats_cycle_choice() {
        let mut set = DrumSet::default();
        set.set_mode(PlaybackMode::Cycle);
        let mut session = playing(set);
        session.switch_pattern(PatternId(4)).unwrap();
        session.on_bar(1, 0);
        assert_eq!(session.current_id(), PatternId(4));
    }

    #[test]
    fn test_loop_mode_never_switches_on_its_own() {
        let mut session = playing(DrumSet::default());
        for bar in 1..10 {
            assert!(session.on_bar(bar, 0).is_none());
        }
        assert_eq!(session.current_id(), PatternId(1));
    }

    #[test]
    fn test_removing_current_clamps() {
        let mut session = Session::new(DrumSet::default());
        session.switch_pattern(PatternId(4)).unwrap();
        session.remove_pattern(PatternId(4)).unwrap();
        assert_eq!(session.current_id(), PatternId(3));
        assert_eq!(session.current_pattern().unwrap().raw_text(), "kh . sh . kh . sh .");
    }

    #[test]
    fn test_remove_remaps_current_and_next() {
        let mut session = playing(DrumSet::default());
        session.switch_pattern(PatternId(3)).unwrap();
        session.remove_pattern(PatternId(1)).unwrap();
        // old 1 vanished and clamps to new 1; old 3 is now 2
        assert_eq!(session.current_id(), PatternId(1));
        assert_eq!(session.next_id(), Some(PatternId(2)));
    }

    #[test]
    fn test_pending_switch_equal_to_current_is_dropped() {
        let mut session = playing(DrumSet::default());
        session.switch_pattern(PatternId(2)).unwrap();
        session.remove_pattern(PatternId(1)).unwrap();
        assert_eq!(session.current_id(), PatternId(1));
        assert_eq!(session.next_id(), None);
    }

    #[test]
    fn test_move_follows_current() {
        let mut session = Session::new(DrumSet::default());
        session.move_pattern(PatternId(1), PatternId(4)).unwrap();
        assert_eq!(session.current_id(), PatternId(4));
        assert_eq!(session.current_pattern().unwrap().raw_text(), "k h s h k h s h");
    }

    #[test]
    fn test_stop_promotes_queued_switch() {
        let mut session = playing(DrumSet::default());
        session.switch_pattern(PatternId(2)).unwrap();
        session.set_playing(false);
        assert_eq!(session.current_id(), PatternId(2));
        assert!(!session.state().is_playing);
    }

    #[test]
    fn test_state_tracks_callbacks() {
        let mut session = playing(DrumSet::default());
        session.on_step(3);
        session.on_bar(4, 0);
        let state = session.state();
        assert_eq!(state.current_step, 3);
        assert_eq!(state.current_bar, 4);
    }

    #[test]
    fn test_load_set_clamps_current() {
        let mut session = Session::new(DrumSet::default());
        session.switch_pattern(PatternId(4)).unwrap();
        session.load_set(DrumSet::from_texts(["k s", "s k"]).unwrap());
        assert_eq!(session.current_id(), PatternId(2));
    }
}
