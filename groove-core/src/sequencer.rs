//! A [`Session`] and a [`Scheduler`] wired together.
//!
//! Every host operation goes through here so the two stay in step: edits
//! that touch the sounding pattern are pushed to the scheduler, transport
//! changes are mirrored into the playback state, and [`Sequencer::tick`]
//! hands the session to the scheduler as its listener.

use crate::engine::{Scheduler, VoiceTrigger};
use crate::error::{EngineError, PatternError};
use crate::session::{Session, SwitchOutcome};
use crate::types::{DrumSet, Feel, PatternId, PlaybackMode, PlaybackState, Step};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Sequencer<V: VoiceTrigger> {
    session: Session,
    scheduler: Scheduler<V>,
}

impl<V: VoiceTrigger> Sequencer<V> {
    pub fn new(set: DrumSet, scheduler: Scheduler<V>) -> Self {
        let mut sequencer = Self {
            session: Session::new(set),
            scheduler,
        };
        sequencer.push_parameters();
        let _ = sequencer
            .scheduler
            .update_pattern(sequencer.session.current_steps());
        sequencer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler<V> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<V> {
        &mut self.scheduler
    }

    pub fn set(&self) -> &DrumSet {
        self.session.set()
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    /// Run one scheduling pass; returns the number of steps submitted
    pub fn tick(&mut self) -> usize {
        self.scheduler.tick(&mut self.session)
    }

    pub fn play(&mut self) -> Result<(), EngineError> {
        self.push_parameters();
        let steps = self.session.current_steps();
        self.scheduler.start(steps, self.session.set().bpm())?;
        self.session.set_playing(true);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
        if self.session.is_playing() {
            self.session.set_playing(false);
            self.sync_pattern();
        }
    }

    pub fn set_bpm(&mut self, bpm: u32) -> u16 {
        let bpm = self.session.set_mut().set_bpm(bpm);
        self.scheduler.set_bpm(bpm);
        bpm
    }

    pub fn set_feel(&mut self, feel: Feel) {
        self.session.set_mut().set_feel(feel);
        self.scheduler.set_feel(feel);
    }

    pub fn set_humanize(&mut self, amount: f32) -> f32 {
        let amount = self.session.set_mut().set_humanize(amount);
        self.scheduler.set_humanize(amount);
        amount
    }

    pub fn set_density(&mut self, amount: f32) -> f32 {
        let amount = self.session.set_mut().set_density(amount);
        self.scheduler.set_density(amount);
        amount
    }

    /// Stored for the output stage; the scheduler never scales velocities by it
    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        self.session.set_mut().set_master_volume(volume)
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.session.set_mode(mode);
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.session.set_mut().set_name(name);
    }

    pub fn set_fill_on_switch(&mut self, enabled: bool) {
        self.session.set_fill_on_switch(enabled);
    }

    pub fn trigger_fill(&mut self) -> Result<bool, EngineError> {
        self.scheduler.trigger_fill()
    }

    /// Switch patterns. Selecting the sounding pattern while playing fires a
    /// fill; with fill-on-switch enabled a queued switch fires one too.
    pub fn switch_pattern(&mut self, id: PatternId) -> Result<SwitchOutcome, PatternError> {
        let outcome = self.session.switch_pattern(id)?;
        match outcome {
            SwitchOutcome::Switched => self.sync_pattern(),
            SwitchOutcome::AlreadyActive => self.fill_quietly(),
            SwitchOutcome::Queued if self.session.fill_on_switch() => self.fill_quietly(),
            SwitchOutcome::Queued => {}
        }
        Ok(outcome)
    }

    /// Replace a pattern's text. A rejected edit leaves playback untouched.
    pub fn set_pattern_text(&mut self, id: PatternId, text: &str) -> Result<(), PatternError> {
        self.edit(|session| session.set_pattern_text(id, text))
    }

    pub fn add_pattern(&mut self, text: &str) -> Result<PatternId, PatternError> {
        self.edit(|session| session.add_pattern(text))
    }

    pub fn remove_pattern(&mut self, id: PatternId) -> Result<(), PatternError> {
        self.edit(|session| session.remove_pattern(id))
    }

    pub fn move_pattern(&mut self, from: PatternId, to: PatternId) -> Result<(), PatternError> {
        self.edit(|session| session.move_pattern(from, to))
    }

    pub fn set_repeat_count(&mut self, id: PatternId, count: u32) -> Result<u8, PatternError> {
        self.session.set_repeat_count(id, count)
    }

    pub fn set_include_in_cycle(&mut self, id: PatternId, include: bool) -> Result<(), PatternError> {
        self.session.set_include_in_cycle(id, include)
    }

    pub fn set_display_name(
        &mut self,
        id: PatternId,
        name: Option<String>,
    ) -> Result<(), PatternError> {
        self.session.set_display_name(id, name)
    }

    /// Swap in a whole drum set (load or hot reload) without stopping
    pub fn load_set(&mut self, set: DrumSet) {
        info!(patterns = set.len(), bpm = set.bpm(), "drum set loaded");
        self.session.load_set(set);
        self.push_parameters();
        self.sync_pattern();
    }

    fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut Session) -> Result<T, PatternError>,
    ) -> Result<T, PatternError> {
        let result = f(&mut self.session);
        match &result {
            Ok(_) => self.sync_pattern(),
            Err(err) => warn!(%err, "edit rejected"),
        }
        result
    }

    /// Push the current pattern to the scheduler if it changed
    fn sync_pattern(&mut self) {
        let steps: Arc<[Step]> = self.session.current_steps();
        if !Arc::ptr_eq(&steps, self.scheduler.pattern()) {
            let _ = self.scheduler.update_pattern(steps);
        }
    }

    fn push_parameters(&mut self) {
        let set = self.session.set();
        let (bpm, feel, humanize, density) = (set.bpm(), set.feel(), set.humanize(), set.density());
        self.scheduler.set_bpm(bpm);
        self.scheduler.set_feel(feel);
        self.scheduler.set_humanize(humanize);
        self.scheduler.set_density(density);
    }

    fn fill_quietly(&mut self) {
        if let Err(err) = self.scheduler.trigger_fill() {
            warn!(%err, "fill skipped");
        }
    }
}
