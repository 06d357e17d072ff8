//! Lookahead scheduler
//!
//! The host calls [`Scheduler::tick`] on a fixed cadence (25 ms by default).
//! Each tick submits every step that starts before `now + lookahead` to the
//! voice trigger, with feel, humanize, density and any active fill applied,
//! then reports progress to a [`PlaybackListener`]. Steps already submitted
//! are never revisited, so parameter changes only reach steps that are still
//! ahead of the window.

use super::clock::AudioClock;
use super::config::SchedulerConfig;
use super::density::{DensityCurve, DensityGenerator};
use super::feel;
use super::fill;
use super::humanize::Humanizer;
use super::voice::VoiceTrigger;
use crate::error::EngineError;
use crate::parser::STEPS_PER_BAR;
use crate::types::{DrumSymbol, Feel, Hit, Step, StepTimeline};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Progress reports from the scheduler to its host
pub trait PlaybackListener {
    /// Called with the new current step after every advance
    fn on_step(&mut self, _step: usize) {}

    /// Called after the bar counter moves; `step` is the step the new bar
    /// starts on. The density buffer is already rebuilt when this fires.
    /// Returning steps swaps the active pattern before anything else of the
    /// new bar is scheduled.
    fn on_bar(&mut self, _bar: u64, _step: usize) -> Option<Arc<[Step]>> {
        None
    }
}

/// Listener that ignores everything
impl PlaybackListener for () {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Playing,
}

#[derive(Clone, Debug, PartialEq)]
enum FillState {
    None,
    /// Overlay for the bar starting at `bar_start`, sounding from `from` on.
    /// `crash_first` carries a crash still owed by the previous fill.
    Active {
        bar_start: usize,
        from: usize,
        steps: Vec<Step>,
        crash_first: bool,
    },
    /// Crash due on the next downbeat
    CrashPending,
}

/// The step timing loop. Generic over the voice sink so tests can inspect
/// exactly what was triggered.
pub struct Scheduler<V: VoiceTrigger> {
    config: SchedulerConfig,
    clock: Arc<dyn AudioClock>,
    voices: V,
    humanizer: Humanizer,
    density: DensityGenerator,

    bpm: u16,
    feel: Feel,
    humanize: f32,
    density_amount: f32,

    state: SchedulerState,
    pattern: Arc<[Step]>,
    /// Density-processed copy of `pattern` for the current bar; rebuilt whole
    bar_steps: Arc<[Step]>,
    timeline: StepTimeline,
    current_step: usize,
    current_bar: u64,
    fill: FillState,
    last_submitted: f64,
}

impl<V: VoiceTrigger> Scheduler<V> {
    pub fn new(clock: Arc<dyn AudioClock>, voices: V, config: SchedulerConfig) -> Self {
        let empty: Arc<[Step]> = Arc::from(Vec::new());
        Self {
            config,
            clock,
            voices,
            humanizer: Humanizer::new(),
            density: DensityGenerator::default(),
            bpm: crate::types::drum_set::DEFAULT_BPM,
            feel: Feel::Straight,
            humanize: 0.0,
            density_amount: 0.0,
            state: SchedulerState::Idle,
            pattern: empty.clone(),
            bar_steps: empty,
            timeline: StepTimeline::new(0.0, crate::types::drum_set::DEFAULT_BPM),
            current_step: 0,
            current_bar: 0,
            fill: FillState::None,
            last_submitted: f64::MIN,
        }
    }

    /// Replace the humanize random source (seeded in tests)
    pub fn with_humanizer(mut self, humanizer: Humanizer) -> Self {
        self.humanizer = humanizer;
        self
    }

    pub fn with_density_curve(mut self, curve: DensityCurve) -> Self {
        self.density = DensityGenerator::new(curve);
        self
    }

    /// Start playing `pattern` from step 0, anchored at the clock's current time.
    ///
    /// Refused (and logged) if voices are not ready or the pattern is empty;
    /// a refused start leaves the scheduler as it was.
    pub fn start(&mut self, pattern: Arc<[Step]>, bpm: u16) -> Result<(), EngineError> {
        if !self.voices.is_ready() {
            warn!("start refused: voices not ready");
            return Err(EngineError::NotReady);
        }
        if pattern.is_empty() {
            warn!("start refused: empty pattern");
            return Err(EngineError::EmptyPattern);
        }

        let now = self.clock.now();
        self.bpm = bpm;
        self.pattern = pattern;
        self.current_step = 0;
        self.current_bar = 0;
        self.fill = FillState::None;
        self.last_submitted = f64::MIN;
        self.timeline = StepTimeline::new(now, bpm);
        self.rebuild_bar();
        self.state = SchedulerState::Playing;
        info!(steps = self.pattern.len(), bpm, "playback started");
        Ok(())
    }

    /// Stop playback. Hits already submitted still sound. Idempotent.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Idle {
            return;
        }
        self.state = SchedulerState::Idle;
        self.fill = FillState::None;
        info!("playback stopped");
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SchedulerState::Playing
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_bar(&self) -> u64 {
        self.current_bar
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn voices(&self) -> &V {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut V {
        &mut self.voices
    }

    /// The active pattern as stored, before density or fills
    pub fn pattern(&self) -> &Arc<[Step]> {
        &self.pattern
    }

    /// Steps that will be played for the current bar (density applied)
    pub fn bar_steps(&self) -> &Arc<[Step]> {
        &self.bar_steps
    }

    /// Whether a fill overlay or its closing crash is still pending
    pub fn fill_pending(&self) -> bool {
        self.fill != FillState::None
    }

    pub fn set_bpm(&mut self, bpm: u16) {
        if bpm == self.bpm {
            return;
        }
        self.bpm = bpm;
        if self.is_playing() {
            self.timeline.set_bpm(bpm);
        }
        debug!(bpm, "tempo changed");
    }

    pub fn set_feel(&mut self, feel: Feel) {
        self.feel = feel;
    }

    pub fn set_humanize(&mut self, amount: f32) {
        self.humanize = amount.clamp(0.0, 1.0);
    }

    /// Changes density and rebuilds the current bar's buffer
    pub fn set_density(&mut self, amount: f32) {
        self.density_amount = amount.clamp(0.0, 1.0);
        self.rebuild_bar();
    }

    /// Swap the active pattern, keeping position (wrapping to 0 if it no
    /// longer fits). Works whether playing or stopped.
    pub fn update_pattern(&mut self, pattern: Arc<[Step]>) -> Result<(), EngineError> {
        if pattern.is_empty() {
            warn!("pattern update ignored: empty pattern");
            return Err(EngineError::EmptyPattern);
        }
        debug!(from = self.pattern.len(), to = pattern.len(), "pattern updated");
        self.pattern = pattern;
        if self.current_step >= self.pattern.len() {
            self.current_step = 0;
        }
        if let FillState::Active { crash_first, .. } = self.fill {
            self.fill = if crash_first {
                FillState::CrashPending
            } else {
                FillState::None
            };
        }
        self.rebuild_bar();
        Ok(())
    }

    /// Replace the rest of the current bar with a fill.
    ///
    /// Returns `Ok(false)` when the bar has no room left for one.
    pub fn trigger_fill(&mut self) -> Result<bool, EngineError> {
        if !self.is_playing() {
            warn!("fill ignored: not playing");
            return Err(EngineError::NotPlaying);
        }
        let bar_start = self.current_step - self.current_step % STEPS_PER_BAR;
        let bar_end = (bar_start + STEPS_PER_BAR).min(self.pattern.len());
        let Some(bar) = self.pattern.get(bar_start..bar_end) else {
            return Ok(false);
        };

        let result = fill::generate(bar, self.current_step - bar_start, bar.len());
        if !result.should_crash {
            debug!(step = self.current_step, "no room for a fill");
            return Ok(false);
        }
        let crash_first = self.fill == FillState::CrashPending && self.current_step == bar_start;
        info!(from = self.current_step, to = bar_end, crash_first, "fill armed");
        self.fill = FillState::Active {
            bar_start,
            from: self.current_step,
            steps: result.steps,
            crash_first,
        };
        Ok(true)
    }

    /// Submit every step due within the lookahead window.
    ///
    /// Returns how many steps were scheduled. Never fails once playing.
    pub fn tick(&mut self, listener: &mut dyn PlaybackListener) -> usize {
        if !self.is_playing() {
            return 0;
        }
        let horizon = self.clock.now() + self.config.lookahead;
        let mut scheduled = 0;
        while self.timeline.next_step_time() < horizon {
            self.schedule_step();
            self.advance(listener);
            scheduled += 1;
        }
        scheduled
    }

    fn schedule_step(&mut self) {
        let index = self.current_step;
        let start = self.timeline.next_step_time();
        let feel_offset = feel::timing_offset(index, self.timeline.step_seconds(), self.feel);

        let mut hits: Vec<Hit> = self
            .step_at(index)
            .map(|s| s.hits().to_vec())
            .unwrap_or_default();
        match self.fill {
            FillState::CrashPending if index % STEPS_PER_BAR == 0 => {
                hits.push(fill::crash_hit());
                self.fill = FillState::None;
            }
            FillState::Active {
                bar_start,
                ref mut crash_first,
                ..
            } if *crash_first && index == bar_start => {
                hits.push(fill::crash_hit());
                *crash_first = false;
            }
            _ => {}
        }
        if hits.is_empty() {
            return;
        }

        let mut timed: Vec<(f64, DrumSymbol, f32)> = hits
            .iter()
            .map(|hit| {
                let jitter = self.humanizer.jitter_timing(self.humanize);
                let velocity = self.humanizer.jitter_velocity(hit.velocity(), self.humanize);
                (start + hit.offset() + feel_offset + jitter, hit.voice(), velocity)
            })
            .collect();
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (at_time, voice, velocity) in timed {
            let at_time = at_time.max(self.last_submitted);
            self.last_submitted = at_time;
            trace!(step = index, %voice, at_time, velocity, "trigger");
            self.voices.trigger(voice, at_time, velocity);
        }
    }

    /// Fill overlay if one covers `index`, else the density buffer
    fn step_at(&self, index: usize) -> Option<&Step> {
        if let FillState::Active {
            bar_start,
            from,
            steps,
            ..
        } = &self.fill
        {
            if index >= *from {
                if let Some(step) = steps.get(index - bar_start) {
                    return Some(step);
                }
            }
        }
        self.bar_steps.get(index)
    }

    fn advance(&mut self, listener: &mut dyn PlaybackListener) {
        self.timeline.advance();
        self.current_step = (self.current_step + 1) % self.pattern.len().max(1);
        listener.on_step(self.current_step);

        if self.current_step % STEPS_PER_BAR != 0 {
            return;
        }
        self.current_bar += 1;
        if matches!(self.fill, FillState::Active { .. }) {
            self.fill = FillState::CrashPending;
        }
        self.rebuild_bar();

        if let Some(next) = listener.on_bar(self.current_bar, self.current_step) {
            // a pending crash survives the swap
            let _ = self.update_pattern(next);
        }
    }

    fn rebuild_bar(&mut self) {
        self.bar_steps = if self.density_amount > 0.0 {
            debug!(bar = self.current_bar, density = self.density_amount, "density regenerated");
            self.density
                .apply(&self.pattern, self.density_amount, self.current_bar)
                .into()
        } else {
            self.pattern.clone()
        };
    }
}
