//! The running sequencer
//!
//! Wraps a [`Sequencer`] in a mutex shared with a ticker thread that runs
//! one scheduling pass every `tick_interval`. The REPL locks the same mutex
//! for edits, so a pattern swap never lands halfway through a pass.

use crate::audio::{AudioBackend, AudioOutput};
use crate::set_file::{ReloadReport, SetFile};
use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};
use groove_core::{
    AudioClock, DrumSet, EngineError, Scheduler, SchedulerConfig, Sequencer, TapTempo,
    VoiceTrigger,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

pub type Voices = Box<dyn VoiceTrigger>;
pub type SharedSequencer = Arc<Mutex<Sequencer<Voices>>>;

#[derive(Debug)]
enum TickerCommand {
    Shutdown,
}

pub struct Engine {
    sequencer: SharedSequencer,
    clock: Arc<dyn AudioClock>,
    output: Option<AudioOutput>,
    tap: TapTempo,
    command_tx: Sender<TickerCommand>,
    ticker: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(set: DrumSet, backend: AudioBackend, config: SchedulerConfig) -> Self {
        let AudioBackend {
            clock,
            voices,
            output,
        } = backend;
        let interval = config.tick_interval;
        let scheduler = Scheduler::new(clock.clone(), voices, config);
        let sequencer = Arc::new(Mutex::new(Sequencer::new(set, scheduler)));

        let (command_tx, command_rx) = bounded(4);
        let shared = sequencer.clone();
        let ticker = thread::spawn(move || run_ticker(shared, command_rx, interval));

        Engine {
            sequencer,
            clock,
            output,
            tap: TapTempo::new(),
            command_tx,
            ticker: Some(ticker),
        }
    }

    /// Run `f` with the sequencer locked
    pub fn with<T>(&self, f: impl FnOnce(&mut Sequencer<Voices>) -> T) -> T {
        f(&mut lock(&self.sequencer))
    }

    pub fn sequencer(&self) -> SharedSequencer {
        self.sequencer.clone()
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }

    /// Start playback. Reports `NotReady` right away if the output stream
    /// is not running yet.
    pub fn play(&self) -> Result<(), EngineError> {
        self.with(|seq| seq.play())
    }

    pub fn stop(&self) {
        self.with(|seq| seq.stop());
    }

    /// Register a tap; applies and returns the tempo once there are enough taps
    pub fn tap(&mut self) -> Option<u16> {
        let bpm = self.tap.tap(self.clock.now())?;
        let bpm = self.with(|seq| seq.set_bpm(u32::from(bpm)));
        debug!(bpm, "tap tempo");
        Some(bpm)
    }

    pub fn tap_count(&self) -> usize {
        self.tap.tap_count()
    }

    pub fn set_master_volume(&self, volume: f32) -> f32 {
        let volume = self.with(|seq| seq.set_master_volume(volume));
        self.sync_volume(volume);
        volume
    }

    /// Replace the drum set with the contents of a file
    pub fn load(&self, file: &SetFile) -> Result<()> {
        let set = file.to_drum_set()?;
        let volume = set.master_volume();
        self.with(|seq| seq.load_set(set));
        self.sync_volume(volume);
        Ok(())
    }

    /// Apply a changed file as live edits
    pub fn reload(&self, file: &SetFile) -> ReloadReport {
        let report = self.with(|seq| file.apply_to(seq));
        self.sync_volume(file.volume);
        info!(
            edited = report.edited,
            added = report.added,
            removed = report.removed,
            rejected = report.rejected.len(),
            "set reloaded"
        );
        report
    }

    pub fn snapshot(&self) -> SetFile {
        self.with(|seq| SetFile::from_set(seq.set()))
    }

    fn sync_volume(&self, volume: f32) {
        if let Some(output) = &self.output {
            output.set_volume(volume);
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
        let _ = self.command_tx.send(TickerCommand::Shutdown);
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}

fn lock(sequencer: &SharedSequencer) -> MutexGuard<'_, Sequencer<Voices>> {
    sequencer.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_ticker(sequencer: SharedSequencer, commands: Receiver<TickerCommand>, interval: Duration) {
    let ticks = crossbeam_channel::tick(interval);
    loop {
        crossbeam_channel::select! {
            recv(ticks) -> _ => {
                lock(&sequencer).tick();
            }
            recv(commands) -> msg => match msg {
                Ok(TickerCommand::Shutdown) | Err(_) => break,
            },
        }
    }
    debug!("ticker stopped");
}
