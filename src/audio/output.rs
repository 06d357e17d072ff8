//! cpal output stream
//!
//! The stream callback counts rendered frames; that count divided by the
//! sample rate is the [`AudioClock`] the scheduler reads. Triggers arrive
//! over a channel already converted to a frame position and start on that
//! exact frame.

use super::drum_synth::DrumVoice;
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use groove_core::{AudioClock, DrumSymbol, VoiceTrigger};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Voices sounding at once; the oldest is cut beyond this
pub const MAX_VOICES: usize = 48;

/// How long `open` waits for the first callback
const READY_TIMEOUT: Duration = Duration::from_secs(1);

/// Time derived from frames rendered by the output stream
#[derive(Debug)]
pub struct StreamClock {
    frames: AtomicU64,
    sample_rate: f64,
}

impl StreamClock {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
    }

    /// Frame on which something due at `seconds` should start
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate).round() as u64
    }
}

impl AudioClock for StreamClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

/// A trigger resolved to a frame position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledHit {
    pub voice: DrumSymbol,
    pub frame: u64,
    pub velocity: f32,
}

/// State shared between the callback and the control thread
#[derive(Debug)]
struct Shared {
    clock: Arc<StreamClock>,
    /// f32 master volume stored as bits
    volume: AtomicU32,
    running: AtomicBool,
}

/// Sums active voices, starting queued hits on their frame
pub struct Mixer {
    sample_rate: f32,
    hits: Receiver<ScheduledHit>,
    pending: VecDeque<ScheduledHit>,
    active: Vec<DrumVoice>,
}

impl Mixer {
    pub fn new(sample_rate: f32, hits: Receiver<ScheduledHit>) -> Self {
        Self {
            sample_rate,
            hits,
            pending: VecDeque::with_capacity(64),
            active: Vec::with_capacity(MAX_VOICES),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    /// Pull newly submitted hits; call once per buffer.
    ///
    /// `pending` stays sorted by frame. Hits left over from a previous run
    /// can be later than the first hits of a restarted one.
    pub fn collect(&mut self) {
        for hit in self.hits.try_iter() {
            let at = self.pending.partition_point(|queued| queued.frame <= hit.frame);
            self.pending.insert(at, hit);
        }
    }

    /// Render the mono sample for `frame`. Hits due at or before it start now.
    pub fn next_frame(&mut self, frame: u64) -> f32 {
        while self.pending.front().is_some_and(|hit| hit.frame <= frame) {
            if let Some(hit) = self.pending.pop_front() {
                if self.active.len() >= MAX_VOICES {
                    self.active.remove(0);
                }
                self.active
                    .push(DrumVoice::new(hit.voice, hit.velocity, self.sample_rate));
            }
        }
        let mut sum = 0.0;
        for voice in &mut self.active {
            sum += voice.next_sample();
        }
        self.active.retain(|voice| !voice.is_finished());
        sum
    }
}

/// Sends scheduler triggers to the output stream
#[derive(Clone)]
pub struct DrumVoices {
    hits: Sender<ScheduledHit>,
    shared: Arc<Shared>,
}

impl VoiceTrigger for DrumVoices {
    fn trigger(&mut self, voice: DrumSymbol, at_time: f64, velocity: f32) {
        let hit = ScheduledHit {
            voice,
            frame: self.shared.clock.frame_at(at_time),
            velocity,
        };
        // a closed channel means the stream is gone
        let _ = self.hits.send(hit);
    }

    fn is_ready(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

/// An open output stream
pub struct AudioOutput {
    stream: Stream,
    shared: Arc<Shared>,
    hits: Sender<ScheduledHit>,
}

impl AudioOutput {
    /// Open the default output device and start the stream
    pub fn open(volume: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let shared = Arc::new(Shared {
            clock: Arc::new(StreamClock::new(f64::from(config.sample_rate.0))),
            volume: AtomicU32::new(volume.clamp(0.0, 1.0).to_bits()),
            running: AtomicBool::new(false),
        });
        let (hits, rx) = unbounded();
        let mixer = Mixer::new(config.sample_rate.0 as f32, rx);
        let (ready_tx, ready_rx) = bounded(1);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, shared.clone(), mixer, ready_tx)?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, shared.clone(), mixer, ready_tx)?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, shared.clone(), mixer, ready_tx)?
            }
            other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
        };
        stream
            .play()
            .map_err(|e| anyhow!("Failed to start output stream: {}", e))?;
        if ready_rx.recv_timeout(READY_TIMEOUT).is_err() {
            warn!("output stream has not started yet; play reports not ready until it does");
        }

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio output opened"
        );
        Ok(Self {
            stream,
            shared,
            hits,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        shared: Arc<Shared>,
        mut mixer: Mixer,
        ready: Sender<()>,
    ) -> Result<Stream>
    where
        T: Sample + SizedSample + FromSample<f32> + Send + 'static,
    {
        let channels = usize::from(config.channels);
        let err_fn = |err| error!(%err, "output stream error");

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !shared.running.swap(true, Ordering::AcqRel) {
                        let _ = ready.try_send(());
                    }
                    mixer.collect();
                    let volume = f32::from_bits(shared.volume.load(Ordering::Relaxed));
                    let start = shared.clock.frames();

                    let mut frames = 0u64;
                    for frame in data.chunks_mut(channels) {
                        let value = (mixer.next_frame(start + frames) * volume).clamp(-1.0, 1.0);
                        let sample = T::from_sample(value);
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                        frames += 1;
                    }
                    shared.clock.advance(frames);
                },
                err_fn,
                None,
            )
            .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    pub fn clock(&self) -> Arc<StreamClock> {
        self.shared.clock.clone()
    }

    pub fn voices(&self) -> DrumVoices {
        DrumVoices {
            hits: self.hits.clone(),
            shared: self.shared.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.shared.volume.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared
            .volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn pause(&self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| anyhow!("Failed to pause stream: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_clock_counts_frames() {
        let clock = StreamClock::new(48000.0);
        assert_eq!(clock.now(), 0.0);
        clock.advance(24000);
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.frame_at(1.0), 48000);
        assert_eq!(clock.frame_at(-0.1), 0);
    }

    #[test]
    fn test_mixer_starts_hit_on_its_frame() {
        let (tx, rx) = unbounded();
        let mut mixer = Mixer::new(44100.0, rx);
        tx.send(ScheduledHit {
            voice: DrumSymbol::Kick,
            frame: 100,
            velocity: 1.0,
        })
        .unwrap();
        mixer.collect();

        for frame in 0..100 {
            assert_eq!(mixer.next_frame(frame), 0.0);
        }
        assert_eq!(mixer.active_voices(), 0);
        mixer.next_frame(100);
        assert_eq!(mixer.active_voices(), 1);
        let body: f32 = (101..400).map(|f| mixer.next_frame(f).abs()).sum();
        assert!(body > 0.0);
    }

    #[test]
    fn test_late_hits_start_immediately() {
        let (tx, rx) = unbounded();
        let mut mixer = Mixer::new(44100.0, rx);
        tx.send(ScheduledHit {
            voice: DrumSymbol::Snare,
            frame: 10,
            velocity: 0.5,
        })
        .unwrap();
        mixer.collect();
        mixer.next_frame(500);
        assert_eq!(mixer.active_voices(), 1);
    }

    #[test]
    fn test_out_of_order_hits_start_on_their_frame() {
        let (tx, rx) = unbounded();
        let mut mixer = Mixer::new(44100.0, rx);
        for frame in [1000, 100] {
            tx.send(ScheduledHit {
                voice: DrumSymbol::Kick,
                frame,
                velocity: 1.0,
            })
            .unwrap();
        }
        mixer.collect();

        for frame in 0..100 {
            mixer.next_frame(frame);
        }
        assert_eq!(mixer.active_voices(), 0);
        mixer.next_frame(100);
        assert_eq!(mixer.active_voices(), 1);
        for frame in 101..1000 {
            mixer.next_frame(frame);
        }
        assert_eq!(mixer.active_voices(), 1);
        mixer.next_frame(1000);
        assert_eq!(mixer.active_voices(), 2);
    }

    #[test]
    fn test_voice_count_is_capped() {
        let (tx, rx) = unbounded();
        let mut mixer = Mixer::new(44100.0, rx);
        for _ in 0..MAX_VOICES + 10 {
            tx.send(ScheduledHit {
                voice: DrumSymbol::Crash,
                frame: 0,
                velocity: 1.0,
            })
            .unwrap();
        }
        mixer.collect();
        mixer.next_frame(0);
        assert_eq!(mixer.active_voices(), MAX_VOICES);
    }

    #[test]
    fn test_voices_report_ready_once_running() {
        let shared = Arc::new(Shared {
            clock: Arc::new(StreamClock::new(44100.0)),
            volume: AtomicU32::new(0.8f32.to_bits()),
            running: AtomicBool::new(false),
        });
        let (hits, rx) = unbounded();
        let mut voices = DrumVoices {
            hits,
            shared: shared.clone(),
        };
        assert!(!voices.is_ready());
        shared.running.store(true, Ordering::Release);
        assert!(voices.is_ready());

        voices.trigger(DrumSymbol::ClosedHat, 0.5, 0.7);
        let hit = rx.try_recv().unwrap();
        assert_eq!(hit.frame, 22050);
        assert_eq!(hit.voice, DrumSymbol::ClosedHat);
    }
}
