//! Synthesized drum voices
//!
//! Every [`DrumSymbol`] maps onto one of a handful of synthesis models, so
//! the sequencer can make sound without any sample files on disk.

use groove_core::DrumSymbol;
use std::f32::consts::PI;

/// How a voice is synthesized
#[derive(Clone, Copy, Debug, PartialEq)]
enum Model {
    /// Sine body with a downward pitch sweep (kicks and toms)
    Membrane {
        start_hz: f32,
        end_hz: f32,
        sweep: f32,
        decay: f32,
        click: bool,
    },
    /// Tone body under a burst of noise
    Snare,
    /// High-passed noise with an optional ring tone (hats and cymbals)
    Metal { decay: f32, cutoff: f32, ring_hz: f32 },
    /// Three staggered noise bursts
    Clap,
    /// Two inharmonic partials (cowbell, agogo)
    Bell { low_hz: f32, high_hz: f32, decay: f32 },
    /// Short jingle: noise gated by a fast tremolo
    Jingle,
}

impl Model {
    /// Synthesis model and tail length in milliseconds
    fn for_symbol(symbol: DrumSymbol) -> (Model, f32) {
        use DrumSymbol::*;
        match symbol {
            Kick | BassDrum => (
                Model::Membrane {
                    start_hz: 150.0,
                    end_hz: 50.0,
                    sweep: 25.0,
                    decay: 10.0,
                    click: true,
                },
                300.0,
            ),
            HighTom => (Model::tom(220.0, 140.0), 220.0),
            MidTom => (Model::tom(170.0, 110.0), 250.0),
            LowTom => (Model::tom(120.0, 80.0), 300.0),
            Snare => (Model::Snare, 200.0),
            ClosedHat => (
                Model::Metal {
                    decay: 50.0,
                    cutoff: 0.8,
                    ring_hz: 0.0,
                },
                80.0,
            ),
            OpenHat => (
                Model::Metal {
                    decay: 5.0,
                    cutoff: 0.8,
                    ring_hz: 0.0,
                },
                400.0,
            ),
            Crash => (
                Model::Metal {
                    decay: 3.0,
                    cutoff: 0.9,
                    ring_hz: 5000.0,
                },
                800.0,
            ),
            Splash => (
                Model::Metal {
                    decay: 7.0,
                    cutoff: 0.92,
                    ring_hz: 6500.0,
                },
                400.0,
            ),
            China => (
                Model::Metal {
                    decay: 4.0,
                    cutoff: 0.7,
                    ring_hz: 3100.0,
                },
                700.0,
            ),
            Ride => (
                Model::Bell {
                    low_hz: 800.0,
                    high_hz: 1200.0,
                    decay: 4.0,
                },
                600.0,
            ),
            Clap => (Model::Clap, 150.0),
            Cowbell => (
                Model::Bell {
                    low_hz: 560.0,
                    high_hz: 845.0,
                    decay: 8.0,
                },
                200.0,
            ),
            HighAgogo => (
                Model::Bell {
                    low_hz: 960.0,
                    high_hz: 2480.0,
                    decay: 12.0,
                },
                180.0,
            ),
            LowAgogo => (
                Model::Bell {
                    low_hz: 640.0,
                    high_hz: 1650.0,
                    decay: 12.0,
                },
                200.0,
            ),
            Tambourine => (Model::Jingle, 180.0),
        }
    }

    fn tom(start_hz: f32, end_hz: f32) -> Model {
        Model::Membrane {
            start_hz,
            end_hz,
            sweep: 15.0,
            decay: 12.0,
            click: false,
        }
    }
}

/// A one-shot drum voice
pub struct DrumVoice {
    symbol: DrumSymbol,
    model: Model,
    gain: f32,
    sample_rate: f32,
    position: usize,
    length: usize,
    rng: fastrand::Rng,
    prev_noise: f32,
    highpass: f32,
}

impl DrumVoice {
    pub fn new(symbol: DrumSymbol, velocity: f32, sample_rate: f32) -> Self {
        let (model, tail_ms) = Model::for_symbol(symbol);
        Self {
            symbol,
            model,
            gain: velocity.clamp(0.0, 1.0),
            sample_rate,
            position: 0,
            length: (tail_ms * sample_rate / 1000.0) as usize,
            rng: fastrand::Rng::with_seed(u64::from(symbol.midi_note()) * 7919),
            prev_noise: 0.0,
            highpass: 0.0,
        }
    }

    pub fn symbol(&self) -> DrumSymbol {
        self.symbol
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.length
    }

    /// Next mono sample, already scaled by velocity
    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let t = self.position as f32 / self.sample_rate;
        let raw = match self.model {
            Model::Membrane {
                start_hz,
                end_hz,
                sweep,
                decay,
                click,
            } => Self::membrane(t, start_hz, end_hz, sweep, decay, click),
            Model::Snare => self.snare(t),
            Model::Metal {
                decay,
                cutoff,
                ring_hz,
            } => self.metal(t, decay, cutoff, ring_hz),
            Model::Clap => self.clap(t),
            Model::Bell {
                low_hz,
                high_hz,
                decay,
            } => Self::bell(t, low_hz, high_hz, decay),
            Model::Jingle => self.jingle(t),
        };
        self.position += 1;
        raw * self.gain
    }

    fn noise(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }

    fn membrane(t: f32, start_hz: f32, end_hz: f32, sweep: f32, decay: f32, click: bool) -> f32 {
        let pitch = (start_hz - end_hz) * (-t * sweep).exp() + end_hz;
        let body = (2.0 * PI * pitch * t).sin() * (-t * decay).exp() * 0.8;
        if click && t < 0.005 {
            body + (2.0 * PI * 2000.0 * t).sin() * (1.0 - t / 0.005) * 0.2
        } else {
            body
        }
    }

    fn snare(&mut self, t: f32) -> f32 {
        let body = (2.0 * PI * 200.0 * t).sin() * (-t * 30.0).exp();
        let wires = self.noise() * (-t * 15.0).exp();
        body * 0.3 + wires * 0.7
    }

    fn metal(&mut self, t: f32, decay: f32, cutoff: f32, ring_hz: f32) -> f32 {
        let noise = self.noise();
        self.highpass = cutoff * (self.highpass + noise - self.prev_noise);
        self.prev_noise = noise;
        let ring = if ring_hz > 0.0 {
            (2.0 * PI * ring_hz * t).sin() * 0.1
        } else {
            0.0
        };
        (self.highpass + ring) * (-t * decay).exp() * 0.5
    }

    fn clap(&mut self, t: f32) -> f32 {
        let mut signal = 0.0;
        for burst in 0..3 {
            let onset = burst as f32 * 0.015;
            if t >= onset {
                signal += self.noise() * (-(t - onset) * 20.0).exp() * 0.4;
            }
        }
        signal
    }

    fn bell(t: f32, low_hz: f32, high_hz: f32, decay: f32) -> f32 {
        let tone = (2.0 * PI * low_hz * t).sin() * 0.6 + (2.0 * PI * high_hz * t).sin() * 0.4;
        tone * (-t * decay).exp() * 0.6
    }

    fn jingle(&mut self, t: f32) -> f32 {
        let gate = 0.5 + 0.5 * (2.0 * PI * 28.0 * t).sin();
        let noise = self.noise();
        self.highpass = 0.85 * (self.highpass + noise - self.prev_noise);
        self.prev_noise = noise;
        self.highpass * gate * (-t * 14.0).exp() * 0.5
    }
}
