//! Hits and steps - one grid slot and the voices sounding in it.

use super::drum::DrumSymbol;
use std::fmt;

/// Default velocity for hits written in pattern text
pub const DEFAULT_VELOCITY: f32 = 0.8;

/// One voice trigger inside a step.
///
/// Velocity and offset are fixed at construction; shaping stages build new
/// hits instead of mutating old ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    voice: DrumSymbol,
    velocity: f32,
    offset: f64,
}

impl Hit {
    /// A hit at `velocity` (clamped to 0-1) with no micro-timing offset
    pub fn new(voice: DrumSymbol, velocity: f32) -> Self {
        Self {
            voice,
            velocity: velocity.clamp(0.0, 1.0),
            offset: 0.0,
        }
    }

    /// A copy of this hit shifted by `offset` seconds inside its step
    pub fn with_offset(self, offset: f64) -> Self {
        Self { offset, ..self }
    }

    pub fn voice(&self) -> DrumSymbol {
        self.voice
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Intra-step timing adjustment in seconds
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

/// A grid slot holding zero or more simultaneous hits.
///
/// A step is a rest exactly when it holds no hits; the flag is derived, so
/// a non-empty rest cannot be built.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Step {
    hits: Vec<Hit>,
}

impl Step {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    pub fn rest() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn is_rest(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// True if any hit in this step is `voice`-like according to `pred`
    pub fn has_voice(&self, pred: impl Fn(DrumSymbol) -> bool) -> bool {
        self.hits.iter().any(|h| pred(h.voice()))
    }

    /// A copy of this step with `hit` layered on top
    pub fn with_hit(&self, hit: Hit) -> Step {
        let mut hits = self.hits.clone();
        hits.push(hit);
        Step { hits }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rest() {
            return write!(f, ".");
        }
        for hit in &self.hits {
            write!(f, "{}", hit.voice())?;
        }
        Ok(())
    }
}
