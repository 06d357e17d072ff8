//! Per-hit timing and velocity jitter.
//!
//! Jitter is drawn fresh for every scheduled hit, so two loops of the same
//! pattern never sound identical.

/// Largest timing jitter at full humanize, in seconds
pub const MAX_TIMING_JITTER: f64 = 0.020;
/// Largest relative velocity change at full humanize
pub const MAX_VELOCITY_JITTER: f32 = 0.4;
/// Humanized hits never drop below this velocity
pub const MIN_HUMANIZED_VELOCITY: f32 = 0.1;

/// Owns the random source for humanization
#[derive(Clone, Debug)]
pub struct Humanizer {
    rng: fastrand::Rng,
}

impl Humanizer {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Reproducible jitter for tests and offline rendering
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Uniform offset in `[-0.02 * humanize, 0.02 * humanize]` seconds
    pub fn jitter_timing(&mut self, humanize: f32) -> f64 {
        if humanize <= 0.0 {
            return 0.0;
        }
        let spread = MAX_TIMING_JITTER * f64::from(humanize);
        (self.rng.f64() * 2.0 - 1.0) * spread
    }

    /// `base` scaled by a uniform factor in `1 ± 0.4 * humanize`, clamped to 0.1..=1
    pub fn jitter_velocity(&mut self, base: f32, humanize: f32) -> f32 {
        if humanize <= 0.0 {
            return base;
        }
        let spread = MAX_VELOCITY_JITTER * humanize;
        let factor = 1.0 + (self.rng.f32() * 2.0 - 1.0) * spread;
        (base * factor).clamp(MIN_HUMANIZED_VELOCITY, 1.0)
    }
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_humanize_is_identity() {
        let mut h = Humanizer::with_seed(7);
        for v in [0.0, 0.05, 0.5, 0.8, 1.0] {
            assert_eq!(h.jitter_timing(0.0), 0.0);
            assert_eq!(h.jitter_velocity(v, 0.0), v);
        }
    }

    #[test]
    fn test_timing_stays_in_range() {
        let mut h = Humanizer::with_seed(42);
        for _ in 0..1000 {
            let t = h.jitter_timing(0.5);
            assert!(t.abs() <= 0.010 + 1e-12);
        }
    }

    #[test]
    fn test_velocity_stays_in_range() {
        let mut h = Humanizer::with_seed(42);
        for _ in 0..1000 {
            let v = h.jitter_velocity(0.8, 1.0);
            assert!((0.1..=1.0).contains(&v));
            assert!(v >= 0.8 * 0.6 - 1e-6);

            let quiet = h.jitter_velocity(0.05, 1.0);
            assert!(quiet >= 0.1);
        }
    }

    #[test]
    fn test_jitter_varies() {
        let mut h = Humanizer::with_seed(3);
        let a = h.jitter_timing(1.0);
        let b = h.jitter_timing(1.0);
        assert_ne!(a, b);
    }
}
