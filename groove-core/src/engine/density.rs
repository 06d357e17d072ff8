//! Ghost-note density.
//!
//! Each bar gets its own generator seeded from the bar index, so replaying
//! a bar reproduces exactly the same ghost notes and a test can check them
//! without touching any global random state.

use crate::parser::STEPS_PER_BAR;
use crate::types::{DrumSymbol, Hit, Step};

/// Tunable constants of the density curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityCurve {
    /// A ghost note is forced every `round(period_numerator / density)` steps
    pub period_numerator: f32,
    /// Lower bound for the forced period
    pub min_period: usize,
    /// Chance of a ghost note on other rests is `density * ghost_chance`
    pub ghost_chance: f32,
    /// Chance an on-beat ghost note uses the ride instead of the hat
    pub ride_chance: f32,
    pub ghost_velocity: f32,
    /// Random velocity added on top of `ghost_velocity`
    pub ghost_velocity_spread: f32,
    /// Density at which sounding steps start getting a soft hat layer
    pub layer_threshold: f32,
    /// Layer chance is `(density - layer_threshold) * layer_slope`
    pub layer_slope: f32,
}

impl Default for DensityCurve {
    fn default() -> Self {
        Self {
            period_numerator: 4.0,
            min_period: 2,
            ghost_chance: 0.6,
            ride_chance: 0.3,
            ghost_velocity: 0.5,
            ghost_velocity_spread: 0.1,
            layer_threshold: 0.4,
            layer_slope: 0.67,
        }
    }
}

/// Linear congruential generator (glibc constants) seeded per bar
#[derive(Clone, Debug)]
pub struct BarRng {
    state: u32,
}

impl BarRng {
    pub fn new(bar_index: u64) -> Self {
        let state = (bar_index as u32).wrapping_mul(2_654_435_761);
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.state >> 16) as f32 / 65_536.0
    }
}

/// Adds ghost notes to a bar's worth of steps
#[derive(Clone, Debug, Default)]
pub struct DensityGenerator {
    curve: DensityCurve,
}

impl DensityGenerator {
    pub fn new(curve: DensityCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &DensityCurve {
        &self.curve
    }

    /// Steps with ghost notes added for bar `bar_index`.
    ///
    /// Returns a fresh buffer; identical arguments give identical output.
    pub fn apply(&self, steps: &[Step], density: f32, bar_index: u64) -> Vec<Step> {
        if density <= 0.0 {
            return steps.to_vec();
        }
        let mut rng = BarRng::new(bar_index);
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                if step.is_rest() {
                    self.ghost_note(step, density, index, &mut rng)
                } else {
                    self.extra_layer(step, density, &mut rng)
                }
            })
            .collect()
    }

    fn ghost_note(&self, step: &Step, density: f32, index: usize, rng: &mut BarRng) -> Step {
        let c = &self.curve;
        let period = ((c.period_numerator / density).round() as usize).max(c.min_period);
        let forced = index % period == 0;
        if !forced && rng.next_f32() >= density * c.ghost_chance {
            return step.clone();
        }

        let off_beat = index % STEPS_PER_BAR % 2 == 1;
        let voice = if !off_beat && rng.next_f32() > 1.0 - c.ride_chance {
            DrumSymbol::Ride
        } else {
            DrumSymbol::ClosedHat
        };
        let velocity = c.ghost_velocity + rng.next_f32() * c.ghost_velocity_spread;
        Step::new(vec![Hit::new(voice, velocity)])
    }

    fn extra_layer(&self, step: &Step, density: f32, rng: &mut BarRng) -> Step {
        let c = &self.curve;
        if density < c.layer_threshold {
            return step.clone();
        }
        let chance = (density - c.layer_threshold) * c.layer_slope;
        if rng.next_f32() > chance || step.has_voice(|v| v.is_timekeeper()) {
            return step.clone();
        }
        step.with_hit(Hit::new(DrumSymbol::ClosedHat, c.ghost_velocity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn sparse() -> Vec<Step> {
        parse("k . . . s . . . k . . . s . . .").unwrap()
    }

    #[test]
    fn test_zero_density_is_noop() {
        let steps = sparse();
        let gen = DensityGenerator::default();
        assert_eq!(gen.apply(&steps, 0.0, 5), steps);
    }

    #[test]
    fn test_same_bar_is_reproducible() {
        let steps = sparse();
        let gen = DensityGenerator::default();
        for bar in [0, 1, 7, 1_000_000] {
            assert_eq!(gen.apply(&steps, 0.6, bar), gen.apply(&steps, 0.6, bar));
        }
    }

    #[test]
    fn test_bar_rng_range() {
        for seed in 0..50 {
            let mut rng = BarRng::new(seed);
            for _ in 0..200 {
                let v = rng.next_f32();
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_full_density_forces_ghost_every_four_steps() {
        let steps = parse(". . . . . . . . . . . . . . . .").unwrap();
        let out = DensityGenerator::default().apply(&steps, 1.0, 3);
        for i in (0..16).step_by(4) {
            assert!(!out[i].is_rest(), "step {} should carry a ghost note", i);
        }
    }

    #[test]
    fn test_ghost_notes_are_soft_hats_or_rides() {
        let steps = sparse();
        let gen = DensityGenerator::default();
        for bar in 0..20 {
            let out = gen.apply(&steps, 0.8, bar);
            for (i, (before, after)) in steps.iter().zip(&out).enumerate() {
                if before.is_rest() && !after.is_rest() {
                    let hit = after.hits()[0];
                    assert!(matches!(hit.voice(), DrumSymbol::ClosedHat | DrumSymbol::Ride));
                    assert!((0.5..=0.6).contains(&hit.velocity()));
                    if i % 2 == 1 {
                        assert_eq!(hit.voice(), DrumSymbol::ClosedHat);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hat_steps_are_never_doubled() {
        let steps = parse("kh sh kr sH").unwrap();
        let gen = DensityGenerator::default();
        for bar in 0..50 {
            assert_eq!(gen.apply(&steps, 1.0, bar), steps);
        }
    }

    #[test]
    fn test_low_density_never_layers() {
        let steps = parse("k s k s").unwrap();
        let gen = DensityGenerator::default();
        for bar in 0..50 {
            assert_eq!(gen.apply(&steps, 0.39, bar), steps);
        }
    }

    #[test]
    fn test_high_density_sometimes_layers() {
        let steps = parse("k s k s k s k s").unwrap();
        let gen = DensityGenerator::default();
        let layered = (0..50)
            .flat_map(|bar| gen.apply(&steps, 1.0, bar))
            .filter(|s| s.len() == 2)
            .count();
        assert!(layered > 0);
    }
}
