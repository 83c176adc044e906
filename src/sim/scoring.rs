//! Difficulty progression
//!
//! Scaling is monotonic within a session and always capped. Games hold a
//! `Difficulty` in their state struct, so a reset returns it to base.

use serde::{Deserialize, Serialize};

/// Base value, per-event increment and ceiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub base: f32,
    pub step: f32,
    pub cap: f32,
}

impl Ramp {
    pub const fn new(base: f32, step: f32, cap: f32) -> Self {
        Self { base, step, cap }
    }

    /// Value after `events` increments, without iterating
    pub fn at(&self, events: u32) -> f32 {
        (self.base + self.step * events as f32).min(self.cap)
    }

    pub fn is_valid(&self) -> bool {
        self.step >= 0.0 && self.cap >= self.base
    }
}

/// Current position on a ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Difficulty {
    ramp: Ramp,
    value: f32,
}

impl Difficulty {
    pub fn new(ramp: Ramp) -> Self {
        debug_assert!(ramp.is_valid(), "ramp cap below base: {ramp:?}");
        Self {
            ramp,
            value: ramp.base.min(ramp.cap),
        }
    }

    /// Start `steps` increments up the ramp (levelled games)
    pub fn at_step(ramp: Ramp, steps: u32) -> Self {
        Self {
            ramp,
            value: ramp.at(steps),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_capped(&self) -> bool {
        self.value >= self.ramp.cap
    }

    /// Raise by one step, never past the cap. Returns the new value.
    pub fn bump(&mut self) -> f32 {
        let next = (self.value + self.ramp.step).min(self.ramp.cap);
        debug_assert!(next >= self.value, "difficulty decreased");
        self.value = next;
        self.value
    }
}

/// Multiplicative speed-up applied on a successful return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBoost {
    pub factor: f32,
    pub max_speed: f32,
}

impl Default for SpeedBoost {
    fn default() -> Self {
        Self {
            factor: 1.05,
            max_speed: 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bump_caps() {
        let mut speed = Difficulty::new(Ramp::new(3.0, 0.05, 3.1));
        speed.bump();
        assert!((speed.value() - 3.05).abs() < 1e-5);
        speed.bump();
        speed.bump();
        assert_eq!(speed.value(), 3.1);
        assert!(speed.is_capped());
    }

    #[test]
    fn test_at_step() {
        let ramp = Ramp::new(1.5, 0.3, 12.0);
        assert!((Difficulty::at_step(ramp, 3).value() - 2.4).abs() < 1e-5);
        assert_eq!(Difficulty::at_step(ramp, 1000).value(), 12.0);
    }

    proptest! {
        #[test]
        fn bump_is_monotonic_and_capped(
            base in 0.0f32..10.0,
            step in 0.0f32..2.0,
            extra in 0.0f32..10.0,
            bumps in 0usize..200,
        ) {
            let ramp = Ramp::new(base, step, base + extra);
            let mut d = Difficulty::new(ramp);
            let mut last = d.value();
            for _ in 0..bumps {
                let v = d.bump();
                prop_assert!(v >= last);
                prop_assert!(v <= ramp.cap);
                last = v;
            }
        }
    }
}
