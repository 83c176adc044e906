//! Arcade Sim - fixed-update simulation core for casual arcade games
//!
//! Core modules:
//! - `sim`: Engine primitives (clock, entities, collisions, input, session state)
//! - `games`: One deterministic simulation per real-time game
//! - `engine`: Host wiring (loop driver, timers, attach/detach)
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod error;
pub mod games;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use error::{Error, Result};
pub use tuning::Tuning;

/// Engine-wide constants
pub mod consts {
    /// Reference frame for delta-based movement (16 ms)
    pub const REFERENCE_FRAME_SECS: f32 = 0.016;
    /// Fixed simulation timestep when the fixed cadence is selected (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest host frame delta accepted by the loop driver (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// One full turn in degrees
    pub const FULL_TURN: f32 = 360.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(consts::FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= consts::FULL_TURN { 0.0 } else { wrapped }
}

/// Shortest distance between two angles in degrees, wrapping at 0/360
#[inline]
pub fn circular_distance(a: f32, b: f32) -> f32 {
    let diff = (normalize_degrees(a) - normalize_degrees(b)).abs();
    diff.min(consts::FULL_TURN - diff)
}

/// Convert a degree angle on a disk of `radius` to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(radius: f32, degrees: f32) -> glam::Vec2 {
    let theta = degrees.to_radians();
    glam::Vec2::new(radius * theta.cos(), radius * theta.sin())
}

/// Clamp `value` into `[min, max]`. A reversed range collapses to `min`.
#[inline]
pub fn clamp_to_range(value: f32, min: f32, max: f32) -> f32 {
    if max < min {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_circular_distance_wraps() {
        assert_eq!(circular_distance(10.0, 350.0), 20.0);
        assert_eq!(circular_distance(350.0, 10.0), 20.0);
        assert_eq!(circular_distance(0.0, 180.0), 180.0);
        assert_eq!(circular_distance(-90.0, 270.0), 0.0);
    }

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(clamp_to_range(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_to_range(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_to_range(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp_to_range(3.0, 4.0, 2.0), 4.0);
    }

    proptest! {
        #[test]
        fn circular_distance_is_symmetric(a in -720.0f32..720.0, b in -720.0f32..720.0) {
            let ab = circular_distance(a, b);
            let ba = circular_distance(b, a);
            prop_assert!((ab - ba).abs() < 1e-3);
            prop_assert!(ab >= 0.0 && ab <= 180.0 + 1e-3);
        }
    }
}
