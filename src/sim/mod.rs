//! Simulation primitives shared by every game
//!
//! Everything here is single-threaded and deterministic given a seed:
//! - Ticks come only from the loop driver
//! - Randomness comes only from a `RandomSource`
//! - Entity sets iterate in spawn order

pub mod clock;
pub mod collision;
pub mod entity;
pub mod input;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use clock::{Cadence, LoopDriver, Movement, Tick, TimerId, Timers};
pub use collision::{
    CollisionClass, CollisionEvent, Resolution, angles_collide, circle_circle_overlap,
    circle_rect_overlap, detect_angular, detect_collisions, overlaps, point_in_rect,
    rect_rect_overlap, resolve,
};
pub use entity::{
    Body, Contacts, Edge, EdgeRules, Entity, EntityId, EntitySet, Playfield, Shape, Side,
    integrate,
};
pub use input::{Controls, InputEvent, InputQueue, Intent, Key, LaneRange, Press};
pub use rng::{RandomSource, SeededRng, SequenceRng};
pub use scoring::{Difficulty, Ramp, SpeedBoost};
pub use snapshot::{EntityView, Hud, PlayerView, Snapshot};
pub use state::{Lifecycle, Outcome, Session};
pub use tick::{Game, HostRequest, run_ticks};
