//! The real-time games
//!
//! Each module owns one game: an explicit state struct rebuilt on reset and
//! a `Game` impl that advances it.

pub mod breakout;
pub mod flap;
pub mod pins;
pub mod pong;
pub mod reflex;
pub mod runner;
pub mod tiles;

pub use breakout::Breakout;
pub use flap::Flap;
pub use pins::Pins;
pub use pong::Pong;
pub use reflex::Reflex;
pub use runner::Runner;
pub use tiles::Tiles;

use crate::sim::{
    Controls, Game, HostRequest, Intent, Lifecycle, Movement, SeededRng, Session, Snapshot, Tick,
    TimerId,
};
use crate::tuning::Tuning;

/// Selectable game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Breakout,
    Pong,
    Runner,
    Pins,
    Tiles,
    Flap,
    Reflex,
}

impl GameKind {
    pub const ALL: [GameKind; 7] = [
        GameKind::Breakout,
        GameKind::Pong,
        GameKind::Runner,
        GameKind::Pins,
        GameKind::Tiles,
        GameKind::Flap,
        GameKind::Reflex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Breakout => "breakout",
            GameKind::Pong => "pong",
            GameKind::Runner => "runner",
            GameKind::Pins => "pins",
            GameKind::Tiles => "tiles",
            GameKind::Flap => "flap",
            GameKind::Reflex => "reflex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakout" | "bricks" => Some(GameKind::Breakout),
            "pong" => Some(GameKind::Pong),
            "runner" => Some(GameKind::Runner),
            "pins" | "pin" => Some(GameKind::Pins),
            "tiles" | "piano" => Some(GameKind::Tiles),
            "flap" | "jump" => Some(GameKind::Flap),
            "reflex" | "reaction" => Some(GameKind::Reflex),
            _ => None,
        }
    }

    /// Build a fresh game in `Idle`. `seed` feeds the game's random source.
    pub fn build(&self, tuning: &Tuning, seed: u64) -> Box<dyn Game> {
        let rng = Box::new(SeededRng::new(seed));
        match self {
            GameKind::Breakout => Box::new(Breakout::new(tuning.breakout)),
            GameKind::Pong => Box::new(Pong::new(tuning.pong, rng)),
            GameKind::Runner => Box::new(Runner::new(tuning.runner, rng)),
            GameKind::Pins => Box::new(Pins::new(tuning.pins)),
            GameKind::Tiles => Box::new(Tiles::new(tuning.tiles, rng)),
            GameKind::Flap => Box::new(Flap::new(tuning.flap, rng)),
            GameKind::Reflex => Box::new(Reflex::new(tuning.reflex, rng)),
        }
    }
}

impl<G: Game + ?Sized> Game for Box<G> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn movement(&self) -> Movement {
        (**self).movement()
    }

    fn controls(&self) -> Controls {
        (**self).controls()
    }

    fn session(&self) -> &Session {
        (**self).session()
    }

    fn session_mut(&mut self) -> &mut Session {
        (**self).session_mut()
    }

    fn lifecycle(&self) -> Lifecycle {
        (**self).lifecycle()
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn toggle_pause(&mut self) {
        (**self).toggle_pause()
    }

    fn apply(&mut self, intent: Intent, now: f64) {
        (**self).apply(intent, now)
    }

    fn advance(&mut self, tick: &Tick) {
        (**self).advance(tick)
    }

    fn on_timer(&mut self, id: TimerId, now: f64) {
        (**self).on_timer(id, now)
    }

    fn drain_requests(&mut self) -> Vec<HostRequest> {
        (**self).drain_requests()
    }

    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }

    fn tick(&mut self, tick: &Tick) {
        (**self).tick(tick)
    }
}
