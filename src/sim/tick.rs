//! The per-game simulation contract
//!
//! Each game is an explicit state value plus a tick function. The host feeds
//! it normalized intents and ticks; the game never schedules anything itself,
//! it asks the host through `HostRequest`s.

use super::clock::{Movement, Tick, TimerId};
use super::input::{Controls, Intent};
use super::snapshot::Snapshot;
use super::state::{Lifecycle, Session};

/// Side effects a game asks its host to perform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostRequest {
    /// Fire `id` after `delay_secs` of host time
    Schedule { id: TimerId, delay_secs: f64 },
    Cancel { id: TimerId },
}

/// A real-time game driven by the engine host
pub trait Game {
    /// Stable short name used in logs and snapshots
    fn name(&self) -> &'static str;

    fn movement(&self) -> Movement;

    fn controls(&self) -> Controls;

    fn session(&self) -> &Session;

    fn session_mut(&mut self) -> &mut Session;

    fn lifecycle(&self) -> Lifecycle {
        self.session().lifecycle()
    }

    /// Explicit start command from the host
    fn start(&mut self) {
        self.session_mut().start();
    }

    /// Rebuild the whole game state at its initial spawn rules
    fn reset(&mut self);

    fn toggle_pause(&mut self) {
        self.session_mut().toggle_pause();
    }

    /// Consume one input intent. `now` is host time in seconds.
    fn apply(&mut self, intent: Intent, now: f64);

    /// Game-specific body of a running tick
    fn advance(&mut self, tick: &Tick);

    /// A timer requested through `HostRequest::Schedule` fired
    fn on_timer(&mut self, _id: TimerId, _now: f64) {}

    /// Pending host requests, oldest first
    fn drain_requests(&mut self) -> Vec<HostRequest> {
        Vec::new()
    }

    fn snapshot(&self) -> Snapshot;

    /// Advance one step. Outside `Running` nothing moves and nothing scores,
    /// which also makes `Ended` idempotent.
    fn tick(&mut self, tick: &Tick) {
        if !self.session().is_running() {
            return;
        }
        self.session_mut().record_tick();
        self.advance(tick);
    }
}

/// Run `count` frame-sized ticks starting at `first_index`
pub fn run_ticks<G: Game + ?Sized>(game: &mut G, first_index: u64, count: u64, dt: f32) {
    for i in 0..count {
        game.tick(&Tick::new(first_index + i, dt));
    }
}
