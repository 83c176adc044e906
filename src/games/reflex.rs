//! Reaction test: wait for the go signal, then act as fast as possible
//!
//! The go signal is a host timer, not a tick count, so the delay is measured
//! in real time regardless of the loop cadence.

use crate::sim::{
    Controls, Game, HostRequest, Hud, Intent, Lifecycle, Movement, Outcome, Playfield,
    RandomSource, Session, Snapshot, Tick, TimerId,
};
use crate::tuning::ReflexTuning;

/// Timer that flips `Ready` to `Running`
pub const GO_SIGNAL: TimerId = TimerId(1);

#[derive(Debug, Clone, Default)]
pub struct ReflexState {
    pub session: Session,
    /// Host time the go signal fired
    pub cue_at: Option<f64>,
    pub reaction_ms: Option<u64>,
    pub requests: Vec<HostRequest>,
}

#[derive(Debug)]
pub struct Reflex {
    tuning: ReflexTuning,
    rng: Box<dyn RandomSource>,
    pub state: ReflexState,
}

impl Reflex {
    pub fn new(tuning: ReflexTuning, rng: Box<dyn RandomSource>) -> Self {
        Self {
            tuning,
            rng,
            state: ReflexState::default(),
        }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    fn draw_delay(&mut self) -> f64 {
        let (lo, hi) = self.tuning.delay_secs;
        lo + (hi - lo) * f64::from(self.rng.next_f32())
    }
}

impl Game for Reflex {
    fn name(&self) -> &'static str {
        "reflex"
    }

    fn movement(&self) -> Movement {
        Movement::FrameBased
    }

    fn controls(&self) -> Controls {
        Controls::new(self.playfield())
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.state.session
    }

    /// Starting arms the test; `Running` only comes from the go signal
    fn start(&mut self) {
        if self.state.session.arm() {
            let delay_secs = self.draw_delay();
            log::debug!("Go signal in {delay_secs:.3}s");
            self.state.requests.push(HostRequest::Schedule {
                id: GO_SIGNAL,
                delay_secs,
            });
        }
    }

    fn reset(&mut self) {
        self.state = ReflexState::default();
        log::info!("Reflex reset");
    }

    fn apply(&mut self, intent: Intent, now: f64) {
        if intent != Intent::Action {
            return;
        }
        match self.state.session.lifecycle() {
            Lifecycle::Idle => self.start(),
            Lifecycle::Ready => {
                self.state.requests.push(HostRequest::Cancel { id: GO_SIGNAL });
                self.state.session.end(Outcome::Early);
            }
            Lifecycle::Running => {
                let cue_at = self.state.cue_at.unwrap_or(now);
                let ms = ((now - cue_at).max(0.0) * 1000.0).round() as u64;
                self.state.reaction_ms = Some(ms);
                log::info!("Reaction time {ms} ms");
                self.state.session.end(Outcome::Won);
            }
            Lifecycle::Paused | Lifecycle::Ended(_) => {}
        }
    }

    fn advance(&mut self, _tick: &Tick) {}

    fn on_timer(&mut self, id: TimerId, now: f64) {
        if id != GO_SIGNAL || self.state.session.lifecycle() != Lifecycle::Ready {
            return;
        }
        self.state.session.start();
        self.state.cue_at = Some(now);
    }

    fn drain_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.state.requests)
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: None,
            entities: Vec::new(),
            hud: Hud {
                reaction_ms: s.reaction_ms,
                ..Hud::default()
            },
        }
    }
}
