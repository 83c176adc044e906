//! Three-lane runner with falling obstacles

use serde::Serialize;

use crate::sim::{
    Body, CollisionClass, Controls, Difficulty, Entity, EntityId, EntitySet, EntityView, Game, Hud,
    Intent, Movement, Outcome, PlayerView, Playfield, Press, RandomSource, Session, Snapshot, Tick,
    detect_collisions, resolve,
};
use crate::tuning::RunnerTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Barrier,
    Train,
}

impl ObstacleKind {
    fn role(self) -> &'static str {
        match self {
            ObstacleKind::Barrier => "barrier",
            ObstacleKind::Train => "train",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub body: Entity,
    pub kind: ObstacleKind,
}

impl Body for Obstacle {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

#[derive(Debug, Clone)]
pub struct RunnerState {
    pub session: Session,
    /// Lane entity whose reach is half the hit window
    pub player: Entity,
    pub obstacles: EntitySet<Obstacle>,
    pub speed: Difficulty,
    pub spawn_clock_ms: f32,
}

impl RunnerState {
    pub fn new(t: &RunnerTuning) -> Self {
        let (lo, hi) = t.hit_window;
        let start_lane = 0_i32.clamp(t.lanes.min, t.lanes.max);
        Self {
            session: Session::new(),
            player: Entity::in_lane(EntityId::PLAYER, start_lane, (lo + hi) * 0.5, (hi - lo) * 0.5),
            obstacles: EntitySet::new(),
            speed: Difficulty::new(t.speed),
            spawn_clock_ms: 0.0,
        }
    }

    pub fn lane(&self) -> i32 {
        self.player.lane().unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Runner {
    tuning: RunnerTuning,
    rng: Box<dyn RandomSource>,
    pub state: RunnerState,
}

impl Runner {
    pub fn new(tuning: RunnerTuning, rng: Box<dyn RandomSource>) -> Self {
        let state = RunnerState::new(&tuning);
        Self { tuning, rng, state }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    /// Meters run so far
    pub fn distance(&self) -> u64 {
        self.state.session.elapsed_ticks() / self.tuning.ticks_per_meter.max(1)
    }

    fn spawn_interval_ms(&self) -> f32 {
        self.tuning.spawn_interval_ms / (self.state.speed.value() * self.tuning.spawn_speed_factor)
    }

    pub fn spawn_obstacle(&mut self, lane: i32, kind: ObstacleKind) -> EntityId {
        let y = self.tuning.spawn_y;
        let id = self.state.obstacles.spawn_with(|id| Obstacle {
            body: Entity::in_lane(id, lane, y, 0.0),
            kind,
        });
        log::debug!("Spawned {kind:?} {id:?} in lane {lane}");
        id
    }

    fn spawn_random(&mut self) {
        let lanes = self.tuning.lanes;
        let lane = lanes.nth(self.rng.index(lanes.count()));
        let kind = if self.rng.chance(self.tuning.train_chance) {
            ObstacleKind::Train
        } else {
            ObstacleKind::Barrier
        };
        self.spawn_obstacle(lane, kind);
        self.state.speed.bump();
    }
}

impl Game for Runner {
    fn name(&self) -> &'static str {
        "runner"
    }

    fn movement(&self) -> Movement {
        Movement::FrameBased
    }

    fn controls(&self) -> Controls {
        Controls::new(self.playfield())
            .with_press(Press::LaneHalves)
            .with_lane_keys()
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.state.session
    }

    fn reset(&mut self) {
        self.state = RunnerState::new(&self.tuning);
        log::info!("Runner reset");
    }

    fn apply(&mut self, intent: Intent, _now: f64) {
        match intent {
            Intent::Action => self.start(),
            Intent::LaneShift(delta) if self.state.session.is_running() => {
                let lane = self.tuning.lanes.shift(self.state.lane(), delta);
                self.state.player.set_lane(lane);
            }
            _ => {}
        }
    }

    fn advance(&mut self, tick: &Tick) {
        // Spawning runs on wall-clock time, movement on ticks
        self.state.spawn_clock_ms += tick.dt * 1000.0;
        if self.state.spawn_clock_ms > self.spawn_interval_ms() {
            self.state.spawn_clock_ms = 0.0;
            self.spawn_random();
        }

        let step = self.state.speed.value() * tick.units(self.movement());
        for obstacle in self.state.obstacles.iter_mut() {
            obstacle.body.pos.y += step;
        }

        let events = detect_collisions(&self.state.player, self.state.obstacles.bodies(), |_| {
            CollisionClass::Hazard
        });
        if let Some(hit) = resolve(&events).terminal {
            log::debug!("Hit obstacle {:?} in lane {}", hit.other, self.state.lane());
            self.state.session.end(Outcome::Lost);
            return;
        }

        let despawn_y = self.tuning.despawn_y;
        let passed: Vec<EntityId> = self
            .state
            .obstacles
            .bodies()
            .filter(|body| body.pos.y >= despawn_y)
            .map(|body| body.id)
            .collect();
        for id in passed {
            self.state.obstacles.kill(id);
            self.state.session.award(1);
        }
        self.state.obstacles.sweep();
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: Some(PlayerView::Lane { index: s.lane() }),
            entities: s
                .obstacles
                .iter()
                .filter(|o| o.body.alive)
                .map(|o| EntityView::new(o.kind.role(), o.body.clone()))
                .collect(),
            hud: Hud {
                speed: Some(s.speed.value()),
                distance: Some(self.distance()),
                ..Hud::default()
            },
        }
    }
}
