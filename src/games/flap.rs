//! Flap through the gaps: inertial player, scrolling pipes

use glam::Vec2;

use crate::sim::{
    Body, CollisionClass, Controls, Edge, EdgeRules, Entity, EntityId, EntitySet, EntityView,
    Game, Hud, Intent, Movement, Outcome, PlayerView, Playfield, RandomSource, Session, Shape,
    Snapshot, Tick, detect_collisions, integrate, resolve,
};
use crate::tuning::FlapTuning;

const SCROLL: EdgeRules = EdgeRules {
    left: Edge::Despawn,
    ..EdgeRules::OPEN
};

/// A full-height column with an opening
#[derive(Debug, Clone)]
pub struct Pipe {
    pub body: Entity,
    pub gap_top: f32,
    pub gap: f32,
}

impl Pipe {
    /// True when `bird` fits vertically inside the opening
    pub fn clears(&self, bird: &Entity) -> bool {
        let (top, bottom) = (bird.min().y, bird.max().y);
        top >= self.gap_top && bottom <= self.gap_top + self.gap
    }

    fn segments(&self) -> [Entity; 2] {
        let Entity { id, pos, .. } = self.body;
        let width = self.body.max().x - pos.x;
        let height = self.body.max().y;
        let lower_top = self.gap_top + self.gap;
        [
            Entity::rect(id, pos, Vec2::new(width, self.gap_top)),
            Entity::rect(id, Vec2::new(pos.x, lower_top), Vec2::new(width, height - lower_top)),
        ]
    }
}

impl Body for Pipe {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

#[derive(Debug, Clone)]
pub struct FlapState {
    pub session: Session,
    pub bird: Entity,
    pub pipes: EntitySet<Pipe>,
}

impl FlapState {
    pub fn new(t: &FlapTuning) -> Self {
        Self {
            session: Session::new(),
            bird: Entity::rect(
                EntityId::PLAYER,
                Vec2::new(t.bird_x, t.bird_start_y),
                Vec2::splat(t.bird_size),
            ),
            pipes: EntitySet::new(),
        }
    }
}

#[derive(Debug)]
pub struct Flap {
    tuning: FlapTuning,
    rng: Box<dyn RandomSource>,
    pub state: FlapState,
}

impl Flap {
    pub fn new(tuning: FlapTuning, rng: Box<dyn RandomSource>) -> Self {
        let state = FlapState::new(&tuning);
        Self { tuning, rng, state }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    /// Spawn a pipe at the right edge with its opening top at `gap_top`
    pub fn spawn_pipe(&mut self, gap_top: f32) -> EntityId {
        let t = &self.tuning;
        let pos = Vec2::new(t.field.x, 0.0);
        let size = Vec2::new(t.pipe_width, t.field.y);
        let vel = Vec2::new(-t.pipe_speed, 0.0);
        let gap = t.gap;
        let id = self.state.pipes.spawn_with(|id| Pipe {
            body: Entity::new(id, pos, vel, Shape::Rect { size }),
            gap_top,
            gap,
        });
        log::debug!("Spawned pipe {id:?} with gap at {gap_top:.1}");
        id
    }

    fn spawn_random_pipe(&mut self, (lo, hi): (f32, f32)) {
        let gap_top = self.rng.range(lo, hi);
        self.spawn_pipe(gap_top);
    }

    fn flap(&mut self) {
        self.state.bird.vel.y = self.tuning.jump_velocity;
    }
}

impl Game for Flap {
    fn name(&self) -> &'static str {
        "flap"
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

    /// The first flap starts the run with one pipe in view
    fn start(&mut self) {
        if self.state.session.start() {
            self.spawn_random_pipe(self.tuning.first_gap_top);
            self.flap();
        }
    }

    fn reset(&mut self) {
        self.state = FlapState::new(&self.tuning);
        log::info!("Flap reset");
    }

    fn apply(&mut self, intent: Intent, _now: f64) {
        if intent != Intent::Action {
            return;
        }
        if self.state.session.is_running() {
            self.flap();
        } else {
            self.start();
        }
    }

    fn advance(&mut self, tick: &Tick) {
        let units = tick.units(self.movement());
        let field = self.playfield();

        let bird = &mut self.state.bird;
        bird.vel.y += self.tuning.gravity * units;
        integrate(bird, units, &field, &EdgeRules::OPEN);
        if !(0.0..=field.height).contains(&bird.pos.y) {
            self.state.session.end(Outcome::Lost);
            return;
        }

        let mut passed = 0;
        for pipe in self.state.pipes.iter_mut() {
            if integrate(&mut pipe.body, units, &field, &SCROLL).despawned.is_some() {
                passed += 1;
            }
        }
        if passed > 0 {
            self.state.pipes.sweep();
            self.state.session.award(passed);
        }

        let spawn_after_x = self.tuning.spawn_after_x;
        if self.state.pipes.last().is_some_and(|p| p.body.pos.x < spawn_after_x) {
            self.spawn_random_pipe(self.tuning.gap_top);
        }

        let bird = &self.state.bird;
        let pipes = &self.state.pipes;
        let hits: Vec<_> = detect_collisions(bird, pipes.bodies(), |_| CollisionClass::Hazard)
            .into_iter()
            .filter(|hit| {
                hit.other
                    .and_then(|id| pipes.get(id))
                    .is_some_and(|pipe| !pipe.clears(bird))
            })
            .collect();
        if resolve(&hits).is_terminal() {
            self.state.session.end(Outcome::Lost);
        }
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        let entities = s
            .pipes
            .iter()
            .flat_map(|pipe| {
                let [upper, lower] = pipe.segments();
                [EntityView::new("pipe_top", upper), EntityView::new("pipe_bottom", lower)]
            })
            .collect();
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: Some(PlayerView::Body {
                body: s.bird.clone(),
            }),
            entities,
            hud: Hud::default(),
        }
    }
}
