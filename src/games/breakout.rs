//! Brick breaker: finite target set, drag-controlled paddle

use glam::Vec2;

use crate::clamp_to_range;
use crate::sim::{
    CollisionClass, Controls, Edge, EdgeRules, Entity, EntityId, EntitySet, EntityView, Game, Hud,
    Intent, Movement, Outcome, PlayerView, Playfield, Session, Side, Snapshot, Tick,
    detect_collisions, integrate, resolve,
};
use crate::tuning::BreakoutTuning;

const BALL_ID: EntityId = EntityId(1);

const WALLS: EdgeRules = EdgeRules {
    left: Edge::Bounce,
    right: Edge::Bounce,
    top: Edge::Bounce,
    bottom: Edge::Despawn,
};

/// Everything that is rebuilt on reset
#[derive(Debug, Clone)]
pub struct BreakoutState {
    pub session: Session,
    pub ball: Entity,
    pub paddle: Entity,
    pub bricks: EntitySet,
    /// Desired paddle center, consumed on the next tick
    pub paddle_target: Option<f32>,
}

impl BreakoutState {
    pub fn new(t: &BreakoutTuning) -> Self {
        let mut ball = Entity::circle(BALL_ID, t.ball_start, t.ball_radius);
        ball.vel = t.ball_velocity;

        let paddle = Entity::rect(
            EntityId::PLAYER,
            Vec2::new(t.paddle_start_x, t.paddle_top),
            t.paddle_size,
        );

        let mut bricks = EntitySet::starting_at(BALL_ID.0 + 1);
        for col in 0..t.brick_columns {
            for row in 0..t.brick_rows {
                let pos = t.brick_origin + t.brick_pitch * Vec2::new(col as f32, row as f32);
                bricks.spawn_with(|id| Entity::rect(id, pos, t.brick_size));
            }
        }

        Self {
            session: Session::new(),
            ball,
            paddle,
            bricks,
            paddle_target: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Breakout {
    tuning: BreakoutTuning,
    pub state: BreakoutState,
}

impl Breakout {
    pub fn new(tuning: BreakoutTuning) -> Self {
        let state = BreakoutState::new(&tuning);
        Self { tuning, state }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    fn move_paddle(&mut self) {
        let Some(center) = self.state.paddle_target.take() else {
            return;
        };
        let width = self.tuning.paddle_size.x;
        let max_x = self.tuning.field.x - width;
        self.state.paddle.pos.x = clamp_to_range(center - width * 0.5, 0.0, max_x);
    }

    /// Paddle line check. Returns false when the ball got past the paddle.
    fn check_paddle(&mut self) -> bool {
        let t = &self.tuning;
        let ball = &mut self.state.ball;
        let paddle = &self.state.paddle;
        let heading_down = ball.vel.y > 0.0;
        if !heading_down || ball.pos.y + t.ball_radius < t.paddle_top {
            return true;
        }
        let span = paddle.pos.x..=paddle.pos.x + t.paddle_size.x;
        if span.contains(&ball.pos.x) {
            ball.vel.y = -ball.vel.y.abs();
            ball.speed_up(t.boost.factor, t.boost.max_speed);
            true
        } else {
            false
        }
    }
}

impl Game for Breakout {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn movement(&self) -> Movement {
        Movement::FrameBased
    }

    fn controls(&self) -> Controls {
        Controls::new(self.playfield()).with_drag()
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.state.session
    }

    fn reset(&mut self) {
        self.state = BreakoutState::new(&self.tuning);
        log::info!("Breakout reset");
    }

    fn apply(&mut self, intent: Intent, _now: f64) {
        match intent {
            Intent::Target(p) => self.state.paddle_target = Some(p.x),
            Intent::Action => self.start(),
            _ => {}
        }
    }

    fn advance(&mut self, tick: &Tick) {
        let units = tick.units(self.movement());
        let field = self.playfield();
        self.move_paddle();

        let contacts = integrate(&mut self.state.ball, units, &field, &WALLS);

        let events = detect_collisions(&self.state.ball, self.state.bricks.bodies(), |_| {
            CollisionClass::Target
        });
        let hits = resolve(&events);
        if !hits.targets.is_empty() {
            for id in &hits.targets {
                self.state.bricks.kill(*id);
                self.state.session.award(self.tuning.brick_points);
            }
            self.state.bricks.sweep();
            // One reflection per tick no matter how many bricks broke
            self.state.ball.vel.y = -self.state.ball.vel.y;
            log::debug!("Broke {} brick(s), {} left", hits.targets.len(), self.state.bricks.len());
        }

        if self.state.bricks.is_empty() {
            self.state.session.end(Outcome::Won);
            return;
        }

        if !self.check_paddle() || contacts.despawned == Some(Side::Bottom) {
            self.state.session.end(Outcome::Lost);
        }
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        let mut entities = vec![EntityView::new("ball", s.ball.clone())];
        entities.extend(s.bricks.bodies().map(|b| EntityView::new("brick", b.clone())));
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: Some(PlayerView::Body {
                body: s.paddle.clone(),
            }),
            entities,
            hud: Hud {
                remaining: Some(s.bricks.len() as u32),
                speed: Some(s.ball.vel.length()),
                ..Hud::default()
            },
        }
    }
}
