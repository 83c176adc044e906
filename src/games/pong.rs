//! Pong against a computer paddle

use glam::Vec2;

use crate::clamp_to_range;
use crate::sim::{
    Controls, Edge, EdgeRules, Entity, EntityId, EntityView, Game, Hud, Intent, Movement, Outcome,
    PlayerView, Playfield, RandomSource, Session, Snapshot, SpeedBoost, Tick, integrate,
};
use crate::tuning::PongTuning;

const BALL_ID: EntityId = EntityId(1);
const CPU_ID: EntityId = EntityId(2);

const SIDE_WALLS: EdgeRules = EdgeRules {
    left: Edge::Bounce,
    right: Edge::Bounce,
    top: Edge::Open,
    bottom: Edge::Open,
};

#[derive(Debug, Clone)]
pub struct PongState {
    pub session: Session,
    pub ball: Entity,
    /// Bottom paddle, top edge on the player line
    pub paddle: Entity,
    /// Top paddle, bottom edge on the computer line
    pub cpu: Entity,
    pub cpu_score: u64,
    pub paddle_target: Option<f32>,
}

impl PongState {
    pub fn new(t: &PongTuning) -> Self {
        let center = t.field * 0.5;
        let paddle_x = center.x - t.paddle_size.x * 0.5;
        let mut ball = Entity::circle(BALL_ID, center, t.ball_radius);
        ball.vel = t.serve_velocity;
        Self {
            session: Session::new(),
            ball,
            paddle: Entity::rect(EntityId::PLAYER, Vec2::new(paddle_x, t.player_line), t.paddle_size),
            cpu: Entity::rect(
                CPU_ID,
                Vec2::new(paddle_x, t.cpu_line - t.paddle_size.y),
                t.paddle_size,
            ),
            cpu_score: 0,
            paddle_target: None,
        }
    }
}

/// Which side took a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Point {
    Player,
    Cpu,
}

#[derive(Debug)]
pub struct Pong {
    tuning: PongTuning,
    rng: Box<dyn RandomSource>,
    pub state: PongState,
}

impl Pong {
    pub fn new(tuning: PongTuning, rng: Box<dyn RandomSource>) -> Self {
        let state = PongState::new(&tuning);
        Self { tuning, rng, state }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    fn paddle_x_for(&self, center: f32) -> f32 {
        let max_x = self.tuning.field.x - self.tuning.paddle_size.x;
        clamp_to_range(center - self.tuning.paddle_size.x * 0.5, 0.0, max_x)
    }

    fn ease_cpu(&mut self) {
        let target = self.state.ball.pos.x - self.tuning.paddle_size.x * 0.5;
        let cpu = &mut self.state.cpu;
        let eased = cpu.pos.x + (target - cpu.pos.x) * self.tuning.cpu_ease;
        cpu.pos.x = clamp_to_range(eased, 0.0, self.tuning.field.x - self.tuning.paddle_size.x);
    }

    fn return_ball(ball: &mut Entity, paddle: &Entity, width: f32, up: bool, boost: SpeedBoost) {
        if !(paddle.pos.x..=paddle.pos.x + width).contains(&ball.pos.x) {
            return;
        }
        ball.vel.y = if up { -ball.vel.y.abs() } else { ball.vel.y.abs() };
        ball.speed_up(boost.factor, boost.max_speed);
    }

    fn check_paddles(&mut self) {
        let t = &self.tuning;
        let ball = &mut self.state.ball;
        if ball.vel.y > 0.0 && ball.pos.y + t.ball_radius >= t.player_line {
            Self::return_ball(ball, &self.state.paddle, t.paddle_size.x, true, t.boost);
        } else if ball.vel.y < 0.0 && ball.pos.y - t.ball_radius <= t.cpu_line {
            Self::return_ball(ball, &self.state.cpu, t.paddle_size.x, false, t.boost);
        }
    }

    fn point_scored(&self) -> Option<Point> {
        let y = self.state.ball.pos.y;
        if y < 0.0 {
            Some(Point::Player)
        } else if y > self.tuning.field.y {
            Some(Point::Cpu)
        } else {
            None
        }
    }

    fn serve(&mut self) {
        let spread = self.tuning.serve_spread;
        let dx = self.rng.range(-spread, spread);
        let dy = if self.rng.chance(0.5) {
            self.tuning.serve_velocity.y.abs()
        } else {
            -self.tuning.serve_velocity.y.abs()
        };
        let ball = &mut self.state.ball;
        ball.pos = self.tuning.field * 0.5;
        ball.vel = Vec2::new(dx, dy);
        log::debug!("Serve ({dx:.2}, {dy:.2})");
    }
}

impl Game for Pong {
    fn name(&self) -> &'static str {
        "pong"
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
        self.state = PongState::new(&self.tuning);
        log::info!("Pong reset");
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
        if let Some(center) = self.state.paddle_target.take() {
            self.state.paddle.pos.x = self.paddle_x_for(center);
        }

        integrate(&mut self.state.ball, units, &field, &SIDE_WALLS);
        self.ease_cpu();
        self.check_paddles();

        let Some(point) = self.point_scored() else {
            return;
        };
        let target = self.tuning.match_points;
        match point {
            Point::Player => {
                self.state.session.award(1);
                if self.state.session.score() >= target {
                    self.state.session.end(Outcome::Won);
                    return;
                }
            }
            Point::Cpu => {
                self.state.cpu_score += 1;
                if self.state.cpu_score >= target {
                    self.state.session.end(Outcome::Lost);
                    return;
                }
            }
        }
        log::debug!(
            "Point to {:?}: {} - {}",
            point,
            self.state.session.score(),
            self.state.cpu_score
        );
        self.serve();
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: Some(PlayerView::Body {
                body: s.paddle.clone(),
            }),
            entities: vec![
                EntityView::new("ball", s.ball.clone()),
                EntityView::new("cpu_paddle", s.cpu.clone()),
            ],
            hud: Hud {
                opponent_score: Some(s.cpu_score),
                speed: Some(s.ball.vel.length()),
                ..Hud::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Lifecycle, SequenceRng};

    fn running() -> Pong {
        let mut game = Pong::new(PongTuning::default(), Box::new(SequenceRng::new(vec![0.75, 0.2])));
        game.start();
        game
    }

    fn tick(game: &mut Pong) {
        game.tick(&Tick::new(0, 1.0 / 60.0));
    }

    #[test]
    fn test_serve_from_center() {
        let mut game = running();
        assert_eq!(game.state.ball.pos, Vec2::new(150.0, 200.0));
        tick(&mut game);
        assert_eq!(game.state.ball.pos, Vec2::new(152.0, 203.0));
    }

    #[test]
    fn test_cpu_eases_toward_ball() {
        let mut game = running();
        game.state.ball.pos = Vec2::new(280.0, 200.0);
        game.state.ball.vel = Vec2::ZERO;
        let before = game.state.cpu.pos.x;
        tick(&mut game);
        let expected = before + (250.0 - before) * 0.08;
        assert!((game.state.cpu.pos.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_player_return_boosts() {
        let mut game = running();
        game.state.ball.pos = Vec2::new(150.0, 371.0);
        game.state.ball.vel = Vec2::new(0.0, 3.0);
        tick(&mut game);
        assert!((game.state.ball.vel.y + 3.15).abs() < 1e-4);

        // Still overlapping the contact line but heading away: no second boost
        tick(&mut game);
        assert!((game.state.ball.vel.y + 3.15).abs() < 1e-4);
    }

    #[test]
    fn test_points_and_reserve() {
        let mut game = running();
        game.state.ball.pos = Vec2::new(5.0, 1.0);
        game.state.ball.vel = Vec2::new(0.0, -3.0);
        game.state.cpu.pos.x = 200.0;
        tick(&mut game);
        assert_eq!(game.state.session.score(), 1);
        assert_eq!(game.state.ball.pos, Vec2::new(150.0, 200.0));
        // 0.75 → dx = 1.0, 0.2 < 0.5 → downward
        assert_eq!(game.state.ball.vel, Vec2::new(1.0, 3.0));

        game.state.ball.pos = Vec2::new(5.0, 399.0);
        game.state.ball.vel = Vec2::new(0.0, 3.0);
        game.state.paddle.pos.x = 200.0;
        tick(&mut game);
        assert_eq!(game.state.cpu_score, 1);
        assert_eq!(game.state.session.score(), 1);
    }

    #[test]
    fn test_match_point_ends() {
        let mut game = running();
        game.state.cpu_score = 6;
        game.state.ball.pos = Vec2::new(5.0, 399.0);
        game.state.ball.vel = Vec2::new(0.0, 3.0);
        game.state.paddle.pos.x = 200.0;
        tick(&mut game);
        assert_eq!(game.lifecycle(), Lifecycle::Ended(Outcome::Lost));
    }
}
