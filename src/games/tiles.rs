//! Falling tiles: tap each tile before it leaves the field

use glam::Vec2;

use crate::sim::{
    Controls, Difficulty, Entity, EntityId, EntitySet, EntityView, Game, Hud, Intent, Lifecycle,
    Movement, Outcome, Playfield, Press, RandomSource, Session, Snapshot, Tick, point_in_rect,
};
use crate::tuning::TilesTuning;

#[derive(Debug, Clone)]
pub struct TilesState {
    pub session: Session,
    pub tiles: EntitySet,
    pub speed: Difficulty,
    /// Reference frames since the last spawn
    pub spawn_clock: f32,
}

impl TilesState {
    pub fn new(t: &TilesTuning) -> Self {
        Self {
            session: Session::new(),
            tiles: EntitySet::new(),
            speed: Difficulty::new(t.speed),
            spawn_clock: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct Tiles {
    tuning: TilesTuning,
    rng: Box<dyn RandomSource>,
    pub state: TilesState,
}

impl Tiles {
    pub fn new(tuning: TilesTuning, rng: Box<dyn RandomSource>) -> Self {
        let state = TilesState::new(&tuning);
        Self { tuning, rng, state }
    }

    fn playfield(&self) -> Playfield {
        Playfield::new(self.tuning.field.x, self.tuning.field.y)
    }

    fn tile_size(&self) -> Vec2 {
        Vec2::new(
            self.tuning.field.x / self.tuning.lanes.max(1) as f32,
            self.tuning.tile_height,
        )
    }

    pub fn spawn_tile(&mut self, lane: u32) -> EntityId {
        let size = self.tile_size();
        let pos = Vec2::new(lane as f32 * size.x, self.tuning.spawn_y);
        self.state.tiles.spawn_with(|id| Entity::rect(id, pos, size))
    }

    /// Resolve a tap. The oldest tile under the point is consumed; a tap
    /// on empty field is a miss.
    fn tap(&mut self, p: Vec2) {
        let size = self.tile_size();
        let hit = self
            .state
            .tiles
            .bodies()
            .find(|tile| point_in_rect(p, tile.pos, size))
            .map(|tile| tile.id);
        match hit {
            Some(id) => {
                self.state.tiles.kill(id);
                self.state.tiles.sweep();
                self.state.session.award(1);
                let speed = self.state.speed.bump();
                log::debug!("Tile {id:?} tapped, speed {speed:.2}");
            }
            None => {
                log::debug!("Tap at ({:.1}, {:.1}) missed", p.x, p.y);
                self.state.session.end(Outcome::Lost);
            }
        }
    }
}

impl Game for Tiles {
    fn name(&self) -> &'static str {
        "tiles"
    }

    fn movement(&self) -> Movement {
        Movement::DeltaBased
    }

    fn controls(&self) -> Controls {
        Controls::new(self.playfield()).with_press(Press::Tap)
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.state.session
    }

    fn reset(&mut self) {
        self.state = TilesState::new(&self.tuning);
        log::info!("Tiles reset");
    }

    fn apply(&mut self, intent: Intent, _now: f64) {
        match intent {
            Intent::Action => self.start(),
            // The first tap only starts the run
            Intent::Tap(_) if self.lifecycle() == Lifecycle::Idle => self.start(),
            Intent::Tap(p) if self.state.session.is_running() => self.tap(p),
            _ => {}
        }
    }

    fn advance(&mut self, tick: &Tick) {
        let units = tick.units(self.movement());
        let speed = self.state.speed.value();

        self.state.spawn_clock += units;
        if self.state.spawn_clock > self.tuning.spawn_frames / speed {
            self.state.spawn_clock = 0.0;
            let lane = self.rng.index(self.tuning.lanes.max(1) as usize) as u32;
            self.spawn_tile(lane);
        }

        for tile in self.state.tiles.iter_mut() {
            tile.pos.y += speed * units;
        }

        let bottom = self.tuning.field.y;
        if let Some(missed) = self.state.tiles.bodies().find(|tile| tile.pos.y > bottom) {
            log::debug!("Tile {:?} fell through", missed.id);
            self.state.session.end(Outcome::Lost);
        }
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
            entities: s
                .tiles
                .bodies()
                .map(|t| EntityView::new("tile", t.clone()))
                .collect(),
            hud: Hud {
                speed: Some(s.speed.value()),
                ..Hud::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SequenceRng;

    fn running() -> Tiles {
        let mut game = Tiles::new(TilesTuning::default(), Box::new(SequenceRng::new(vec![0.6])));
        game.start();
        game
    }

    #[test]
    fn test_movement_scales_with_delta() {
        let mut a = running();
        let mut b = running();
        let ta = a.spawn_tile(0);
        let tb = b.spawn_tile(0);
        a.tick(&Tick::new(0, 0.032));
        b.tick(&Tick::new(0, 0.016));
        b.tick(&Tick::new(1, 0.016));
        let ya = a.state.tiles.get(ta).map(|t| t.pos.y).unwrap();
        let yb = b.state.tiles.get(tb).map(|t| t.pos.y).unwrap();
        assert!((ya - yb).abs() < 1e-4);
        assert!((ya - (-20.0 + 6.0)).abs() < 1e-4);
    }

    #[test]
    fn test_tap_scores_oldest_and_speeds_up() {
        let mut game = running();
        let first = game.spawn_tile(1);
        let second = game.spawn_tile(1);
        for tile in game.state.tiles.iter_mut() {
            tile.pos.y = 40.0;
        }
        game.apply(Intent::Tap(Vec2::new(30.0, 45.0)), 0.0);
        assert_eq!(game.state.session.score(), 1);
        assert!(game.state.tiles.get(first).is_none());
        assert!(game.state.tiles.get(second).is_some());
        assert!((game.state.speed.value() - 3.05).abs() < 1e-5);
    }

    #[test]
    fn test_tap_on_tile_edge_counts() {
        let mut game = running();
        game.spawn_tile(0);
        if let Some(tile) = game.state.tiles.iter_mut().next() {
            tile.pos.y = 10.0;
        }
        game.apply(Intent::Tap(Vec2::new(25.0, 25.0)), 0.0);
        assert_eq!(game.state.session.score(), 1);
    }

    #[test]
    fn test_tap_on_empty_field_loses() {
        let mut game = running();
        game.apply(Intent::Tap(Vec2::new(50.0, 50.0)), 0.0);
        assert_eq!(game.lifecycle(), Lifecycle::Ended(Outcome::Lost));
    }

    #[test]
    fn test_first_tap_starts() {
        let mut game = Tiles::new(TilesTuning::default(), Box::new(SequenceRng::new(vec![0.1])));
        game.apply(Intent::Tap(Vec2::new(50.0, 50.0)), 0.0);
        assert!(game.state.session.is_running());
    }

    #[test]
    fn test_tile_past_bottom_loses() {
        let mut game = running();
        let id = game.spawn_tile(2);
        if let Some(tile) = game.state.tiles.get_mut(id) {
            tile.pos.y = 99.0;
        }
        game.tick(&Tick::new(0, 0.016));
        assert!(game.state.session.is_ended());
    }

    #[test]
    fn test_spawn_clock_uses_reference_frames() {
        let mut game = running();
        // 60 / 3 = 20 reference frames between spawns
        for i in 0..20 {
            game.tick(&Tick::new(i, 0.016));
        }
        assert!(game.state.tiles.is_empty());
        game.tick(&Tick::new(20, 0.016));
        assert_eq!(game.state.tiles.len(), 1);
        // 0.6 * 4 lanes → lane 2
        assert_eq!(game.state.tiles.first().map(|t| t.pos.x), Some(50.0));
    }
}
