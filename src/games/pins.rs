//! Pin insertion on a rotating disk
//!
//! Pins are stored as disk-relative angles. A pin fired while the disk has
//! turned by `rotation` degrees lands at `launch_angle - rotation`.

use crate::sim::{
    Body, Controls, Difficulty, Entity, EntityId, EntitySet, EntityView, Game, Hud, Intent,
    Movement, Outcome, PlayerView, Playfield, Session, Snapshot, Tick, detect_angular, resolve,
};
use crate::tuning::PinsTuning;
use crate::{normalize_degrees, polar_to_cartesian};

#[derive(Debug, Clone)]
pub struct Pin {
    /// Pin head in disk-local coordinates
    pub body: Entity,
    /// Disk-relative angle in [0, 360)
    pub angle: f32,
}

impl Body for Pin {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

#[derive(Debug, Clone)]
pub struct PinsState {
    pub session: Session,
    pub level: u32,
    /// Disk rotation in degrees, [0, 360)
    pub rotation: f32,
    /// Degrees per tick at this level
    pub spin: Difficulty,
    pub pins: EntitySet<Pin>,
    pub remaining: u32,
}

impl PinsState {
    pub fn new(t: &PinsTuning, level: u32) -> Self {
        Self {
            session: Session::new(),
            level,
            rotation: 0.0,
            spin: Difficulty::at_step(t.rotation, level),
            pins: EntitySet::new(),
            remaining: t.base_pins + t.pins_per_level * level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pins {
    tuning: PinsTuning,
    pub state: PinsState,
}

impl Pins {
    pub fn new(tuning: PinsTuning) -> Self {
        let state = PinsState::new(&tuning, tuning.first_level);
        Self { tuning, state }
    }

    fn playfield(&self) -> Playfield {
        let span = self.tuning.pin_length * 2.0;
        Playfield::new(span, span)
    }

    /// Where a pin fired now would land on the disk
    pub fn insert_angle(&self) -> f32 {
        normalize_degrees(self.tuning.launch_angle - self.state.rotation)
    }

    /// Store a pin at `angle` without any collision check
    pub fn place_pin(&mut self, angle: f32) -> EntityId {
        let angle = normalize_degrees(angle);
        let head = polar_to_cartesian(self.tuning.pin_length, angle);
        self.state.pins.spawn_with(|id| Pin {
            body: Entity::circle(id, head, 0.0),
            angle,
        })
    }

    /// Fire one pin. Returns false if the pin hit another one or nothing
    /// could be fired.
    pub fn shoot(&mut self) -> bool {
        if !self.state.session.is_running() || self.state.remaining == 0 {
            return false;
        }
        let angle = self.insert_angle();
        let placed = self.state.pins.iter().map(|p| (p.body.id, p.angle));
        let hits = detect_angular(EntityId::PLAYER, angle, placed, self.tuning.threshold);
        if let Some(hit) = resolve(&hits).terminal {
            log::debug!("Pin at {angle:.1} collided with {:?}", hit.other);
            self.state.session.end(Outcome::Lost);
            return false;
        }

        self.place_pin(angle);
        self.state.session.award(1);
        self.state.remaining -= 1;
        if self.state.remaining == 0 {
            self.state.session.end(Outcome::Won);
        }
        true
    }

    /// After a win, rebuild at the next level. Returns false otherwise.
    pub fn next_level(&mut self) -> bool {
        if self.state.session.lifecycle().outcome() != Some(Outcome::Won) {
            return false;
        }
        let level = self.state.level + 1;
        self.state = PinsState::new(&self.tuning, level);
        log::info!("Pins advanced to level {level}");
        true
    }

    pub fn reset_to_first_level(&mut self) {
        self.state = PinsState::new(&self.tuning, self.tuning.first_level);
        log::info!("Pins reset to level {}", self.tuning.first_level);
    }
}

impl Game for Pins {
    fn name(&self) -> &'static str {
        "pins"
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

    /// Same level, fresh disk
    fn reset(&mut self) {
        self.state = PinsState::new(&self.tuning, self.state.level);
        log::info!("Pins reset at level {}", self.state.level);
    }

    fn apply(&mut self, intent: Intent, _now: f64) {
        if intent != Intent::Action {
            return;
        }
        // The first press both starts the disk and fires
        self.start();
        self.shoot();
    }

    fn advance(&mut self, tick: &Tick) {
        let step = self.state.spin.value() * tick.units(self.movement());
        self.state.rotation = normalize_degrees(self.state.rotation + step);
    }

    fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            game: self.name(),
            lifecycle: s.session.lifecycle(),
            score: s.session.score(),
            elapsed_ticks: s.session.elapsed_ticks(),
            playfield: self.playfield(),
            player: Some(PlayerView::Angle {
                degrees: s.rotation,
            }),
            entities: s
                .pins
                .iter()
                .map(|p| EntityView::new("pin", p.body.clone()))
                .collect(),
            hud: Hud {
                level: Some(s.level),
                remaining: Some(s.remaining),
                speed: Some(s.spin.value()),
                ..Hud::default()
            },
        }
    }
}
