//! Game balance and engine tuning
//!
//! Every field has a default matching the shipped game, and documents may be
//! partial: missing fields fall back to the defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::error::{Error, Result};
use crate::sim::{Cadence, LaneRange, Ramp, SpeedBoost};

/// Loop driver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTuning {
    pub cadence: Cadence,
    /// Largest host frame delta accepted (seconds)
    pub max_frame_dt: f32,
    pub max_substeps: u32,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            cadence: Cadence::PerFrame,
            max_frame_dt: MAX_FRAME_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutTuning {
    pub field: Vec2,
    pub ball_radius: f32,
    pub ball_start: Vec2,
    pub ball_velocity: Vec2,
    pub paddle_size: Vec2,
    /// y of the paddle's top edge (the contact line)
    pub paddle_top: f32,
    pub paddle_start_x: f32,
    pub brick_columns: u32,
    pub brick_rows: u32,
    pub brick_size: Vec2,
    /// Top-left of the first brick
    pub brick_origin: Vec2,
    /// Distance between brick origins
    pub brick_pitch: Vec2,
    pub brick_points: u64,
    pub boost: SpeedBoost,
}

impl Default for BreakoutTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(400.0, 500.0),
            ball_radius: 5.0,
            ball_start: Vec2::new(200.0, 300.0),
            ball_velocity: Vec2::new(3.0, -3.0),
            paddle_size: Vec2::new(80.0, 10.0),
            paddle_top: 480.0,
            paddle_start_x: 160.0,
            brick_columns: 7,
            brick_rows: 5,
            brick_size: Vec2::new(50.0, 20.0),
            brick_origin: Vec2::new(10.0, 30.0),
            brick_pitch: Vec2::new(55.0, 25.0),
            brick_points: 10,
            boost: SpeedBoost::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub field: Vec2,
    pub paddle_size: Vec2,
    pub ball_radius: f32,
    /// Contact line of the player paddle (bottom)
    pub player_line: f32,
    /// Contact line of the computer paddle (top)
    pub cpu_line: f32,
    pub serve_velocity: Vec2,
    /// Re-serve horizontal speed is drawn from (-spread, spread)
    pub serve_spread: f32,
    pub cpu_ease: f32,
    pub boost: SpeedBoost,
    pub match_points: u64,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(300.0, 400.0),
            paddle_size: Vec2::new(60.0, 10.0),
            ball_radius: 6.0,
            player_line: 380.0,
            cpu_line: 20.0,
            serve_velocity: Vec2::new(2.0, 3.0),
            serve_spread: 2.0,
            cpu_ease: 0.08,
            boost: SpeedBoost::default(),
            match_points: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    pub field: Vec2,
    pub lanes: LaneRange,
    pub spawn_y: f32,
    pub train_chance: f32,
    pub spawn_interval_ms: f32,
    /// Interval divisor is `speed * spawn_speed_factor`
    pub spawn_speed_factor: f32,
    pub speed: Ramp,
    /// Open hit window along the track
    pub hit_window: (f32, f32),
    pub despawn_y: f32,
    pub ticks_per_meter: u64,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(100.0, 100.0),
            lanes: LaneRange::new(-1, 1),
            spawn_y: -20.0,
            train_chance: 0.3,
            spawn_interval_ms: 1200.0,
            spawn_speed_factor: 0.8,
            speed: Ramp::new(1.5, 0.005, 3.5),
            hit_window: (80.0, 95.0),
            despawn_y: 120.0,
            ticks_per_meter: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinsTuning {
    /// Disk speed in degrees per tick, one step per level
    pub rotation: Ramp,
    pub base_pins: u32,
    pub pins_per_level: u32,
    /// Pins closer than this (degrees) collide
    pub threshold: f32,
    /// World angle pins are fired from
    pub launch_angle: f32,
    /// Distance from the disk center to a pin head
    pub pin_length: f32,
    pub first_level: u32,
}

impl Default for PinsTuning {
    fn default() -> Self {
        Self {
            rotation: Ramp::new(1.5, 0.3, 12.0),
            base_pins: 10,
            pins_per_level: 2,
            threshold: 8.0,
            launch_angle: 90.0,
            pin_length: 120.0,
            first_level: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesTuning {
    pub field: Vec2,
    pub lanes: u32,
    pub tile_height: f32,
    pub spawn_y: f32,
    /// Spawn when the clock exceeds `spawn_frames / speed` reference frames
    pub spawn_frames: f32,
    pub speed: Ramp,
}

impl Default for TilesTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(100.0, 100.0),
            lanes: 4,
            tile_height: 15.0,
            spawn_y: -20.0,
            spawn_frames: 60.0,
            speed: Ramp::new(3.0, 0.05, 8.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlapTuning {
    pub field: Vec2,
    pub bird_x: f32,
    pub bird_start_y: f32,
    pub bird_size: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub pipe_width: f32,
    pub gap: f32,
    pub pipe_speed: f32,
    pub first_gap_top: (f32, f32),
    pub gap_top: (f32, f32),
    /// Spawn the next pipe once the newest one is left of this x
    pub spawn_after_x: f32,
}

impl Default for FlapTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(400.0, 500.0),
            bird_x: 100.0,
            bird_start_y: 250.0,
            bird_size: 30.0,
            gravity: 0.6,
            jump_velocity: -8.0,
            pipe_width: 50.0,
            gap: 150.0,
            pipe_speed: 3.0,
            first_gap_top: (100.0, 300.0),
            gap_top: (50.0, 300.0),
            spawn_after_x: 250.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexTuning {
    pub field: Vec2,
    /// Go-signal delay range in seconds
    pub delay_secs: (f64, f64),
}

impl Default for ReflexTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(100.0, 100.0),
            delay_secs: (1.0, 4.0),
        }
    }
}

/// All tunables in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub engine: EngineTuning,
    pub breakout: BreakoutTuning,
    pub pong: PongTuning,
    pub runner: RunnerTuning,
    pub pins: PinsTuning,
    pub tiles: TilesTuning,
    pub flap: FlapTuning,
    pub reflex: ReflexTuning,
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidTuning(msg.into())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn check_size(name: &str, size: Vec2) -> Result<()> {
    check_positive(&format!("{name}.x"), size.x)?;
    check_positive(&format!("{name}.y"), size.y)
}

fn check_ramp(name: &str, ramp: &Ramp) -> Result<()> {
    if ramp.is_valid() {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} cap {} is below base {} (or step {} is negative)",
            ramp.cap, ramp.base, ramp.step
        )))
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(name: &str, (lo, hi): (T, T)) -> Result<()> {
    if lo < hi {
        Ok(())
    } else {
        Err(invalid(format!("{name} range [{lo}, {hi}) is empty")))
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load `path` if given, falling back to defaults when it is unusable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path.map(Self::load) {
            Some(Ok(tuning)) => tuning,
            Some(Err(e)) => {
                log::warn!("Ignoring tuning file: {e}; using defaults");
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.engine;
        check_positive("engine.max_frame_dt", e.max_frame_dt)?;
        if e.max_substeps == 0 {
            return Err(invalid("engine.max_substeps must be at least 1"));
        }
        if let Cadence::Fixed { step } = e.cadence {
            check_positive("engine.cadence.step", step)?;
        }

        let b = &self.breakout;
        check_size("breakout.field", b.field)?;
        check_positive("breakout.ball_radius", b.ball_radius)?;
        check_size("breakout.paddle_size", b.paddle_size)?;
        check_size("breakout.brick_size", b.brick_size)?;
        if b.brick_columns == 0 || b.brick_rows == 0 {
            return Err(invalid("breakout needs at least one brick"));
        }
        check_positive("breakout.boost.max_speed", b.boost.max_speed)?;

        let p = &self.pong;
        check_size("pong.field", p.field)?;
        check_size("pong.paddle_size", p.paddle_size)?;
        check_positive("pong.ball_radius", p.ball_radius)?;
        if p.cpu_line >= p.player_line {
            return Err(invalid("pong.cpu_line must be above pong.player_line"));
        }
        if !(0.0..=1.0).contains(&p.cpu_ease) {
            return Err(invalid(format!("pong.cpu_ease {} is outside [0, 1]", p.cpu_ease)));
        }
        if p.match_points == 0 {
            return Err(invalid("pong.match_points must be at least 1"));
        }

        let r = &self.runner;
        check_size("runner.field", r.field)?;
        if r.lanes.count() == 0 {
            return Err(invalid("runner.lanes is empty"));
        }
        check_ramp("runner.speed", &r.speed)?;
        check_positive("runner.speed.base", r.speed.base)?;
        check_positive("runner.spawn_interval_ms", r.spawn_interval_ms)?;
        check_positive("runner.spawn_speed_factor", r.spawn_speed_factor)?;
        check_range("runner.hit_window", r.hit_window)?;
        if r.ticks_per_meter == 0 {
            return Err(invalid("runner.ticks_per_meter must be at least 1"));
        }

        let pins = &self.pins;
        check_ramp("pins.rotation", &pins.rotation)?;
        check_positive("pins.threshold", pins.threshold)?;
        check_positive("pins.pin_length", pins.pin_length)?;

        let t = &self.tiles;
        check_size("tiles.field", t.field)?;
        if t.lanes == 0 {
            return Err(invalid("tiles.lanes must be at least 1"));
        }
        check_ramp("tiles.speed", &t.speed)?;
        check_positive("tiles.speed.base", t.speed.base)?;
        check_positive("tiles.tile_height", t.tile_height)?;

        let f = &self.flap;
        check_size("flap.field", f.field)?;
        check_positive("flap.bird_size", f.bird_size)?;
        check_positive("flap.pipe_width", f.pipe_width)?;
        check_positive("flap.gap", f.gap)?;
        check_range("flap.first_gap_top", f.first_gap_top)?;
        check_range("flap.gap_top", f.gap_top)?;

        check_range("reflex.delay_secs", self.reflex.delay_secs)?;
        Ok(())
    }
}
