//! Input abstraction
//!
//! Raw host events are queued between frames and normalized into simulation
//! intents right before the tick that consumes them. Nothing here advances
//! the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Playfield;

/// Keys the games react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Pause,
}

/// Raw host event, in logical playfield coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer, touch or cursor moved
    PointerMove { x: f32, y: f32 },
    /// Pointer pressed or touch began
    PointerDown { x: f32, y: f32 },
    KeyDown { key: Key },
}

/// What a game is asked to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Absolute desired position for a drag-controlled actor, already clamped
    Target(Vec2),
    /// Discrete action: jump, shoot, start
    Action,
    /// Move one lane left (-1) or right (+1)
    LaneShift(i32),
    /// Tap at a playfield position
    Tap(Vec2),
    Pause,
}

/// How a pointer press is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Press {
    /// Any press is the game's discrete action
    #[default]
    Action,
    /// Press position matters; presses outside the playfield are dropped
    Tap,
    /// Left half shifts a lane left, right half shifts right
    LaneHalves,
    Ignore,
}

/// Inclusive lane index range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneRange {
    pub min: i32,
    pub max: i32,
}

impl LaneRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, lane: i32) -> bool {
        (self.min..=self.max).contains(&lane)
    }

    pub fn count(&self) -> usize {
        (self.max - self.min + 1).max(0) as usize
    }

    /// Shift by `delta`; past either edge the lane stays where it was
    pub fn shift(&self, lane: i32, delta: i32) -> i32 {
        let next = lane.saturating_add(delta);
        if self.contains(next) { next } else { lane }
    }

    /// Lane at position `i` counting from `min`
    pub fn nth(&self, i: usize) -> i32 {
        self.min + i as i32
    }
}

/// Per-game input mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub playfield: Playfield,
    /// Pointer movement drives a target position
    pub drag: bool,
    pub press: Press,
    /// Arrow keys shift lanes instead of acting
    pub lane_keys: bool,
}

impl Controls {
    pub fn new(playfield: Playfield) -> Self {
        Self {
            playfield,
            drag: false,
            press: Press::Action,
            lane_keys: false,
        }
    }

    pub fn with_drag(mut self) -> Self {
        self.drag = true;
        self
    }

    pub fn with_press(mut self, press: Press) -> Self {
        self.press = press;
        self
    }

    pub fn with_lane_keys(mut self) -> Self {
        self.lane_keys = true;
        self
    }

    /// Turn a raw event into an intent. Events the game has no use for, and
    /// taps outside the playfield, yield `None`.
    pub fn normalize(&self, event: InputEvent) -> Option<Intent> {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.drag.then(|| Intent::Target(self.playfield.clamp(Vec2::new(x, y))))
            }
            InputEvent::PointerDown { x, y } => {
                let p = Vec2::new(x, y);
                match self.press {
                    Press::Action => Some(Intent::Action),
                    Press::Tap => self.playfield.contains(p).then_some(Intent::Tap(p)),
                    Press::LaneHalves => {
                        let delta = if p.x < self.playfield.width * 0.5 { -1 } else { 1 };
                        Some(Intent::LaneShift(delta))
                    }
                    Press::Ignore if self.drag => {
                        Some(Intent::Target(self.playfield.clamp(p)))
                    }
                    Press::Ignore => None,
                }
            }
            InputEvent::KeyDown { key } => match key {
                Key::Pause => Some(Intent::Pause),
                Key::Left if self.lane_keys => Some(Intent::LaneShift(-1)),
                Key::Right if self.lane_keys => Some(Intent::LaneShift(1)),
                Key::Space | Key::Enter | Key::Up => Some(Intent::Action),
                _ => None,
            },
        }
    }
}

/// Events pushed by the host between frames, drained once per frame
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: Playfield = Playfield::new(400.0, 500.0);

    #[test]
    fn test_drag_target_is_clamped() {
        let controls = Controls::new(FIELD).with_drag();
        let intent = controls.normalize(InputEvent::PointerMove { x: -30.0, y: 900.0 });
        assert_eq!(intent, Some(Intent::Target(Vec2::new(0.0, 500.0))));
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let controls = Controls::new(FIELD);
        assert_eq!(controls.normalize(InputEvent::PointerMove { x: 1.0, y: 1.0 }), None);
    }

    #[test]
    fn test_tap_outside_field_is_dropped() {
        let controls = Controls::new(Playfield::new(100.0, 100.0)).with_press(Press::Tap);
        assert_eq!(controls.normalize(InputEvent::PointerDown { x: 150.0, y: 10.0 }), None);
        assert_eq!(
            controls.normalize(InputEvent::PointerDown { x: 100.0, y: 0.0 }),
            Some(Intent::Tap(Vec2::new(100.0, 0.0)))
        );
    }

    #[test]
    fn test_lane_keys_and_halves() {
        let controls = Controls::new(FIELD).with_press(Press::LaneHalves).with_lane_keys();
        assert_eq!(controls.normalize(InputEvent::KeyDown { key: Key::Left }), Some(Intent::LaneShift(-1)));
        assert_eq!(controls.normalize(InputEvent::PointerDown { x: 300.0, y: 0.0 }), Some(Intent::LaneShift(1)));
        assert_eq!(controls.normalize(InputEvent::PointerDown { x: 10.0, y: 0.0 }), Some(Intent::LaneShift(-1)));
        assert_eq!(controls.normalize(InputEvent::KeyDown { key: Key::Space }), Some(Intent::Action));
    }

    #[test]
    fn test_arrow_keys_ignored_without_lanes() {
        let controls = Controls::new(FIELD);
        assert_eq!(controls.normalize(InputEvent::KeyDown { key: Key::Left }), None);
        assert_eq!(controls.normalize(InputEvent::KeyDown { key: Key::Pause }), Some(Intent::Pause));
    }

    #[test]
    fn test_lane_shift_is_noop_past_edges() {
        let lanes = LaneRange::new(-1, 1);
        assert_eq!(lanes.shift(0, -1), -1);
        assert_eq!(lanes.shift(-1, -1), -1);
        assert_eq!(lanes.shift(1, 1), 1);
        assert_eq!(lanes.count(), 3);
        assert_eq!(lanes.nth(2), 1);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        queue.push(InputEvent::KeyDown { key: Key::Space });
        assert_eq!(queue.len(), 2);
        let events = queue.drain();
        assert_eq!(events[1], InputEvent::KeyDown { key: Key::Space });
        assert!(queue.is_empty());
    }
}
