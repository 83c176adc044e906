//! Entities and physics integration
//!
//! Positions live in a logical coordinate space independent of display
//! pixels, with y growing downward. Anchors differ per shape:
//! - circles: `pos` is the center
//! - rects: `pos` is the top-left corner
//! - lane entities: `pos.y` is the track position, the lane index is in the shape

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_to_range;

/// Monotonic entity id; spawn order equals id order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved for the player-controlled actor
    pub const PLAYER: EntityId = EntityId(0);
}

/// Bounding shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f32 },
    Rect { size: Vec2 },
    /// Discrete lane with a collision reach along the track
    Lane { index: i32, reach: f32 },
}

/// A simulated object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    pub alive: bool,
}

impl Entity {
    pub fn new(id: EntityId, pos: Vec2, vel: Vec2, shape: Shape) -> Self {
        Self {
            id,
            pos,
            vel,
            shape,
            alive: true,
        }
    }

    pub fn circle(id: EntityId, center: Vec2, radius: f32) -> Self {
        Self::new(id, center, Vec2::ZERO, Shape::Circle { radius })
    }

    pub fn rect(id: EntityId, top_left: Vec2, size: Vec2) -> Self {
        Self::new(id, top_left, Vec2::ZERO, Shape::Rect { size })
    }

    pub fn in_lane(id: EntityId, index: i32, track: f32, reach: f32) -> Self {
        Self::new(id, Vec2::new(0.0, track), Vec2::ZERO, Shape::Lane { index, reach })
    }

    /// Minimum corner of the bounding box
    pub fn min(&self) -> Vec2 {
        match self.shape {
            Shape::Circle { radius } => self.pos - Vec2::splat(radius),
            Shape::Rect { .. } => self.pos,
            Shape::Lane { index, reach } => Vec2::new(index as f32, self.pos.y - reach),
        }
    }

    /// Maximum corner of the bounding box
    pub fn max(&self) -> Vec2 {
        match self.shape {
            Shape::Circle { radius } => self.pos + Vec2::splat(radius),
            Shape::Rect { size } => self.pos + size,
            Shape::Lane { index, reach } => Vec2::new(index as f32, self.pos.y + reach),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min() + self.max()) * 0.5
    }

    pub fn lane(&self) -> Option<i32> {
        match self.shape {
            Shape::Lane { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Move a lane entity to another lane (no-op for other shapes)
    pub fn set_lane(&mut self, lane: i32) {
        if let Shape::Lane { ref mut index, .. } = self.shape {
            *index = lane;
        }
    }

    /// Multiply velocity magnitude by `factor`, capped at `max_speed`.
    /// Repeated calls compound.
    pub fn speed_up(&mut self, factor: f32, max_speed: f32) {
        self.vel = (self.vel * factor).clamp_length_max(max_speed);
    }
}

/// Access to the physical body of a game-specific entity wrapper
pub trait Body {
    fn body(&self) -> &Entity;
    fn body_mut(&mut self) -> &mut Entity;
}

impl Body for Entity {
    fn body(&self) -> &Entity {
        self
    }

    fn body_mut(&mut self) -> &mut Entity {
        self
    }
}

/// Ordered collection of anonymous entities.
///
/// Insertion order is spawn order; removal keeps the remaining order intact.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySet<T = Entity> {
    items: Vec<T>,
    next_id: u32,
}

impl<T> Default for EntitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntitySet<T> {
    /// Ids start at 1; 0 belongs to the player
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start numbering after ids already handed out elsewhere in the session
    pub fn starting_at(next_id: u32) -> Self {
        debug_assert!(next_id > EntityId::PLAYER.0, "id 0 is reserved for the player");
        Self {
            items: Vec::new(),
            next_id,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }
}

impl<T: Body> EntitySet<T> {
    /// Spawn an entity built around a freshly allocated id
    pub fn spawn_with(&mut self, build: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let item = build(id);
        debug_assert_eq!(item.body().id, id, "spawned entity must keep its allocated id");
        self.items.push(item);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.body().id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.body().id == id)
    }

    /// Mark an entity dead; it is dropped on the next `sweep`
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(item) if item.body().alive => {
                item.body_mut().alive = false;
                true
            }
            _ => false,
        }
    }

    /// Drop dead entities. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.body().alive);
        before - self.items.len()
    }

    /// Live bodies in spawn order
    pub fn bodies(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter().map(Body::body).filter(|body| body.alive)
    }
}

impl EntitySet<Entity> {
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, shape: Shape) -> EntityId {
        self.spawn_with(|id| Entity::new(id, pos, vel, shape))
    }
}

/// Rectangular logical play area anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Closed containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            clamp_to_range(p.x, 0.0, self.width),
            clamp_to_range(p.y, 0.0, self.height),
        )
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Behaviour at one side of the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Edge {
    /// Pass through untouched
    #[default]
    Open,
    /// Negate the velocity component on contact
    Bounce,
    /// Mark the entity dead once it is fully past the edge
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    fn bit(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
            Side::Top => 4,
            Side::Bottom => 8,
        }
    }
}

/// Per-side boundary rules declared by a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeRules {
    pub left: Edge,
    pub right: Edge,
    pub top: Edge,
    pub bottom: Edge,
}

impl EdgeRules {
    pub const OPEN: EdgeRules = EdgeRules {
        left: Edge::Open,
        right: Edge::Open,
        top: Edge::Open,
        bottom: Edge::Open,
    };

    pub fn get(&self, side: Side) -> Edge {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }
}

/// Boundary contacts produced by one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contacts {
    bounces: u8,
    pub despawned: Option<Side>,
}

impl Contacts {
    pub fn bounced(&self, side: Side) -> bool {
        self.bounces & side.bit() != 0
    }

    pub fn any_bounce(&self) -> bool {
        self.bounces != 0
    }
}

/// Advance `entity` by its velocity scaled by `units`, then apply the edge rules.
///
/// A bounce only flips a component that is still heading out of the field, so
/// an entity lingering across an edge for several ticks flips exactly once.
pub fn integrate(
    entity: &mut Entity,
    units: f32,
    field: &Playfield,
    rules: &EdgeRules,
) -> Contacts {
    debug_assert!(entity.alive, "integrating dead entity {:?}", entity.id);
    entity.pos += entity.vel * units;

    let mut contacts = Contacts::default();
    for side in Side::ALL {
        let (min, max) = (entity.min(), entity.max());
        match rules.get(side) {
            Edge::Open => {}
            Edge::Bounce => {
                let (touching, heading_out) = match side {
                    Side::Left => (min.x <= 0.0, entity.vel.x < 0.0),
                    Side::Right => (max.x >= field.width, entity.vel.x > 0.0),
                    Side::Top => (min.y <= 0.0, entity.vel.y < 0.0),
                    Side::Bottom => (max.y >= field.height, entity.vel.y > 0.0),
                };
                if touching && heading_out {
                    match side {
                        Side::Left | Side::Right => entity.vel.x = -entity.vel.x,
                        Side::Top | Side::Bottom => entity.vel.y = -entity.vel.y,
                    }
                    contacts.bounces |= side.bit();
                }
            }
            Edge::Despawn => {
                let past = match side {
                    Side::Left => max.x < 0.0,
                    Side::Right => min.x > field.width,
                    Side::Top => max.y < 0.0,
                    Side::Bottom => min.y > field.height,
                };
                if past && contacts.despawned.is_none() {
                    entity.alive = false;
                    contacts.despawned = Some(side);
                }
            }
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIELD: Playfield = Playfield::new(400.0, 500.0);

    fn walls() -> EdgeRules {
        EdgeRules {
            left: Edge::Bounce,
            right: Edge::Bounce,
            top: Edge::Bounce,
            bottom: Edge::Open,
        }
    }

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut ball = Entity::circle(EntityId(1), Vec2::new(200.0, 300.0), 5.0);
        ball.vel = Vec2::new(3.0, -3.0);
        let contacts = integrate(&mut ball, 1.0, &FIELD, &walls());
        assert_eq!(ball.pos, Vec2::new(203.0, 297.0));
        assert!(!contacts.any_bounce());
    }

    #[test]
    fn test_integrate_scales_by_units() {
        let mut ball = Entity::circle(EntityId(1), Vec2::new(100.0, 100.0), 5.0);
        ball.vel = Vec2::new(2.0, 0.0);
        integrate(&mut ball, 2.5, &FIELD, &EdgeRules::OPEN);
        assert_eq!(ball.pos, Vec2::new(105.0, 100.0));
    }

    #[test]
    fn test_bounce_flips_once_while_lingering() {
        let mut ball = Entity::circle(EntityId(1), Vec2::new(6.0, 250.0), 5.0);
        ball.vel = Vec2::new(-2.0, 0.0);

        let first = integrate(&mut ball, 1.0, &FIELD, &walls());
        assert!(first.bounced(Side::Left));
        assert_eq!(ball.vel.x, 2.0);

        // Still overlapping the wall, now heading inward: no second flip
        ball.vel.x = 0.5;
        let second = integrate(&mut ball, 1.0, &FIELD, &walls());
        assert!(!second.any_bounce());
        assert_eq!(ball.vel.x, 0.5);
    }

    #[test]
    fn test_exact_contact_bounces() {
        let mut ball = Entity::circle(EntityId(1), Vec2::new(200.0, 8.0), 5.0);
        ball.vel = Vec2::new(0.0, -3.0);
        let contacts = integrate(&mut ball, 1.0, &FIELD, &walls());
        assert!(contacts.bounced(Side::Top));
        assert_eq!(ball.vel.y, 3.0);
    }

    #[test]
    fn test_despawn_only_when_fully_past() {
        let rules = EdgeRules {
            left: Edge::Despawn,
            ..EdgeRules::OPEN
        };
        let mut pipe = Entity::rect(EntityId(3), Vec2::new(-45.0, 0.0), Vec2::new(50.0, 500.0));
        pipe.vel = Vec2::new(-3.0, 0.0);
        let contacts = integrate(&mut pipe, 1.0, &FIELD, &rules);
        assert!(pipe.alive);
        assert_eq!(contacts.despawned, None);

        integrate(&mut pipe, 1.0, &FIELD, &rules);
        assert!(!pipe.alive);
    }

    #[test]
    fn test_speed_up_compounds_and_caps() {
        let mut ball = Entity::circle(EntityId(1), Vec2::ZERO, 5.0);
        ball.vel = Vec2::new(3.0, 4.0);
        ball.speed_up(1.05, 100.0);
        ball.speed_up(1.05, 100.0);
        assert!((ball.vel.length() - 5.0 * 1.05 * 1.05).abs() < 1e-4);

        ball.speed_up(10.0, 12.0);
        assert!((ball.vel.length() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_entity_set_keeps_spawn_order() {
        let mut set: EntitySet = EntitySet::new();
        let a = set.spawn(Vec2::ZERO, Vec2::ZERO, Shape::Circle { radius: 1.0 });
        let b = set.spawn(Vec2::ONE, Vec2::ZERO, Shape::Circle { radius: 1.0 });
        let c = set.spawn(Vec2::ONE, Vec2::ZERO, Shape::Circle { radius: 1.0 });
        assert!(a < b && b < c);

        assert!(set.kill(b));
        assert!(!set.kill(b));
        assert_eq!(set.bodies().count(), 2);
        assert_eq!(set.sweep(), 1);
        let ids: Vec<_> = set.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_lane_bounds() {
        let mut runner = Entity::in_lane(EntityId::PLAYER, 0, 87.5, 7.5);
        assert_eq!(runner.min().y, 80.0);
        assert_eq!(runner.max().y, 95.0);
        runner.set_lane(1);
        assert_eq!(runner.lane(), Some(1));
    }

    proptest! {
        #[test]
        fn bounce_flips_sign_exactly_once(
            x in 6.0f32..394.0,
            vx in -9.0f32..9.0,
            ticks in 1usize..400,
        ) {
            prop_assume!(vx.abs() > 0.1);
            let mut ball = Entity::circle(EntityId(1), Vec2::new(x, 250.0), 5.0);
            ball.vel = Vec2::new(vx, 0.0);
            let mut last_sign = ball.vel.x.signum();
            for _ in 0..ticks {
                let contacts = integrate(&mut ball, 1.0, &FIELD, &walls());
                let sign = ball.vel.x.signum();
                let bounced = contacts.bounced(Side::Left) || contacts.bounced(Side::Right);
                // A sign change happens if and only if a wall was hit this tick
                prop_assert_eq!(sign != last_sign, bounced);
                last_sign = sign;
            }
        }
    }
}
