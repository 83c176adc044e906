//! Collision detection and response classification
//!
//! All checks are discrete samples taken once per tick, using closed
//! intervals so exact contact counts as a hit. There is no continuous sweep:
//! a fast entity can step over a thin target between two ticks, and that is
//! accepted behaviour.

use glam::Vec2;

use super::entity::{Entity, EntityId, Shape, Side};
use crate::circular_distance;

/// Circle vs axis-aligned rect, closed
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_min: Vec2, rect_size: Vec2) -> bool {
    let closest = center.clamp(rect_min, rect_min + rect_size);
    center.distance_squared(closest) <= radius * radius
}

/// Circle vs circle, closed
pub fn circle_circle_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Rect vs rect, closed
pub fn rect_rect_overlap(a_min: Vec2, a_size: Vec2, b_min: Vec2, b_size: Vec2) -> bool {
    let a_max = a_min + a_size;
    let b_max = b_min + b_size;
    a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
}

/// Point inside rect, closed
pub fn point_in_rect(p: Vec2, rect_min: Vec2, rect_size: Vec2) -> bool {
    let rect_max = rect_min + rect_size;
    p.x >= rect_min.x && p.x <= rect_max.x && p.y >= rect_min.y && p.y <= rect_max.y
}

/// Two angles (degrees) collide when their circular distance is below `threshold`
pub fn angles_collide(a: f32, b: f32, threshold: f32) -> bool {
    circular_distance(a, b) < threshold
}

/// Two lane positions collide when they share a lane and their track
/// distance is below the combined reach
pub fn lanes_collide(lane_a: i32, track_a: f32, lane_b: i32, track_b: f32, reach: f32) -> bool {
    lane_a == lane_b && (track_a - track_b).abs() < reach
}

/// Shape-dispatching overlap test between two entities
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle_overlap(a.pos, ra, b.pos, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { size }) => {
            circle_rect_overlap(a.pos, radius, b.pos, size)
        }
        (Shape::Rect { size }, Shape::Circle { radius }) => {
            circle_rect_overlap(b.pos, radius, a.pos, size)
        }
        (Shape::Rect { size: sa }, Shape::Rect { size: sb }) => {
            rect_rect_overlap(a.pos, sa, b.pos, sb)
        }
        (Shape::Lane { index: la, reach: ra }, Shape::Lane { index: lb, reach: rb }) => {
            lanes_collide(la, a.pos.y, lb, b.pos.y, ra + rb)
        }
        // Lane entities only meet other lane entities
        _ => false,
    }
}

/// What a contact means for the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionClass {
    /// Static boundary; the caller reflects the relevant axis
    Wall(Side),
    /// Scoring target: removed, scored, may scale difficulty
    Target,
    /// Terminal hazard: ends the session as lost
    Hazard,
}

/// One detected contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub class: CollisionClass,
    pub subject: EntityId,
    pub other: Option<EntityId>,
}

impl CollisionEvent {
    pub fn new(class: CollisionClass, subject: EntityId, other: Option<EntityId>) -> Self {
        Self {
            class,
            subject,
            other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.class == CollisionClass::Hazard
    }
}

/// Test `subject` against every live candidate, in the order given (spawn
/// order for an `EntitySet`), classifying each contact.
pub fn detect_collisions<'a, I, F>(
    subject: &Entity,
    candidates: I,
    mut classify: F,
) -> Vec<CollisionEvent>
where
    I: IntoIterator<Item = &'a Entity>,
    F: FnMut(&Entity) -> CollisionClass,
{
    candidates
        .into_iter()
        .filter(|other| other.alive && other.id != subject.id && overlaps(subject, other))
        .map(|other| CollisionEvent::new(classify(other), subject.id, Some(other.id)))
        .collect()
}

/// Test a candidate angle against placed angles (rotary games).
/// Every placed angle within `threshold` is a hazard.
pub fn detect_angular<I>(
    subject: EntityId,
    candidate: f32,
    placed: I,
    threshold: f32,
) -> Vec<CollisionEvent>
where
    I: IntoIterator<Item = (EntityId, f32)>,
{
    placed
        .into_iter()
        .filter(|(_, angle)| angles_collide(candidate, *angle, threshold))
        .map(|(id, _)| CollisionEvent::new(CollisionClass::Hazard, subject, Some(id)))
        .collect()
}

/// Events of one tick folded into the changes a game should apply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Targets hit before any terminal contact, in spawn order
    pub targets: Vec<EntityId>,
    /// Walls touched before any terminal contact
    pub walls: Vec<Side>,
    /// The first terminal contact, if any
    pub terminal: Option<CollisionEvent>,
}

impl Resolution {
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Process events in spawn order. The first hazard wins; nothing after it
/// contributes, so a single tick can never end the session twice.
pub fn resolve(events: &[CollisionEvent]) -> Resolution {
    let mut ordered: Vec<&CollisionEvent> = events.iter().collect();
    // Boundary events (no `other`) sort ahead of entity contacts
    ordered.sort_by_key(|event| event.other);

    let mut resolution = Resolution::default();
    for event in ordered {
        match event.class {
            CollisionClass::Wall(side) => resolution.walls.push(side),
            CollisionClass::Target => resolution.targets.push(event.other.unwrap_or(event.subject)),
            CollisionClass::Hazard => {
                resolution.terminal = Some(*event);
                break;
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_rect_contact_is_closed() {
        let paddle_min = Vec2::new(160.0, 480.0);
        let paddle_size = Vec2::new(80.0, 10.0);
        // Ball bottom exactly on the paddle top
        assert!(circle_rect_overlap(Vec2::new(200.0, 475.0), 5.0, paddle_min, paddle_size));
        assert!(!circle_rect_overlap(Vec2::new(200.0, 474.9), 5.0, paddle_min, paddle_size));
    }

    #[test]
    fn test_circle_circle_contact_is_closed() {
        assert!(circle_circle_overlap(Vec2::ZERO, 3.0, Vec2::new(5.0, 0.0), 2.0));
        assert!(!circle_circle_overlap(Vec2::ZERO, 3.0, Vec2::new(5.1, 0.0), 2.0));
    }

    #[test]
    fn test_rect_rect_and_point() {
        let a = Vec2::new(100.0, 200.0);
        let size = Vec2::new(30.0, 30.0);
        assert!(rect_rect_overlap(a, size, Vec2::new(130.0, 0.0), Vec2::new(50.0, 500.0)));
        assert!(!rect_rect_overlap(a, size, Vec2::new(131.0, 0.0), Vec2::new(50.0, 500.0)));
        assert!(point_in_rect(Vec2::new(25.0, 15.0), Vec2::new(0.0, 0.0), Vec2::new(25.0, 15.0)));
    }

    #[test]
    fn test_angles_wrap_at_zero() {
        assert!(angles_collide(2.0, 358.0, 8.0));
        assert!(angles_collide(12.0, 10.0, 8.0));
        assert!(!angles_collide(18.0, 10.0, 8.0));
    }

    #[test]
    fn test_lane_collision_needs_same_lane() {
        let player = Entity::in_lane(EntityId::PLAYER, 0, 87.5, 7.5);
        let same = Entity::in_lane(EntityId(4), 0, 85.0, 0.0);
        let other = Entity::in_lane(EntityId(5), 1, 85.0, 0.0);
        let boundary = Entity::in_lane(EntityId(6), 0, 80.0, 0.0);
        assert!(overlaps(&player, &same));
        assert!(!overlaps(&player, &other));
        assert!(!overlaps(&player, &boundary));
    }

    #[test]
    fn test_detect_skips_dead_and_self() {
        let ball = Entity::circle(EntityId(1), Vec2::new(35.0, 40.0), 5.0);
        let mut dead = Entity::rect(EntityId(2), Vec2::new(10.0, 30.0), Vec2::new(50.0, 20.0));
        dead.alive = false;
        let live = Entity::rect(EntityId(3), Vec2::new(30.0, 30.0), Vec2::new(50.0, 20.0));
        let events = detect_collisions(&ball, [&ball, &dead, &live], |_| CollisionClass::Target);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].other, Some(EntityId(3)));
    }

    #[test]
    fn test_resolve_stops_at_first_hazard() {
        let s = EntityId::PLAYER;
        let events = [
            CollisionEvent::new(CollisionClass::Hazard, s, Some(EntityId(9))),
            CollisionEvent::new(CollisionClass::Target, s, Some(EntityId(2))),
            CollisionEvent::new(CollisionClass::Hazard, s, Some(EntityId(4))),
            CollisionEvent::new(CollisionClass::Target, s, Some(EntityId(7))),
        ];
        let res = resolve(&events);
        assert_eq!(res.targets, vec![EntityId(2)]);
        assert_eq!(res.terminal.and_then(|e| e.other), Some(EntityId(4)));
    }

    #[test]
    fn test_detect_angular_reports_every_close_pin() {
        let placed = [(EntityId(1), 10.0), (EntityId(2), 130.0), (EntityId(3), 250.0)];
        let hits = detect_angular(EntityId::PLAYER, 12.0, placed, 8.0);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_terminal());
        assert!(detect_angular(EntityId::PLAYER, 70.0, placed, 8.0).is_empty());
    }
}
