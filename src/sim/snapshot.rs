//! Render snapshot
//!
//! An owned, read-only copy of everything a renderer needs for one frame.
//! The renderer never touches game state; it only receives these.

use serde::Serialize;

use super::entity::{Entity, Playfield};
use super::state::Lifecycle;

/// How the player is represented
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerView {
    /// A physical body (paddle, bird)
    Body { body: Entity },
    /// A lane index (runner)
    Lane { index: i32 },
    /// A disk rotation in degrees (pin game)
    Angle { degrees: f32 },
}

/// One non-player entity plus the category a renderer keys styling on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub role: &'static str,
    #[serde(flatten)]
    pub body: Entity,
}

impl EntityView {
    pub fn new(role: &'static str, body: Entity) -> Self {
        Self { role, body }
    }
}

/// Game-specific readouts; unset fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hud {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_score: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u64>,
}

/// Immutable view of one game at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub game: &'static str,
    pub lifecycle: Lifecycle,
    pub score: u64,
    pub elapsed_ticks: u64,
    pub playfield: Playfield,
    pub player: Option<PlayerView>,
    /// Live entities in spawn order
    pub entities: Vec<EntityView>,
    pub hud: Hud,
}

impl Snapshot {
    /// Entities with the given role, in spawn order
    pub fn with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .iter()
            .filter(move |view| view.role == role)
            .map(|view| &view.body)
    }

    pub fn player_body(&self) -> Option<&Entity> {
        match &self.player {
            Some(PlayerView::Body { body }) => Some(body),
            _ => None,
        }
    }
}
