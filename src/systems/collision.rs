//! Axis-aligned bounding box collision.
//!
//! [`Rect::overlaps`] is the only collision predicate in the game: walls, collectibles
//! and ghost-vs-player checks all go through it.

use bevy_ecs::entity::Entity;
use bevy_ecs::event::EventWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res};
use glam::IVec2;
use tracing::debug;

use crate::events::GameEvent;
use crate::systems::components::{Collider, Ghost, PlayerControlled, Position};
use crate::systems::state::GameStage;

/// An axis-aligned rectangle in pixel space. Equality is positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub position: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub const fn new(position: IVec2, size: IVec2) -> Self {
        Self { position, size }
    }

    pub fn left(&self) -> i32 {
        self.position.x
    }

    pub fn right(&self) -> i32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> i32 {
        self.position.y
    }

    pub fn bottom(&self) -> i32 {
        self.position.y + self.size.y
    }

    /// Strict overlap test. Rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left() && self.top() < other.bottom() && self.bottom() > other.top()
    }
}

/// Whether a box of `size` at `position` would overlap any wall.
///
/// Pure query: hypothetical moves are tested here without touching any entity.
pub fn would_collide(walls: &[Rect], position: IVec2, size: IVec2) -> bool {
    let probe = Rect::new(position, size);
    walls.iter().any(|wall| wall.overlaps(&probe))
}

/// Detects a ghost touching the player and reports it.
///
/// At most one `PlayerCaught` is written per tick, no matter how many ghosts overlap,
/// and only while the stage is still `Playing`.
pub fn ghost_collision_system(
    stage: Res<GameStage>,
    player: Query<(&Position, &Collider), With<PlayerControlled>>,
    ghosts: Query<(Entity, &Ghost, &Position, &Collider)>,
    mut events: EventWriter<GameEvent>,
) {
    if *stage != GameStage::Playing {
        return;
    }

    let Ok((player_position, player_collider)) = player.single() else {
        return;
    };
    let player_rect = player_collider.rect_at(player_position.0);

    let caught_by = ghosts
        .iter()
        .filter(|(_, _, position, collider)| collider.rect_at(position.0).overlaps(&player_rect))
        .min_by_key(|(_, ghost, _, _)| ghost.id);

    if let Some((entity, ghost, _, _)) = caught_by {
        debug!(ghost = ghost.kind.as_ref(), ?entity, "Ghost caught the player");
        events.write(GameEvent::PlayerCaught { ghost: entity });
    }
}
