//! Actor movement: buffered turns, wall-checked steps and horizontal screen wrap.

use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res};
use glam::IVec2;
use tracing::trace;

use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::systems::collision::{would_collide, Rect};
use crate::systems::components::{BufferedDirection, Collider, PlayerControlled, Position, Velocity, Walls};

/// Attempts to turn towards `requested`.
///
/// The turn is committed only if one tick of movement in the new direction would not
/// hit a wall; otherwise the velocity is left exactly as it was. Returns whether the
/// actor is now heading in `requested`.
pub fn try_turn(walls: &[Rect], position: IVec2, collider: &Collider, velocity: &mut Velocity, requested: Direction) -> bool {
    if velocity.direction == requested {
        return true;
    }

    let candidate = Velocity::new(requested, velocity.speed);
    if would_collide(walls, position + candidate.delta(), collider.size) {
        return false;
    }

    *velocity = candidate;
    true
}

/// Moves one tick along `velocity`, staying put if the destination overlaps a wall.
///
/// Returns whether the actor moved. A blocked actor keeps its direction and simply stalls.
pub fn step(walls: &[Rect], position: &mut IVec2, collider: &Collider, velocity: &Velocity) -> bool {
    let next = *position + velocity.delta();
    if would_collide(walls, next, collider.size) {
        return false;
    }
    *position = next;
    true
}

/// Teleports an actor that has fully left the board horizontally to the opposite edge.
///
/// Returns the new x coordinate if a wrap happened. There is no vertical wrap.
pub fn wrap_horizontal(x: i32, width: i32, board_width: i32) -> Option<i32> {
    if x < -width {
        Some(board_width)
    } else if x > board_width {
        Some(-width)
    } else {
        None
    }
}

/// Applies [`wrap_horizontal`] in place. Returns whether the actor wrapped.
pub fn apply_wrap(position: &mut IVec2, collider: &Collider, board_width: i32) -> bool {
    match wrap_horizontal(position.x, collider.size.x, board_width) {
        Some(x) => {
            trace!(from = position.x, to = x, "Actor wrapped across the board");
            position.x = x;
            true
        }
        None => false,
    }
}

/// Executes one tick of player movement.
///
/// The buffered direction is retried every tick until the turn is clear, which lets
/// the player queue a turn before reaching an intersection.
pub fn player_movement_system(
    map: Res<Map>,
    walls: Res<Walls>,
    mut players: Query<(&mut Position, &Collider, &mut Velocity, &BufferedDirection), With<PlayerControlled>>,
) {
    let board_width = map.board_size().x;

    for (mut position, collider, mut velocity, buffered) in players.iter_mut() {
        if buffered.0 != velocity.direction && try_turn(&walls.0, position.0, collider, &mut velocity, buffered.0) {
            trace!(direction = buffered.0.as_ref(), "Player turned");
        }

        step(&walls.0, &mut position.0, collider, &velocity);
        apply_wrap(&mut position.0, collider, board_width);
    }
}
