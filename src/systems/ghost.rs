//! Ghost decision making: strategy-driven redirects, chasing and wall avoidance.

use bevy_ecs::entity::Entity;
use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res, ResMut};
use glam::IVec2;
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::GameConfig;
use crate::constants::ghost::{AGGRESSIVE_CHASE_CHANCE, EXPLORATORY_CHASE_CHANCE, INERTIAL_KEEP_CHANCE};
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::systems::collision::{would_collide, Rect};
use crate::systems::components::{
    Collider, GameRng, Ghost, GhostBrain, GhostStrategy, PlayerControlled, Position, SimClock, Velocity, Walls,
};
use crate::systems::movement::apply_wrap;

pub type ValidDirections = SmallVec<[Direction; 4]>;

/// Directions a ghost could take for one tick from `position` without hitting a wall
/// or leaving the board horizontally.
pub fn valid_directions(walls: &[Rect], position: IVec2, size: IVec2, speed: i32, board_width: i32) -> ValidDirections {
    Direction::DIRECTIONS
        .iter()
        .copied()
        .filter(|direction| {
            let next = position + direction.as_ivec2() * speed;
            !would_collide(walls, next, size) && next.x >= 0 && next.x + size.x <= board_width
        })
        .collect()
}

/// Picks uniformly among `valid`, or among all four directions if none are valid.
pub fn random_direction(valid: &[Direction], rng: &mut impl Rng) -> Direction {
    let pool = if valid.is_empty() { &Direction::DIRECTIONS[..] } else { valid };
    pool.choose(rng).copied().unwrap_or_default()
}

/// Heads towards the player along the axis with the larger distance.
///
/// Falls back to the other axis when the preferred one is blocked, then to a random
/// valid direction. Ties go to the vertical axis.
pub fn chase_direction(offset: IVec2, valid: &[Direction], rng: &mut impl Rng) -> Direction {
    let horizontal = if offset.x > 0 { Direction::Right } else { Direction::Left };
    let vertical = if offset.y > 0 { Direction::Down } else { Direction::Up };

    let preference = if offset.x.abs() > offset.y.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    preference
        .into_iter()
        .find(|direction| valid.contains(direction))
        .unwrap_or_else(|| random_direction(valid, rng))
}

/// Decides where a ghost goes on a redirect.
///
/// `offset` is the player's position relative to the ghost.
pub fn choose_direction(
    strategy: GhostStrategy,
    current: Direction,
    valid: &[Direction],
    offset: IVec2,
    rng: &mut impl Rng,
) -> Direction {
    if valid.is_empty() {
        return random_direction(valid, rng);
    }

    match strategy {
        GhostStrategy::Aggressive if rng.random_bool(AGGRESSIVE_CHASE_CHANCE) => chase_direction(offset, valid, rng),
        GhostStrategy::Exploratory if rng.random_bool(EXPLORATORY_CHASE_CHANCE) => chase_direction(offset, valid, rng),
        GhostStrategy::InertialRandom if rng.random_bool(INERTIAL_KEEP_CHANCE) && valid.contains(&current) => current,
        _ => random_direction(valid, rng),
    }
}

/// Moves every ghost one tick and applies its redirect rules.
///
/// Ghosts are processed in id order. Each one reads only the player's position (already
/// moved this tick), never another ghost's.
#[allow(clippy::type_complexity)]
pub fn ghost_movement_system(
    map: Res<Map>,
    walls: Res<Walls>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<GameRng>,
    player: Query<&Position, (With<PlayerControlled>, Without<Ghost>)>,
    mut ghosts: Query<(Entity, &Ghost, &mut Position, &Collider, &mut Velocity, &mut GhostBrain), Without<PlayerControlled>>,
) {
    let board_width = map.board_size().x;
    let now = clock.now_ms;
    let player_position = player.single().ok().map(|p| p.0);
    let rng = &mut rng.0;

    let mut order: SmallVec<[(Ghost, Entity); 4]> = ghosts.iter().map(|(entity, ghost, ..)| (*ghost, entity)).collect();
    order.sort_by_key(|(ghost, _)| ghost.id);

    for (ghost, entity) in order {
        let Ok((_, _, mut position, collider, mut velocity, mut brain)) = ghosts.get_mut(entity) else {
            continue;
        };

        let previous = position.0;
        position.0 += velocity.delta();

        if apply_wrap(&mut position.0, collider, board_width) && rng.random_bool(config.wrap_redirect_chance) {
            velocity.direction = random_direction(&[], rng);
            trace!(ghost = ghost.kind.as_ref(), direction = velocity.direction.as_ref(), "Ghost redirected after wrapping");
        }

        // A move into a wall is undone and forces a redirect from where the ghost stood
        if would_collide(&walls.0, position.0, collider.size) {
            position.0 = previous;
            let valid = valid_directions(&walls.0, position.0, collider.size, velocity.speed, board_width);
            let offset = player_position.map_or(IVec2::ZERO, |p| p - position.0);
            velocity.direction = choose_direction(brain.strategy, velocity.direction, &valid, offset, rng);
            brain.rearm(rng, now, config.redirect_interval_ms.clone());
            trace!(
                ghost = ghost.kind.as_ref(),
                direction = velocity.direction.as_ref(),
                "Ghost redirected after hitting a wall"
            );
        }

        if brain.redirect_due(now) {
            let valid = valid_directions(&walls.0, position.0, collider.size, velocity.speed, board_width);
            let offset = player_position.map_or(IVec2::ZERO, |p| p - position.0);
            velocity.direction = choose_direction(brain.strategy, velocity.direction, &valid, offset, rng);
            brain.rearm(rng, now, config.redirect_interval_ms.clone());
            debug!(
                ghost = ghost.kind.as_ref(),
                strategy = brain.strategy.as_ref(),
                direction = velocity.direction.as_ref(),
                next_redirect_ms = brain.next_redirect_ms(),
                "Periodic ghost redirect"
            );
        }
    }
}
