use std::ops::Range;

use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::IVec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use strum_macros::{AsRefStr, EnumIter};

use crate::map::direction::Direction;
use crate::systems::collision::Rect;

/// A tag component for entities that are controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Top-left corner of an actor, in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position(pub IVec2);

/// Where an actor returns to when positions are reset. Fixed at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPoint(pub IVec2);

/// The actor's bounding box size. Fixed at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub size: IVec2,
}

impl Collider {
    /// The bounding box this collider would occupy at `position`.
    pub fn rect_at(&self, position: IVec2) -> Rect {
        Rect::new(position, self.size)
    }
}

/// Heading and speed of an actor.
///
/// There is no stored velocity vector: it is always derived from the direction,
/// so it can never disagree with it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Velocity {
    pub direction: Direction,
    pub speed: i32,
}

impl Velocity {
    pub fn new(direction: Direction, speed: i32) -> Self {
        Self { direction, speed }
    }

    /// Per-tick displacement.
    pub fn delta(&self) -> IVec2 {
        self.direction.as_ivec2() * self.speed
    }
}

/// The direction the player last asked for, retried every tick until the turn is clear.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferedDirection(pub Direction);

/// Marks an actor that should not be drawn (the player while the death delay runs).
#[derive(Component, Debug, Default)]
pub struct Hidden;

/// The four ghosts, by color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum GhostKind {
    Blue,
    Orange,
    Pink,
    Red,
}

/// Stable arena index of a ghost within its level. Ghosts are always evaluated in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GhostId(pub u8);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub kind: GhostKind,
    pub id: GhostId,
}

/// How a ghost picks a direction when it redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
pub enum GhostStrategy {
    /// Chases the player most of the time.
    Aggressive,
    /// Chases the player occasionally, wanders otherwise.
    Exploratory,
    /// Tends to keep going the way it was going.
    InertialRandom,
}

impl GhostStrategy {
    /// Picks one of the three strategies uniformly.
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..3) {
            0 => GhostStrategy::Aggressive,
            1 => GhostStrategy::Exploratory,
            _ => GhostStrategy::InertialRandom,
        }
    }
}

/// Per-ghost decision state: its strategy and its periodic redirect timer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostBrain {
    pub strategy: GhostStrategy,
    /// Simulation time (ms) of the last redirect.
    pub last_redirect_ms: u64,
    /// Delay (ms) after `last_redirect_ms` before the next periodic redirect.
    pub redirect_interval_ms: u64,
}

impl GhostBrain {
    /// A brain with a freshly rolled strategy and timer, armed from `now_ms`.
    pub fn new(rng: &mut impl Rng, now_ms: u64, intervals: Range<u64>) -> Self {
        Self {
            strategy: GhostStrategy::random(rng),
            last_redirect_ms: now_ms,
            redirect_interval_ms: rng.random_range(intervals),
        }
    }

    /// Whether the periodic redirect deadline has passed.
    pub fn redirect_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_redirect_ms) > self.redirect_interval_ms
    }

    pub fn next_redirect_ms(&self) -> u64 {
        self.last_redirect_ms + self.redirect_interval_ms
    }

    /// Re-arms the timer after a redirect.
    pub fn rearm(&mut self, rng: &mut impl Rng, now_ms: u64, intervals: Range<u64>) {
        self.last_redirect_ms = now_ms;
        self.redirect_interval_ms = rng.random_range(intervals);
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub spawn: SpawnPoint,
    pub collider: Collider,
    pub velocity: Velocity,
    pub buffered_direction: BufferedDirection,
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub position: Position,
    pub spawn: SpawnPoint,
    pub collider: Collider,
    pub velocity: Velocity,
    pub brain: GhostBrain,
}

/// Static walls of the loaded level.
#[derive(Resource, Debug, Clone, Default)]
pub struct Walls(pub Vec<Rect>);

/// Collectibles still on the board. Eaten ones are removed until the next reload.
#[derive(Resource, Debug, Clone, Default)]
pub struct Collectibles(pub Vec<Rect>);

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u8);

/// The one source of randomness for the simulation.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    /// A generator that replays identically for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(SmallRng::from_os_rng())
    }
}

/// Simulation time. Stamped with each tick's due time, so it never reads the wall clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    pub now_ms: u64,
    /// Number of ticks run since the game was created.
    pub ticks: u64,
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GlobalState {
    pub exit: bool,
}
