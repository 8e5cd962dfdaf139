//! Read-only view of a session for a presentation layer.

use bevy_ecs::query::With;
use bevy_ecs::world::World;
use glam::IVec2;

use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::systems::{
    Collectibles, Collider, GameStage, Ghost, GhostBrain, GhostId, GhostKind, GhostStrategy, Hidden, PlayerControlled,
    PlayerLives, Position, Rect, ScoreResource, Velocity, Walls,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub position: IVec2,
    pub size: IVec2,
    pub direction: Direction,
}

impl ActorView {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostView {
    pub id: GhostId,
    pub kind: GhostKind,
    pub strategy: GhostStrategy,
    pub actor: ActorView,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub stage: GameStage,
    pub score: u32,
    pub lives: u8,
    /// `None` until a level has been loaded.
    pub player: Option<ActorView>,
    /// False while the player is blinked off during the death delay.
    pub player_visible: bool,
    /// Sorted by id.
    pub ghosts: Vec<GhostView>,
    pub walls: Vec<Rect>,
    pub collectibles: Vec<Rect>,
    pub board_size: IVec2,
}

impl Snapshot {
    pub fn capture(world: &mut World) -> Snapshot {
        let player = world
            .query_filtered::<(&Position, &Collider, &Velocity, Option<&Hidden>), With<PlayerControlled>>()
            .iter(world)
            .next()
            .map(|(position, collider, velocity, hidden)| {
                (
                    ActorView {
                        position: position.0,
                        size: collider.size,
                        direction: velocity.direction,
                    },
                    hidden.is_none(),
                )
            });

        let mut ghosts: Vec<GhostView> = world
            .query::<(&Ghost, &GhostBrain, &Position, &Collider, &Velocity)>()
            .iter(world)
            .map(|(ghost, brain, position, collider, velocity)| GhostView {
                id: ghost.id,
                kind: ghost.kind,
                strategy: brain.strategy,
                actor: ActorView {
                    position: position.0,
                    size: collider.size,
                    direction: velocity.direction,
                },
            })
            .collect();
        ghosts.sort_by_key(|view| view.id);

        Snapshot {
            stage: world.get_resource::<GameStage>().copied().unwrap_or_default(),
            score: world.get_resource::<ScoreResource>().map_or(0, |s| s.0),
            lives: world.get_resource::<PlayerLives>().map_or(0, |l| l.0),
            player: player.map(|(view, _)| view),
            player_visible: player.is_some_and(|(_, visible)| visible),
            ghosts,
            walls: world.get_resource::<Walls>().map(|w| w.0.clone()).unwrap_or_default(),
            collectibles: world.get_resource::<Collectibles>().map(|c| c.0.clone()).unwrap_or_default(),
            board_size: world.get_resource::<Map>().map_or(IVec2::ZERO, |m| m.board_size()),
        }
    }
}
