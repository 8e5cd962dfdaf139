#![allow(dead_code)]

use std::time::Duration;

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::world::World;
use chomp::config::GameConfig;
use chomp::events::{GameCommand, GameEvent};
use chomp::game::Game;
use chomp::map::builder::Map;
use chomp::map::direction::Direction;
use chomp::systems::{
    Collider, GameRng, GameStage, Ghost, GhostBrain, GhostBundle, GhostId, GhostKind, GhostStrategy, PlayerControlled,
    Position, SimClock, SpawnPoint, Velocity, Walls,
};
use glam::IVec2;

pub const TEST_SEED: u64 = 0x5EED;
pub const TICK: Duration = Duration::from_millis(16);
pub const TILE: i32 = 32;

/// A corridor open at both ends, with one unreachable collectible so the level never clears.
pub const TUNNEL_BOARD: [&str; 4] = [
    "XXXXXXX", //
    "X XXXXX", //
    "OOOPOOO", //
    "XXXXXXX",
];

/// A small room: the player spawns on the bottom row, with a gap in the middle wall above.
pub const ROOM_BOARD: [&str; 5] = [
    "XXXXXXX", //
    "X     X", //
    "X XXX X", //
    "X  P  X", //
    "XXXXXXX",
];

/// An open field with no walls at all, for ghost decision tests.
pub const OPEN_BOARD: [&str; 5] = [
    "OOOOOOOOO", //
    "OOOOOOOOO", //
    "OOOOPOOOO", //
    "OOOOOOOOO", //
    "OOOOOOOOO",
];

pub fn config() -> GameConfig {
    GameConfig::seeded(TEST_SEED)
}

pub fn game_on(board: &[&str]) -> Game {
    Game::with_board(board, config()).expect("test board should be valid")
}

/// A game on `board` that has already left the menu.
pub fn playing_on(board: &[&str]) -> Game {
    let mut game = game_on(board);
    game.handle_command(GameCommand::Start).expect("start should succeed");
    game
}

/// Advances exactly `n` tick intervals.
pub fn tick(game: &mut Game, n: u32) {
    for _ in 0..n {
        game.advance(TICK).expect("advance should succeed");
    }
}

pub fn player_position(game: &mut Game) -> IVec2 {
    game.snapshot().player.expect("player should be spawned").position
}

pub fn set_player_position(game: &mut Game, position: IVec2) {
    let mut query = game.world.query_filtered::<&mut Position, With<PlayerControlled>>();
    for mut current in query.iter_mut(&mut game.world) {
        current.0 = position;
    }
}

/// Moves the ghost with `id` and returns its previous position.
pub fn set_ghost_position(game: &mut Game, id: u8, position: IVec2) -> IVec2 {
    let mut query = game.world.query::<(&Ghost, &mut Position)>();
    let mut previous = None;
    for (ghost, mut current) in query.iter_mut(&mut game.world) {
        if ghost.id == GhostId(id) {
            previous = Some(current.0);
            current.0 = position;
        }
    }
    previous.expect("ghost should exist")
}

/// A bare world with just what the ghost movement system reads.
pub fn ghost_world(board: &[&str], now_ms: u64, config: GameConfig) -> World {
    let mut world = World::default();
    let map = Map::new(board, config.tile_size, config.collectible_size).expect("test board should be valid");
    world.insert_resource(Walls(map.layout().walls));
    world.insert_resource(map);
    world.insert_resource(GameRng::seeded(TEST_SEED));
    world.insert_resource(SimClock { now_ms, ticks: 0 });
    world.insert_resource(config);
    world
}

/// A bare world for collision tests, with the given stage and event storage.
pub fn collision_world(stage: GameStage) -> World {
    let mut world = World::default();
    EventRegistry::register_event::<GameEvent>(&mut world);
    world.insert_resource(stage);
    world
}

pub fn ghost_bundle(id: u8, position: IVec2, direction: Direction, brain: GhostBrain) -> GhostBundle {
    GhostBundle {
        ghost: Ghost {
            kind: GhostKind::Red,
            id: GhostId(id),
        },
        position: Position(position),
        spawn: SpawnPoint(position),
        collider: Collider {
            size: IVec2::splat(TILE),
        },
        velocity: Velocity::new(direction, 4),
        brain,
    }
}

/// A brain whose periodic redirect is `interval_ms` after `last_redirect_ms`.
pub fn brain(strategy: GhostStrategy, last_redirect_ms: u64, interval_ms: u64) -> GhostBrain {
    GhostBrain {
        strategy,
        last_redirect_ms,
        redirect_interval_ms: interval_ms,
    }
}

pub fn drain_events(world: &mut World) -> Vec<GameEvent> {
    world.resource_mut::<Events<GameEvent>>().drain().collect()
}
