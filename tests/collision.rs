use bevy_ecs::system::RunSystemOnce;
use chomp::events::GameEvent;
use chomp::map::direction::Direction;
use chomp::systems::{
    ghost_collision_system, BufferedDirection, Collider, GameStage, GhostStrategy, PlayerBundle, PlayerControlled, Position,
    Rect, SpawnPoint, Velocity,
};
use glam::IVec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

use common::{brain, collision_world, drain_events, ghost_bundle, TILE};

fn player_at(position: IVec2) -> PlayerBundle {
    PlayerBundle {
        player: PlayerControlled,
        position: Position(position),
        spawn: SpawnPoint(position),
        collider: Collider {
            size: IVec2::splat(TILE),
        },
        velocity: Velocity::new(Direction::Right, 4),
        buffered_direction: BufferedDirection(Direction::Right),
    }
}

#[test]
fn test_touching_edges_do_not_collide() {
    let player = Rect::new(IVec2::new(64, 64), IVec2::splat(TILE));

    assert!(!player.overlaps(&Rect::new(IVec2::new(96, 64), IVec2::splat(TILE))));
    assert!(!player.overlaps(&Rect::new(IVec2::new(64, 32), IVec2::splat(TILE))));
    assert!(player.overlaps(&Rect::new(IVec2::new(95, 95), IVec2::splat(TILE))));
}

#[test]
fn test_overlapping_ghost_catches_player() {
    let mut world = collision_world(GameStage::Playing);
    world.spawn(player_at(IVec2::new(64, 64)));
    let ghost = world
        .spawn(ghost_bundle(0, IVec2::new(80, 64), Direction::Left, brain(GhostStrategy::Aggressive, 0, 1000)))
        .id();

    world.run_system_once(ghost_collision_system).unwrap();

    assert_eq!(drain_events(&mut world), vec![GameEvent::PlayerCaught { ghost }]);
}

#[test]
fn test_one_catch_per_tick() {
    let mut world = collision_world(GameStage::Playing);
    world.spawn(player_at(IVec2::new(64, 64)));
    world.spawn(ghost_bundle(2, IVec2::new(70, 64), Direction::Left, brain(GhostStrategy::Aggressive, 0, 1000)));
    let lowest = world
        .spawn(ghost_bundle(1, IVec2::new(60, 64), Direction::Left, brain(GhostStrategy::Aggressive, 0, 1000)))
        .id();

    world.run_system_once(ghost_collision_system).unwrap();

    let events = drain_events(&mut world);
    assert_that(&events).has_length(1);
    assert_eq!(events[0], GameEvent::PlayerCaught { ghost: lowest });
}

#[test]
fn test_no_catch_at_a_distance() {
    let mut world = collision_world(GameStage::Playing);
    world.spawn(player_at(IVec2::new(64, 64)));
    world.spawn(ghost_bundle(0, IVec2::new(96, 64), Direction::Left, brain(GhostStrategy::Aggressive, 0, 1000)));

    world.run_system_once(ghost_collision_system).unwrap();

    assert_that(&drain_events(&mut world)).is_empty();
}

#[test]
fn test_no_catch_outside_playing() {
    for stage in [GameStage::Paused, GameStage::PlayerDied, GameStage::GameOver, GameStage::Menu] {
        let mut world = collision_world(stage);
        world.spawn(player_at(IVec2::new(64, 64)));
        world.spawn(ghost_bundle(0, IVec2::new(64, 64), Direction::Left, brain(GhostStrategy::Aggressive, 0, 1000)));

        world.run_system_once(ghost_collision_system).unwrap();

        assert_that(&drain_events(&mut world)).is_empty();
    }
}
