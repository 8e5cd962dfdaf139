//! The session state machine: stage transitions, level loading, death and respawn.
//!
//! Loading, resetting and respawning touch most of the world at once, so they are plain
//! functions over `&mut World` rather than systems. They run between ticks, or at the
//! end of one, never interleaved with actor movement.

use bevy_ecs::entity::Entity;
use bevy_ecs::event::EventReader;
use bevy_ecs::query::{Or, With};
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Commands, Query, Res, ResMut};
use bevy_ecs::world::{Mut, World};
use glam::IVec2;
use rand::Rng;
use strum_macros::AsRefStr;
use thousands::Separable;
use tracing::{debug, error, info};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::events::GameEvent;
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::scheduler::LoopScheduler;
use crate::systems::components::{
    BufferedDirection, Collectibles, Collider, GameRng, Ghost, GhostBrain, GhostBundle, GhostId, Hidden, PlayerBundle,
    PlayerControlled, PlayerLives, Position, ScoreResource, SimClock, SpawnPoint, Velocity, Walls,
};
use crate::systems::ghost::random_direction;

/// The overall stage of the session.
#[derive(Resource, Debug, Default, PartialEq, Eq, Clone, Copy, AsRefStr)]
pub enum GameStage {
    /// Resting state. Nothing is simulated.
    #[default]
    Menu,
    /// The tick loop is running.
    Playing,
    /// Frozen mid-level; resuming continues exactly where it stopped.
    Paused,
    /// The player was caught; the respawn timer is pending.
    PlayerDied,
    /// No lives left. Only a restart or a return to the menu leaves this stage.
    GameOver,
}

fn missing(what: &str) -> GameError {
    GameError::InvalidState(format!("{what} is not initialized"))
}

fn set_stage(world: &mut World, stage: GameStage) {
    let previous = world.get_resource::<GameStage>().copied();
    world.insert_resource(stage);
    if previous != Some(stage) {
        info!(
            from = previous.as_ref().map_or("none", |p| p.as_ref()),
            to = stage.as_ref(),
            "Stage transition"
        );
    }
}

fn now_ms(world: &World) -> u64 {
    world.get_resource::<SimClock>().map_or(0, |clock| clock.now_ms)
}

/// A freshly rolled brain and heading for a ghost (re)entering play at `now_ms`.
fn fresh_ghost(rng: &mut impl Rng, config: &GameConfig, now_ms: u64) -> (GhostBrain, Direction) {
    let brain = GhostBrain::new(rng, now_ms, config.redirect_interval_ms.clone());
    (brain, random_direction(&[], rng))
}

/// Rebuilds the level from the map: walls, a full set of collectibles, and fresh actors at
/// their spawns. Score, lives and stage are left alone.
///
/// Loading twice from the same map yields the same geometry.
///
/// # Errors
///
/// Returns `GameError::InvalidState` if the world is missing its map, config or RNG.
pub fn load_level(world: &mut World) -> GameResult<()> {
    let layout = world.get_resource::<Map>().ok_or_else(|| missing("map"))?.layout();
    let config = world.get_resource::<GameConfig>().ok_or_else(|| missing("config"))?.clone();
    let now = now_ms(world);

    let actors: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<PlayerControlled>, With<Ghost>)>>()
        .iter(world)
        .collect();
    for entity in actors {
        world.despawn(entity);
    }

    let collider = Collider {
        size: IVec2::splat(layout.tile_size),
    };

    let ghosts: Vec<GhostBundle> = {
        let mut rng = world.get_resource_mut::<GameRng>().ok_or_else(|| missing("rng"))?;
        layout
            .ghosts
            .iter()
            .enumerate()
            .map(|(index, spawn)| {
                let (brain, direction) = fresh_ghost(&mut rng.0, &config, now);
                GhostBundle {
                    ghost: Ghost {
                        kind: spawn.kind,
                        id: GhostId(index as u8),
                    },
                    position: Position(spawn.position),
                    spawn: SpawnPoint(spawn.position),
                    collider,
                    velocity: Velocity::new(direction, config.actor_speed),
                    brain,
                }
            })
            .collect()
    };

    world.spawn(PlayerBundle {
        player: PlayerControlled,
        position: Position(layout.player),
        spawn: SpawnPoint(layout.player),
        collider,
        velocity: Velocity::new(Direction::Right, config.actor_speed),
        buffered_direction: BufferedDirection(Direction::Right),
    });
    let ghost_count = ghosts.len();
    world.spawn_batch(ghosts);

    debug!(
        walls = layout.walls.len(),
        collectibles = layout.collectibles.len(),
        ghosts = ghost_count,
        "Level loaded"
    );
    world.insert_resource(Walls(layout.walls));
    world.insert_resource(Collectibles(layout.collectibles));

    Ok(())
}

/// Puts every actor back on its spawn without touching walls or collectibles.
///
/// The player faces right again and becomes visible. Each ghost gets a new strategy,
/// a redirect timer armed from now, and a random heading.
///
/// # Errors
///
/// Returns `GameError::InvalidState` if the world is missing its config or RNG.
pub fn reset_positions(world: &mut World) -> GameResult<()> {
    let config = world.get_resource::<GameConfig>().ok_or_else(|| missing("config"))?.clone();
    if !world.contains_resource::<GameRng>() {
        return Err(missing("rng"));
    }
    let now = now_ms(world);

    let players: Vec<Entity> = world.query_filtered::<Entity, With<PlayerControlled>>().iter(world).collect();
    for (mut position, spawn, mut velocity, mut buffered) in world
        .query_filtered::<(&mut Position, &SpawnPoint, &mut Velocity, &mut BufferedDirection), With<PlayerControlled>>()
        .iter_mut(world)
    {
        position.0 = spawn.0;
        *velocity = Velocity::new(Direction::Right, velocity.speed);
        buffered.0 = Direction::Right;
    }
    for entity in players {
        world.entity_mut(entity).remove::<Hidden>();
    }

    world.resource_scope(|world, mut rng: Mut<GameRng>| {
        for (mut position, spawn, mut velocity, mut brain) in world
            .query::<(&mut Position, &SpawnPoint, &mut Velocity, &mut GhostBrain)>()
            .iter_mut(world)
        {
            let (fresh_brain, direction) = fresh_ghost(&mut rng.0, &config, now);
            position.0 = spawn.0;
            velocity.direction = direction;
            *brain = fresh_brain;
        }
    });

    debug!(now_ms = now, "Positions reset");
    Ok(())
}

/// Begins a fresh session: score and lives reset, level reloaded, tick loop started.
///
/// # Errors
///
/// Propagates [`load_level`] errors.
pub fn start_session(world: &mut World) -> GameResult<()> {
    let lives = world.get_resource::<GameConfig>().ok_or_else(|| missing("config"))?.starting_lives;
    world.insert_resource(ScoreResource(0));
    world.insert_resource(PlayerLives(lives));
    load_level(world)?;
    set_stage(world, GameStage::Playing);

    let now = now_ms(world);
    world
        .get_resource_mut::<LoopScheduler>()
        .ok_or_else(|| missing("scheduler"))?
        .start(now);
    Ok(())
}

/// Resolves the death delay: game over with no lives left, otherwise back to play from the spawns.
///
/// # Errors
///
/// Propagates [`reset_positions`] errors.
pub fn respawn(world: &mut World) -> GameResult<()> {
    let lives = world.get_resource::<PlayerLives>().ok_or_else(|| missing("lives"))?.0;
    let now = now_ms(world);

    if lives == 0 {
        set_stage(world, GameStage::GameOver);
        world.get_resource_mut::<LoopScheduler>().ok_or_else(|| missing("scheduler"))?.stop();
        let score = world.get_resource::<ScoreResource>().map_or(0, |s| s.0);
        info!(score = score.separate_with_commas(), "Game over");
        return Ok(());
    }

    reset_positions(world)?;
    set_stage(world, GameStage::Playing);
    world
        .get_resource_mut::<LoopScheduler>()
        .ok_or_else(|| missing("scheduler"))?
        .start(now);
    Ok(())
}

/// Pauses while playing and resumes while paused. Other stages ignore it.
///
/// # Errors
///
/// Returns `GameError::InvalidState` if the scheduler is missing.
pub fn toggle_pause(world: &mut World) -> GameResult<()> {
    let now = now_ms(world);
    match world.get_resource::<GameStage>().copied() {
        Some(GameStage::Playing) => {
            world.get_resource_mut::<LoopScheduler>().ok_or_else(|| missing("scheduler"))?.stop();
            set_stage(world, GameStage::Paused);
        }
        Some(GameStage::Paused) => {
            world
                .get_resource_mut::<LoopScheduler>()
                .ok_or_else(|| missing("scheduler"))?
                .start(now);
            set_stage(world, GameStage::Playing);
        }
        _ => {}
    }
    Ok(())
}

/// Abandons whatever is running, including a pending respawn, and rests in the menu.
///
/// # Errors
///
/// Returns `GameError::InvalidState` if the scheduler is missing.
pub fn return_to_menu(world: &mut World) -> GameResult<()> {
    world.get_resource_mut::<LoopScheduler>().ok_or_else(|| missing("scheduler"))?.stop();
    set_stage(world, GameStage::Menu);
    Ok(())
}

/// Handles the player being caught: one life lost, player hidden, respawn timer armed.
pub fn caught_system(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut stage: ResMut<GameStage>,
    mut lives: ResMut<PlayerLives>,
    mut scheduler: ResMut<LoopScheduler>,
    clock: Res<SimClock>,
    config: Res<GameConfig>,
    player: Query<Entity, With<PlayerControlled>>,
) {
    let caught = events.read().any(|event| matches!(event, GameEvent::PlayerCaught { .. }));
    if !caught || *stage != GameStage::Playing {
        return;
    }

    lives.0 = lives.0.saturating_sub(1);
    *stage = GameStage::PlayerDied;
    scheduler.schedule_respawn(clock.now_ms + config.death_delay_ms());

    for entity in player.iter() {
        commands.entity(entity).insert(Hidden);
    }

    info!(lives = lives.0, "Player caught");
}

/// Reloads the level once no collectibles are left. Score and lives carry over.
pub fn level_clear_system(world: &mut World) {
    let playing = world.get_resource::<GameStage>() == Some(&GameStage::Playing);
    let cleared = world.get_resource::<Collectibles>().is_some_and(|c| c.0.is_empty());
    if !playing || !cleared {
        return;
    }

    match load_level(world) {
        Ok(()) => info!("Level cleared, board reloaded"),
        Err(e) => error!(error = %e, "Failed to reload the level"),
    }
}
