//! This module contains the main game logic and state.

use std::time::Duration;

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule};
use bevy_ecs::world::{Mut, World};
use thousands::Separable;
use tracing::{debug, info, trace, warn};

use crate::config::GameConfig;
use crate::constants::{MAX_CATCH_UP_TICKS, RAW_BOARD};
use crate::error::GameResult;
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::scheduler::{Fired, LoopScheduler};
use crate::snapshot::Snapshot;
use crate::systems::{
    self, caught_system, collectible_system, ghost_collision_system, ghost_movement_system, level_clear_system,
    player_movement_system, BufferedDirection, Collectibles, Collider, GameRng, GameStage, GlobalState, PlayerControlled,
    PlayerLives, Position, ScoreResource, SimClock, Velocity, Walls,
};

/// The core game state manager.
///
/// This struct owns the ECS `World` and the tick `Schedule`. Time only moves through
/// [`Game::advance`]; commands from the presentation layer go through
/// [`Game::handle_command`].
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    /// Total simulated time handed to `advance`.
    elapsed: Duration,
    /// Events raised by ticks since the last `take_events`.
    events: Vec<GameEvent>,
}

impl Game {
    /// Creates a session on the reference board.
    ///
    /// # Errors
    ///
    /// See [`Game::with_board`].
    pub fn new(config: GameConfig) -> GameResult<Game> {
        Self::with_board(&RAW_BOARD[..], config)
    }

    /// Creates a session on `board`, resting in the menu.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid parameters or a malformed board. Nothing
    /// is simulated before the board has been validated.
    pub fn with_board<S: AsRef<str>>(board: &[S], config: GameConfig) -> GameResult<Game> {
        config.validate()?;
        let map = Map::new(board, config.tile_size, config.collectible_size)?;

        let rng = match config.seed {
            Some(seed) => {
                debug!(seed, "Using a fixed RNG seed");
                GameRng::seeded(seed)
            }
            None => GameRng::from_entropy(),
        };

        let mut world = World::default();
        EventRegistry::register_event::<GameEvent>(&mut world);

        world.insert_resource(LoopScheduler::new(config.tick_interval_ms()));
        world.insert_resource(PlayerLives(config.starting_lives));
        world.insert_resource(map);
        world.insert_resource(config);
        world.insert_resource(rng);
        world.insert_resource(Walls::default());
        world.insert_resource(Collectibles::default());
        world.insert_resource(ScoreResource(0));
        world.insert_resource(GameStage::Menu);
        world.insert_resource(SimClock::default());
        world.insert_resource(GlobalState { exit: false });

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                player_movement_system,
                ghost_movement_system,
                ghost_collision_system,
                collectible_system,
                caught_system,
                level_clear_system,
            )
                .chain(),
        );

        info!("Game initialized");
        Ok(Game {
            world,
            schedule,
            elapsed: Duration::ZERO,
            events: Vec::new(),
        })
    }

    /// Applies a player intent. Commands that make no sense in the current stage are ignored.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` if the world was tampered with and is missing
    /// a resource the transition needs.
    pub fn handle_command(&mut self, command: GameCommand) -> GameResult<()> {
        self.sync_clock();
        let stage = self.stage();

        match (command, stage) {
            (GameCommand::Start, GameStage::Menu) | (GameCommand::Restart, GameStage::GameOver) => {
                systems::start_session(&mut self.world)?;
            }
            (GameCommand::MovePlayer(direction), GameStage::Playing) => self.request_direction(direction),
            (GameCommand::TogglePause, GameStage::Playing | GameStage::Paused) | (GameCommand::Back, GameStage::Playing) => {
                systems::toggle_pause(&mut self.world)?;
            }
            (GameCommand::Back, GameStage::Paused) | (GameCommand::ReturnToMenu, _) => {
                systems::return_to_menu(&mut self.world)?;
            }
            (GameCommand::Exit, _) => {
                info!("Exit requested");
                if let Some(mut state) = self.world.get_resource_mut::<GlobalState>() {
                    state.exit = true;
                }
            }
            (command, stage) => {
                trace!(?command, stage = stage.as_ref(), "Command ignored");
            }
        }
        Ok(())
    }

    /// Buffers a direction for the player and tries the turn right away.
    fn request_direction(&mut self, direction: Direction) {
        if !self.world.contains_resource::<Walls>() {
            return;
        }
        self.world.resource_scope(|world, walls: Mut<Walls>| {
            for (position, collider, mut velocity, mut buffered) in world
                .query_filtered::<(&Position, &Collider, &mut Velocity, &mut BufferedDirection), With<PlayerControlled>>()
                .iter_mut(world)
            {
                buffered.0 = direction;
                systems::try_turn(&walls.0, position.0, collider, &mut velocity, direction);
            }
        });
        trace!(direction = direction.as_ref(), "Direction requested");
    }

    /// Advances simulated time by `elapsed` and runs every task that came due.
    ///
    /// At most [`MAX_CATCH_UP_TICKS`] ticks run per call; any older backlog is dropped.
    /// Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Propagates errors from the delayed respawn transition.
    pub fn advance(&mut self, elapsed: Duration) -> GameResult<u32> {
        self.elapsed += elapsed;
        let now = self.now_ms();
        let mut ticks = 0;

        loop {
            let fired = {
                let Some(mut scheduler) = self.world.get_resource_mut::<LoopScheduler>() else {
                    break;
                };

                if ticks >= MAX_CATCH_UP_TICKS {
                    let skipped = scheduler.skip_backlog(now);
                    if skipped > 0 {
                        warn!(skipped, now_ms = now, "Simulation fell behind, dropping ticks");
                    }
                    break;
                }

                scheduler.poll(now)
            };

            match fired {
                Some(Fired::Tick(at)) => {
                    self.run_tick(at);
                    ticks += 1;
                }
                Some(Fired::Respawn(at)) => {
                    self.stamp_clock(at);
                    systems::respawn(&mut self.world)?;
                }
                None => break,
            }
        }

        Ok(ticks)
    }

    fn run_tick(&mut self, at_ms: u64) {
        self.stamp_clock(at_ms);
        if let Some(mut clock) = self.world.get_resource_mut::<SimClock>() {
            clock.ticks += 1;
        }
        formatter::increment_tick();

        self.schedule.run(&mut self.world);

        if let Some(mut events) = self.world.get_resource_mut::<Events<GameEvent>>() {
            self.events.extend(events.drain());
        }
    }

    fn stamp_clock(&mut self, at_ms: u64) {
        if let Some(mut clock) = self.world.get_resource_mut::<SimClock>() {
            clock.now_ms = at_ms;
        }
    }

    fn sync_clock(&mut self) {
        let now = self.now_ms();
        self.stamp_clock(now);
    }

    /// Simulated milliseconds since the session was created.
    pub fn now_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn stage(&self) -> GameStage {
        self.world.get_resource::<GameStage>().copied().unwrap_or_default()
    }

    pub fn score(&self) -> u32 {
        self.world.get_resource::<ScoreResource>().map_or(0, |s| s.0)
    }

    pub fn lives(&self) -> u8 {
        self.world.get_resource::<PlayerLives>().map_or(0, |l| l.0)
    }

    pub fn ticks(&self) -> u64 {
        self.world.get_resource::<SimClock>().map_or(0, |c| c.ticks)
    }

    pub fn exit_requested(&self) -> bool {
        self.world.get_resource::<GlobalState>().is_some_and(|s| s.exit)
    }

    /// Takes the events raised by ticks since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::capture(&mut self.world)
    }

    /// A one-line status for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} score={} lives={}",
            self.stage().as_ref(),
            self.score().separate_with_commas(),
            self.lives()
        )
    }
}
