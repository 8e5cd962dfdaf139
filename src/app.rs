//! Headless real-time runner: drives a [`Game`] at its tick rate with a random autopilot.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::error::GameResult;
use crate::events::{GameCommand, GameEvent};
use crate::game::Game;
use crate::map::direction::Direction;
use crate::systems::GameStage;

/// Ticks between status lines.
const STATUS_PERIOD: u64 = 600;

/// Owns the game and its timing. Stands in for the presentation layer.
pub struct App {
    pub game: Game,
    config: RunnerConfig,
    /// Separate from the game's generator so the autopilot never perturbs the simulation.
    autopilot: SmallRng,
    last_tick: Instant,
    tick_interval: Duration,
}

impl App {
    /// Creates the session and enters play immediately.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from `Game::new`.
    pub fn new(config: RunnerConfig) -> GameResult<Self> {
        let game_config = config.game_config();
        let tick_interval = game_config.tick_interval;
        let autopilot = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
            None => SmallRng::from_os_rng(),
        };

        let mut game = Game::new(game_config)?;
        game.handle_command(GameCommand::Start)?;

        info!(
            run_ticks = config.run_ticks,
            autopilot_period = config.autopilot_period,
            seed = ?config.seed,
            "Runner ready"
        );
        Ok(App {
            game,
            config,
            autopilot,
            last_tick: Instant::now(),
            tick_interval,
        })
    }

    /// Runs one frame: advances the game by the wall time since the last frame, feeds the
    /// autopilot, then sleeps off whatever is left of the tick interval.
    ///
    /// Returns `false` once the runner should stop.
    ///
    /// # Errors
    ///
    /// Propagates errors from the game.
    pub fn run(&mut self) -> GameResult<bool> {
        let start = Instant::now();
        let elapsed = start.duration_since(self.last_tick);
        self.last_tick = start;

        let ticks_before = self.game.ticks();
        self.game.advance(elapsed)?;
        let ticks_after = self.game.ticks();

        for event in self.game.take_events() {
            match event {
                GameEvent::PlayerCaught { ghost } => debug!(?ghost, status = %self.game.summary(), "Caught"),
                GameEvent::BoardCleared => info!(status = %self.game.summary(), "Board cleared"),
            }
        }

        self.drive(ticks_before, ticks_after)?;

        if self.game.exit_requested() {
            return Ok(false);
        }
        if self.config.run_ticks != 0 && ticks_after >= self.config.run_ticks {
            info!(ticks = ticks_after, status = %self.game.summary(), "Run finished");
            return Ok(false);
        }

        let spent = start.elapsed();
        if spent < self.tick_interval {
            spin_sleep::sleep(self.tick_interval - spent);
        }
        Ok(true)
    }

    /// Plays on the user's behalf: restarts after a game over and steers at random.
    fn drive(&mut self, ticks_before: u64, ticks_after: u64) -> GameResult<()> {
        match self.game.stage() {
            GameStage::GameOver => {
                info!(status = %self.game.summary(), "Restarting after game over");
                self.game.handle_command(GameCommand::Restart)?;
            }
            GameStage::Playing => {
                let period = self.config.autopilot_period;
                if ticks_after / period != ticks_before / period {
                    if let Some(&direction) = Direction::DIRECTIONS.choose(&mut self.autopilot) {
                        self.game.handle_command(GameCommand::MovePlayer(direction))?;
                    }
                }
                if ticks_after / STATUS_PERIOD != ticks_before / STATUS_PERIOD {
                    info!(ticks = ticks_after, status = %self.game.summary(), "Status");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
