//! Simulation parameters and the headless runner's environment configuration.

use std::ops::Range;
use std::time::Duration;

use bevy_ecs::resource::Resource;
use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::constants::{self, collectible, ghost};
use crate::error::{GameError, GameResult};

/// Tunables of a game session. `Default` gives the reference game.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Size of one grid cell, in pixels.
    pub tile_size: i32,
    /// Pixels moved per tick by every actor.
    pub actor_speed: i32,
    pub tick_interval: Duration,
    /// How long the board stays frozen after the player is caught.
    pub death_delay: Duration,
    pub starting_lives: u8,
    pub collectible_score: u32,
    pub collectible_size: i32,
    /// Bounds (ms) of the random delay between periodic ghost redirects.
    pub redirect_interval_ms: Range<u64>,
    /// Chance a ghost redirects right after wrapping across the board.
    pub wrap_redirect_chance: f64,
    /// Fixed RNG seed for deterministic replay. Seeded from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: constants::CELL_SIZE,
            actor_speed: constants::ACTOR_SPEED,
            tick_interval: constants::LOOP_TIME,
            death_delay: constants::DEATH_DELAY,
            starting_lives: constants::STARTING_LIVES,
            collectible_score: constants::COLLECTIBLE_SCORE,
            collectible_size: collectible::SIZE,
            redirect_interval_ms: ghost::REDIRECT_INTERVAL_MS,
            wrap_redirect_chance: ghost::WRAP_REDIRECT_CHANCE,
            seed: None,
        }
    }
}

impl GameConfig {
    /// The reference configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval.as_millis() as u64
    }

    pub fn death_delay_ms(&self) -> u64 {
        self.death_delay.as_millis() as u64
    }

    /// Rejects parameters the simulation cannot run with.
    ///
    /// Map geometry (tile and collectible size) is checked when the map is built.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` describing the first invalid field.
    pub fn validate(&self) -> GameResult<()> {
        if self.actor_speed <= 0 {
            return Err(GameError::Config(format!("actor speed must be positive, got {}", self.actor_speed)));
        }
        if self.tick_interval_ms() == 0 {
            return Err(GameError::Config("tick interval must be at least 1ms".into()));
        }
        if self.redirect_interval_ms.is_empty() {
            return Err(GameError::Config(format!(
                "redirect interval {:?} is empty",
                self.redirect_interval_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.wrap_redirect_chance) {
            return Err(GameError::Config(format!(
                "wrap redirect chance must be within 0..=1, got {}",
                self.wrap_redirect_chance
            )));
        }
        Ok(())
    }
}

/// Configuration of the headless runner, read from `CHOMP_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// `CHOMP_SEED`: fixed RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,
    /// `CHOMP_RUN_TICKS`: stop after this many ticks. Zero runs until exit.
    #[serde(default = "default_run_ticks")]
    pub run_ticks: u64,
    /// `CHOMP_AUTOPILOT_PERIOD`: ticks between random direction intents.
    #[serde(default = "default_autopilot_period")]
    pub autopilot_period: u64,
}

fn default_run_ticks() -> u64 {
    // About one minute of play
    3750
}

fn default_autopilot_period() -> u64 {
    20
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            run_ticks: default_run_ticks(),
            autopilot_period: default_autopilot_period(),
        }
    }
}

impl RunnerConfig {
    /// Loads the runner configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` if a variable is present but cannot be parsed.
    pub fn load() -> GameResult<Self> {
        Self::from_figment(Figment::new().merge(Env::prefixed("CHOMP_")))
    }

    pub fn from_figment(figment: Figment) -> GameResult<Self> {
        let config: RunnerConfig = figment.extract().map_err(|e| GameError::Config(e.to_string()))?;
        if config.autopilot_period == 0 {
            return Err(GameError::Config("autopilot period must be at least one tick".into()));
        }
        Ok(config)
    }

    /// The session configuration this runner plays with.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            seed: self.seed,
            ..GameConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_game_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert_eq!(GameConfig::default().tick_interval_ms(), 16);
        assert_eq!(GameConfig::default().death_delay_ms(), 1000);
    }

    #[test]
    fn test_invalid_game_config() {
        let config = GameConfig {
            actor_speed: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::Config(_))));

        let config = GameConfig {
            redirect_interval_ms: 3000..3000,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::Config(_))));

        let config = GameConfig {
            wrap_redirect_chance: 1.5,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn test_runner_config_defaults() {
        Jail::expect_with(|_jail| {
            let config = RunnerConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, RunnerConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_runner_config_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CHOMP_SEED", "42");
            jail.set_env("CHOMP_RUN_TICKS", "100");
            jail.set_env("CHOMP_AUTOPILOT_PERIOD", "5");

            let config = RunnerConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.seed, Some(42));
            assert_eq!(config.run_ticks, 100);
            assert_eq!(config.autopilot_period, 5);
            assert_eq!(config.game_config().seed, Some(42));
            Ok(())
        });
    }

    #[test]
    fn test_runner_config_rejects_garbage() {
        Jail::expect_with(|jail| {
            jail.set_env("CHOMP_RUN_TICKS", "soon");
            assert!(matches!(RunnerConfig::load(), Err(GameError::Config(_))));

            jail.set_env("CHOMP_RUN_TICKS", "10");
            jail.set_env("CHOMP_AUTOPILOT_PERIOD", "0");
            assert!(matches!(RunnerConfig::load(), Err(GameError::Config(_))));
            Ok(())
        });
    }
}
