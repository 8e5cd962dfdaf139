//! Centralized error types for the game.
//!
//! Only configuration can fail: once a session is Playing, every simulation
//! decision has a deterministic fallback, so nothing here is raised per tick.

use glam::IVec2;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type for map parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Board has no rows")]
    EmptyBoard,

    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Player spawn defined twice: first at {first}, again at {second}")]
    DuplicatePlayerSpawn { first: IVec2, second: IVec2 },
}

/// Errors related to map operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("Player spawn not found")]
    MissingPlayerSpawn,

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
