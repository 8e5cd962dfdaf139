//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::{IVec2, UVec2};

/// The fixed interval between simulation ticks (~60 Hz).
pub const LOOP_TIME: Duration = Duration::from_millis(16);

/// How long the board stays frozen after the player is caught.
pub const DEATH_DELAY: Duration = Duration::from_millis(1000);

/// The most ticks a single `advance` call will run before dropping the backlog.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

/// The size of each cell, in pixels.
pub const CELL_SIZE: i32 = 32;
/// The size of the reference board, in cells.
pub const BOARD_CELL_SIZE: UVec2 = UVec2::new(19, 21);
/// The size of the reference board, in pixels.
pub const BOARD_PIXEL_SIZE: IVec2 = IVec2::new(
    BOARD_CELL_SIZE.x as i32 * CELL_SIZE,
    BOARD_CELL_SIZE.y as i32 * CELL_SIZE,
);

/// Distance every actor covers per tick, in pixels.
pub const ACTOR_SPEED: i32 = 4;

/// Number of lives a fresh session starts with.
pub const STARTING_LIVES: u8 = 3;

/// Score awarded per collectible.
pub const COLLECTIBLE_SCORE: u32 = 10;

pub mod collectible {
    /// Width and height of a collectible, in pixels. It is centered in its cell.
    pub const SIZE: i32 = 4;
}

pub mod ghost {
    use std::ops::Range;

    /// Bounds (ms) of the random delay between periodic redirects.
    pub const REDIRECT_INTERVAL_MS: Range<u64> = 1000..3000;
    /// Chance of chasing the player on a redirect, per strategy.
    pub const AGGRESSIVE_CHASE_CHANCE: f64 = 0.7;
    pub const EXPLORATORY_CHASE_CHANCE: f64 = 0.3;
    /// Chance an inertial ghost keeps its heading when it is still open.
    pub const INERTIAL_KEEP_CHANCE: f64 = 0.5;
    /// Chance of a spontaneous redirect right after wrapping through a board edge.
    pub const WRAP_REDIRECT_CHANCE: f64 = 0.1;
}

/// An enum representing the different types of tiles on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTile {
    /// Unused space: nothing spawns here.
    Empty,
    /// A wall tile.
    Wall,
    /// A collectible sits in the middle of this tile.
    Collectible,
    /// A ghost spawns here.
    GhostSpawn(crate::systems::GhostKind),
    /// The player spawns here.
    PlayerSpawn,
}

/// The raw layout of the game board, as rows of characters.
///
/// `X` wall, `b`/`o`/`p`/`r` ghost spawns, `P` player spawn, space collectible.
/// `O` is reserved for a special collectible and currently behaves as empty space.
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "XXXXXXXXXXXXXXXXXXX",
    "X        X        X",
    "X XX XXX X XXX XX X",
    "X                 X",
    "X XX X XXXXX X XX X",
    "X    X       X    X",
    "XXXX XXXX XXXX XXXX",
    "OOOX X       X XOOO",
    "XXXX X XXrXX X XXXX",
    "O       bpo       O",
    "XXXX X XXXXX X XXXX",
    "OOOX X       X XOOO",
    "XXXX X XXXXX X XXXX",
    "X        X        X",
    "X XX XXX X XXX XX X",
    "X  X     P     X  X",
    "XX X X XXXXX X X XX",
    "X    X   X   X    X",
    "X XXXXXX X XXXXXX X",
    "X                 X",
    "XXXXXXXXXXXXXXXXXXX",
];
