//! Map construction: turns a parsed board into the entity layout of a level.

use bevy_ecs::resource::Resource;
use glam::IVec2;
use smallvec::SmallVec;
use tracing::debug;

use crate::constants::MapTile;
use crate::error::{GameResult, MapError};
use crate::map::parser::{MapTileParser, ParsedMap};
use crate::systems::{GhostKind, Rect};

/// Ghost ids are a `u8`, so a board can hold at most this many ghost spawns.
pub const MAX_GHOSTS: usize = u8::MAX as usize + 1;

/// A ghost's spawn, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostSpawn {
    pub kind: GhostKind,
    pub position: IVec2,
}

/// Everything a level needs to be (re)spawned, in pixel space.
///
/// Produced fresh on every call to [`Map::layout`]; two layouts of the same map are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub walls: Vec<Rect>,
    pub collectibles: Vec<Rect>,
    pub ghosts: SmallVec<[GhostSpawn; 4]>,
    pub player: IVec2,
    pub tile_size: i32,
}

/// The validated source grid for a session, along with its world scale.
///
/// The map itself never changes; loading a level reads it to produce a [`Layout`].
#[derive(Resource, Debug, Clone)]
pub struct Map {
    parsed: ParsedMap,
    player_start: IVec2,
    tile_size: i32,
    collectible_size: i32,
}

impl Map {
    /// Parses and validates a raw board.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed boards, `MapError::MissingPlayerSpawn` when
    /// the board has no `P`, and `MapError::InvalidConfig` when the tile or collectible
    /// size is non-positive, the collectible does not fit inside a tile, or the board has
    /// more than [`MAX_GHOSTS`] ghost spawns.
    pub fn new<S: AsRef<str>>(raw_board: &[S], tile_size: i32, collectible_size: i32) -> GameResult<Map> {
        if tile_size <= 0 {
            return Err(MapError::InvalidConfig(format!("tile size must be positive, got {tile_size}")).into());
        }
        if collectible_size <= 0 || tile_size <= collectible_size {
            return Err(MapError::InvalidConfig(format!(
                "tile size {tile_size} cannot hold a {collectible_size}px collectible"
            ))
            .into());
        }

        let parsed = MapTileParser::parse_board(raw_board)?;
        let player_start = parsed.player_start.ok_or(MapError::MissingPlayerSpawn)?;
        if parsed.ghost_starts.len() > MAX_GHOSTS {
            return Err(MapError::InvalidConfig(format!(
                "board has {} ghost spawns, at most {MAX_GHOSTS} are supported",
                parsed.ghost_starts.len()
            ))
            .into());
        }

        debug!(
            columns = parsed.size.x,
            rows = parsed.size.y,
            ghosts = parsed.ghost_starts.len(),
            "Map parsed"
        );

        Ok(Map {
            parsed,
            player_start,
            tile_size,
            collectible_size,
        })
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Size of the board in pixels.
    pub fn board_size(&self) -> IVec2 {
        self.parsed.size.as_ivec2() * self.tile_size
    }

    /// Top-left pixel of a cell.
    pub fn cell_to_pixel(&self, cell: IVec2) -> IVec2 {
        cell * self.tile_size
    }

    pub fn collectible_size(&self) -> i32 {
        self.collectible_size
    }

    pub fn tile_at(&self, cell: IVec2) -> Option<MapTile> {
        self.parsed.tile(cell)
    }

    /// Builds the level layout from the grid.
    ///
    /// Collectibles are centered in their cell and smaller than a tile.
    pub fn layout(&self) -> Layout {
        let tile = IVec2::splat(self.tile_size);
        let collectible_size = IVec2::splat(self.collectible_size);
        let inset = (tile - collectible_size) / 2;

        let mut walls = Vec::new();
        let mut collectibles = Vec::new();
        for (cell, kind) in self.parsed.cells() {
            let origin = self.cell_to_pixel(cell);
            match kind {
                MapTile::Wall => walls.push(Rect::new(origin, tile)),
                MapTile::Collectible => collectibles.push(Rect::new(origin + inset, collectible_size)),
                _ => {}
            }
        }

        let ghosts = self
            .parsed
            .ghost_starts
            .iter()
            .map(|&(kind, cell)| GhostSpawn {
                kind,
                position: self.cell_to_pixel(cell),
            })
            .collect();

        Layout {
            walls,
            collectibles,
            ghosts,
            player: self.cell_to_pixel(self.player_start),
            tile_size: self.tile_size,
        }
    }
}
