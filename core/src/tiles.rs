//! Tile grid storage and solidity classification.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer code stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileCode(i32);

impl TileCode {
    /// Code describing a walkable, empty cell.
    pub const EMPTY: Self = Self(0);

    /// Creates a new tile code wrapper.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the code.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Tile codes that carry gameplay meaning instead of a wall material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservedTiles {
    /// Walkable cell holding the key; cleared to empty once collected.
    pub key: TileCode,
    /// Walkable cell that completes the level when the key is held.
    pub exit: TileCode,
}

impl ReservedTiles {
    /// Default code used for the key tile.
    pub const DEFAULT_KEY: TileCode = TileCode::new(8);
    /// Default code used for the exit tile.
    pub const DEFAULT_EXIT: TileCode = TileCode::new(9);

    /// Creates a reserved code pair.
    #[must_use]
    pub const fn new(key: TileCode, exit: TileCode) -> Self {
        Self { key, exit }
    }
}

impl Default for ReservedTiles {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY, Self::DEFAULT_EXIT)
    }
}

/// Classification of a cell as seen by traversal and movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Walkable cell without content.
    Empty,
    /// Solid wall carrying its material code.
    Wall(TileCode),
    /// Walkable cell holding the key.
    Key,
    /// Walkable cell holding the exit.
    Exit,
    /// Coordinates outside the grid; treated as an implicit wall.
    Boundary,
}

impl TileKind {
    /// Reports whether the cell blocks movement and rays.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall(_) | Self::Boundary)
    }
}

/// Reasons a tile map may be rejected at construction time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Width or height was zero.
    #[error("tile map dimensions must be positive (received {width}x{height})")]
    EmptyDimensions {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The number of codes did not match `width * height`.
    #[error("tile map expected {expected} codes for its dimensions but received {actual}")]
    NotRectangular {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of codes supplied.
        actual: usize,
    },
    /// A cell contained a negative code.
    #[error("tile ({column}, {row}) holds negative code {code}")]
    NegativeCode {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
        /// Offending code.
        code: i32,
    },
    /// Key or exit was configured with a non-positive code.
    #[error("reserved tile codes must be positive (key {key}, exit {exit})")]
    NonPositiveReserved {
        /// Configured key code.
        key: i32,
        /// Configured exit code.
        exit: i32,
    },
    /// Key and exit were configured with the same code.
    #[error("key and exit share reserved code {code}")]
    ReservedCollision {
        /// Shared code.
        code: i32,
    },
}

/// Rectangular grid of tile codes in row-major order.
///
/// Construction validates the layout so traversal never indexes outside the
/// stored cells. The only mutation after construction is [`TileMap::set_tile`],
/// used when the key is collected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileCode>,
    reserved: ReservedTiles,
}

impl TileMap {
    /// Validates and captures a new tile map.
    pub fn new(
        width: u32,
        height: u32,
        tiles: Vec<TileCode>,
        reserved: ReservedTiles,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }

        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(GridError::NotRectangular {
                expected,
                actual: tiles.len(),
            });
        }

        if reserved.key.get() <= 0 || reserved.exit.get() <= 0 {
            return Err(GridError::NonPositiveReserved {
                key: reserved.key.get(),
                exit: reserved.exit.get(),
            });
        }
        if reserved.key == reserved.exit {
            return Err(GridError::ReservedCollision {
                code: reserved.key.get(),
            });
        }

        if let Some(index) = tiles.iter().position(|code| code.get() < 0) {
            return Err(GridError::NegativeCode {
                column: (index % width as usize) as u32,
                row: (index / width as usize) as u32,
                code: tiles[index].get(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
            reserved,
        })
    }

    /// Builds a tile map from raw integer codes.
    pub fn from_codes(
        width: u32,
        height: u32,
        codes: &[i32],
        reserved: ReservedTiles,
    ) -> Result<Self, GridError> {
        let tiles = codes.iter().copied().map(TileCode::new).collect();
        Self::new(width, height, tiles, reserved)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reserved key and exit codes recognised by this map.
    #[must_use]
    pub const fn reserved(&self) -> ReservedTiles {
        self.reserved
    }

    /// Row-major view of every stored code.
    #[must_use]
    pub fn tiles(&self) -> &[TileCode] {
        &self.tiles
    }

    /// Returns the code at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, column: i32, row: i32) -> Option<TileCode> {
        self.index(column, row).map(|index| self.tiles[index])
    }

    /// Classifies the provided cell.
    #[must_use]
    pub fn classify(&self, column: i32, row: i32) -> TileKind {
        match self.tile_at(column, row) {
            None => TileKind::Boundary,
            Some(code) if code == TileCode::EMPTY => TileKind::Empty,
            Some(code) if code == self.reserved.key => TileKind::Key,
            Some(code) if code == self.reserved.exit => TileKind::Exit,
            Some(code) => TileKind::Wall(code),
        }
    }

    /// Reports whether the cell blocks movement and rays.
    ///
    /// Cells outside the grid are always solid.
    #[must_use]
    pub fn is_solid(&self, column: i32, row: i32) -> bool {
        self.classify(column, row).is_solid()
    }

    /// Reports whether the cell containing the continuous point is solid.
    #[must_use]
    pub fn is_solid_at(&self, point: Vec2) -> bool {
        let (column, row) = cell_of(point);
        self.is_solid(column, row)
    }

    /// Overwrites the code stored at the provided cell.
    ///
    /// Returns `false` and leaves the map untouched when the cell lies outside
    /// the grid.
    pub fn set_tile(&mut self, column: i32, row: i32, code: TileCode) -> bool {
        match self.index(column, row) {
            Some(index) => {
                self.tiles[index] = code;
                true
            }
            None => false,
        }
    }

    /// Distinct wall codes present in the map, in ascending order.
    #[must_use]
    pub fn wall_codes(&self) -> Vec<TileCode> {
        let mut codes: Vec<TileCode> = self
            .tiles
            .iter()
            .copied()
            .filter(|code| {
                code.get() > 0 && *code != self.reserved.key && *code != self.reserved.exit
            })
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        if column < self.width && row < self.height {
            Some(row as usize * self.width as usize + column as usize)
        } else {
            None
        }
    }
}

/// Floors a continuous position into the cell that contains it.
#[must_use]
pub fn cell_of(point: Vec2) -> (i32, i32) {
    (point.x.floor() as i32, point.y.floor() as i32)
}
