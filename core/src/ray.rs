//! Ray hit geometry and the drawable wall slices derived from it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tiles::TileCode;

/// Grid-line axis crossed by the final traversal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The ray crossed a vertical grid line (x changed).
    X,
    /// The ray crossed a horizontal grid line (y changed).
    Y,
}

/// Material reported for the cell that stopped a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitMaterial {
    /// A solid wall cell inside the grid.
    Wall(TileCode),
    /// The ray left the grid; rendered as an edge wall.
    Boundary,
}

/// Result of casting the ray for a single screen column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Screen column the ray was cast for.
    pub column: u32,
    /// Unnormalised ray direction (`direction + camera_x * plane`).
    pub ray_direction: Vec2,
    /// Distance to the wall projected onto the camera's forward axis.
    pub perp_distance: f32,
    /// Axis crossed by the last traversal step.
    pub side: Side,
    /// Material of the cell that stopped the ray.
    pub material: HitMaterial,
    /// Map cell that stopped the ray; may lie outside the grid.
    pub cell: (i32, i32),
}

/// Identifier of a wall texture within the active texture set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(u32);

impl TextureId {
    /// Creates a new texture identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the texture within its texture set.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Lighting cue applied to a wall slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shade {
    /// Full brightness, used for X-side hits.
    Lit,
    /// Darkened tint, used for Y-side hits.
    Shadowed,
}

impl Shade {
    /// Shade applied to hits on the provided side.
    #[must_use]
    pub const fn for_side(side: Side) -> Self {
        match side {
            Side::X => Self::Lit,
            Side::Y => Self::Shadowed,
        }
    }

    /// Per-channel RGB intensity of the tint in the range 0..=255.
    #[must_use]
    pub const fn intensity(self) -> u8 {
        match self {
            Self::Lit => 255,
            Self::Shadowed => 210,
        }
    }
}

/// Draw descriptor for a single textured screen column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WallSlice {
    /// Screen column index.
    pub column: u32,
    /// Height of the column in pixels.
    pub height: u32,
    /// Y coordinate of the column's top edge; negative when taller than the screen.
    pub top: i32,
    /// Texture sampled for the column.
    pub texture: TextureId,
    /// Horizontal texel column sampled from the texture.
    pub texture_column: u32,
    /// Lighting cue applied when drawing.
    pub shade: Shade,
}
