#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Key Maze adapters.

mod textures;

use std::{path::PathBuf, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use keymaze_core::{HudState, PlayState, PlayerInput, Pose, Shade, TileKind, TileMap, WallSlice};
use thiserror::Error;

pub use textures::{
    brick, metal, procedural_set, stone, TextureImage, PROCEDURAL_TEXTURE_SIZE, STONE_SEED,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Tint multiplied into a wall texture for the provided shade.
    #[must_use]
    pub fn for_shade(shade: Shade) -> Self {
        let intensity = shade.intensity();
        Self::from_rgb_u8(intensity, intensity, intensity)
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Size of the drawable area in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Width in pixels; one ray is cast per column.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a new viewport descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement and look input for the frame.
    pub player: PlayerInput,
    /// Drawable area the scene should be produced for.
    pub viewport: Viewport,
    /// Zero-based level picked on the menu this frame, if any.
    pub select_level: Option<usize>,
    /// Whether the adapter detected a confirmation press on this frame.
    pub confirm: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 640)
    }
}

/// Contents of a single minimap cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinimapCell {
    /// Walkable floor.
    Empty,
    /// Any solid wall.
    Wall,
    /// Key pickup.
    Key,
    /// Level exit.
    Exit,
}

impl MinimapCell {
    /// Fill color used when drawing the cell.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Empty => Color::from_rgb_u8(25, 25, 30),
            Self::Wall => Color::from_rgb_u8(120, 120, 120),
            Self::Key => Color::from_rgb_u8(80, 220, 220),
            Self::Exit => Color::from_rgb_u8(240, 240, 120),
        }
    }
}

/// Top-down overview of the loaded tile map and the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Minimap {
    /// Number of columns in the map.
    pub columns: u32,
    /// Number of rows in the map.
    pub rows: u32,
    /// Row-major cell contents.
    pub cells: Vec<MinimapCell>,
    /// Player position in cell units.
    pub player: Vec2,
    /// Unit facing direction of the player.
    pub heading: Vec2,
}

impl Minimap {
    /// Side length in pixels of one minimap cell.
    pub const CELL_PIXELS: f32 = 10.0;
    /// Offset in pixels of the minimap from the top-left corner.
    pub const MARGIN: f32 = 10.0;
    /// Length of the heading line in cells.
    pub const HEADING_LENGTH: f32 = 0.8;

    /// Captures the map and pose for drawing.
    #[must_use]
    pub fn capture(map: &TileMap, pose: &Pose) -> Self {
        let mut cells = Vec::with_capacity(map.tiles().len());
        for row in 0..map.height() {
            for column in 0..map.width() {
                let cell = match map.classify(column as i32, row as i32) {
                    TileKind::Empty => MinimapCell::Empty,
                    TileKind::Key => MinimapCell::Key,
                    TileKind::Exit => MinimapCell::Exit,
                    TileKind::Wall(_) | TileKind::Boundary => MinimapCell::Wall,
                };
                cells.push(cell);
            }
        }

        Self {
            columns: map.width(),
            rows: map.height(),
            cells,
            player: pose.position,
            heading: pose.direction,
        }
    }

    /// Cell at the provided coordinate, if inside the map.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> Option<MinimapCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
    }
}

/// Level list shown on the menu.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuPresentation {
    /// Display names of the selectable levels, in order.
    pub levels: Vec<String>,
    /// Zero-based index of the highlighted level.
    pub selected: usize,
}

/// Scene description for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Screen being shown.
    pub play_state: PlayState,
    /// Textured wall columns ordered left to right.
    pub slices: Vec<WallSlice>,
    /// Key and win indicators.
    pub hud: HudState,
    /// Transient message banner, if one is active.
    pub notice: Option<String>,
    /// Overview of the loaded level while playing.
    pub minimap: Option<Minimap>,
    /// Level selection state for the menu screen.
    pub menu: MenuPresentation,
}

impl Scene {
    /// Creates an empty scene showing the menu.
    #[must_use]
    pub fn menu(menu: MenuPresentation) -> Self {
        Self {
            play_state: PlayState::Menu,
            slices: Vec::new(),
            hud: HudState::default(),
            notice: None,
            minimap: None,
            menu,
        }
    }
}

/// Where the texels of a wall texture come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// Image file decoded by the backend.
    File(PathBuf),
    /// Pixels already resident in memory.
    Pixels(TextureImage),
}

/// Wall texture handed to the backend, with the size the projector samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallTexture {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel source.
    pub source: TextureSource,
}

impl WallTexture {
    /// Describes an image file expected to have the provided size.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            source: TextureSource::File(path.into()),
        }
    }

    /// Wraps an in-memory image.
    #[must_use]
    pub fn from_image(image: TextureImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            source: TextureSource::Pixels(image),
        }
    }

    /// Procedural brick, stone and metal textures.
    #[must_use]
    pub fn procedural() -> Vec<Self> {
        procedural_set().into_iter().map(Self::from_image).collect()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Fill for the upper half of the 3D view.
    pub ceiling_color: Color,
    /// Fill for the lower half of the 3D view.
    pub floor_color: Color,
    /// Wall textures indexed by [`keymaze_core::TextureId`].
    pub wall_textures: Vec<WallTexture>,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Default ceiling fill.
    pub const CEILING: Color = Color::from_rgb_u8(60, 90, 150);
    /// Default floor fill.
    pub const FLOOR: Color = Color::from_rgb_u8(50, 40, 30);

    /// Constructs a new presentation descriptor with the default fills.
    #[must_use]
    pub fn new<T>(window_title: T, wall_textures: Vec<WallTexture>, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color: Color::from_rgb_u8(0, 0, 0),
            ceiling_color: Self::CEILING,
            floor_color: Self::FLOOR,
            wall_textures,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Key Maze scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta,
    /// per-frame input captured by the adapter, and mutates the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// An image had a zero-sized edge.
    #[error("texture dimensions must be positive (received {width}x{height})")]
    EmptyTexture {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
    /// Pixel buffer length did not match the image size.
    #[error("expected {expected} bytes of RGBA pixels but received {actual}")]
    PixelBufferLength {
        /// Bytes implied by the image size.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymaze_core::ReservedTiles;

    #[test]
    fn shade_tints_match_intensity() {
        assert_eq!(Color::for_shade(Shade::Lit), Color::from_rgb_u8(255, 255, 255));
        assert_eq!(
            Color::for_shade(Shade::Shadowed),
            Color::from_rgb_u8(210, 210, 210)
        );
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);

        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn minimap_classifies_every_cell() {
        #[rustfmt::skip]
        let codes = [
            1, 1, 1, 1,
            1, 0, 8, 1,
            1, 9, 0, 1,
            1, 1, 1, 1,
        ];
        let map = TileMap::from_codes(4, 4, &codes, ReservedTiles::default()).expect("valid map");

        let minimap = Minimap::capture(&map, &Pose::default());

        assert_eq!(minimap.cells.len(), 16);
        assert_eq!(minimap.cell(0, 0), Some(MinimapCell::Wall));
        assert_eq!(minimap.cell(1, 1), Some(MinimapCell::Empty));
        assert_eq!(minimap.cell(2, 1), Some(MinimapCell::Key));
        assert_eq!(minimap.cell(1, 2), Some(MinimapCell::Exit));
        assert_eq!(minimap.cell(4, 0), None);
        assert_eq!(minimap.player, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn procedural_walls_report_their_size() {
        let textures = WallTexture::procedural();

        assert_eq!(textures.len(), 3);
        assert!(textures
            .iter()
            .all(|texture| texture.width == PROCEDURAL_TEXTURE_SIZE
                && matches!(texture.source, TextureSource::Pixels(_))));
    }

    #[test]
    fn presentation_uses_sky_and_earth_fills() {
        let presentation = Presentation::new(
            "Key Maze",
            Vec::new(),
            Scene::menu(MenuPresentation::default()),
        );

        assert_eq!(presentation.ceiling_color, Color::from_rgb_u8(60, 90, 150));
        assert_eq!(presentation.floor_color, Color::from_rgb_u8(50, 40, 30));
        assert_eq!(presentation.scene.play_state, PlayState::Menu);
    }
}
