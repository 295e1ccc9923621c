use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use keymaze_core::WallSlice;
use keymaze_rendering::{Color, TextureSource, WallTexture};
use macroquad::{
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Loads the wall texture list described by the manifest at `path`.
///
/// Texture paths are resolved relative to the manifest's directory. Files are
/// not opened until the backend uploads them.
pub fn load_wall_manifest(path: impl AsRef<Path>) -> Result<Vec<WallTexture>> {
    let manifest_path = path.as_ref();
    let contents = fs::read_to_string(manifest_path).with_context(|| {
        format!(
            "failed to read wall texture manifest at {}",
            manifest_path.display()
        )
    })?;
    let base = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    parse_manifest(&contents, &base)
}

/// Manifest path probed when none is configured.
#[must_use]
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("assets/walls.toml")
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    textures: Vec<ManifestEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct ManifestEntry {
    path: String,
    width: u32,
    height: u32,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<WallTexture>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse wall texture manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported wall texture manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.textures.is_empty() {
        bail!("wall texture manifest lists no textures");
    }

    let mut textures = Vec::with_capacity(manifest.textures.len());
    for (index, entry) in manifest.textures.into_iter().enumerate() {
        if entry.width == 0 || entry.height == 0 {
            bail!(
                "wall texture {index} (`{}`) declares empty dimensions {}x{}",
                entry.path,
                entry.width,
                entry.height
            );
        }
        textures.push(WallTexture::from_file(
            base_path.join(&entry.path),
            entry.width,
            entry.height,
        ));
    }
    Ok(textures)
}

/// GPU textures for every wall, indexed by texture id.
#[derive(Debug)]
pub(crate) struct WallAtlas {
    textures: Vec<Texture2D>,
}

impl WallAtlas {
    pub(crate) fn upload(walls: &[WallTexture]) -> Result<Self> {
        Self::from_walls(walls, &mut default_loader)
    }

    fn from_walls(
        walls: &[WallTexture],
        loader: &mut impl FnMut(&WallTexture) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = Vec::with_capacity(walls.len());
        for (index, wall) in walls.iter().enumerate() {
            let texture =
                loader(wall).with_context(|| format!("failed to upload wall texture {index}"))?;
            textures.push(texture);
        }
        tracing::info!(count = textures.len(), "wall textures uploaded");
        Ok(Self { textures })
    }

    /// Draws a one-pixel-wide textured column.
    pub(crate) fn draw_column(&self, slice: &WallSlice, tint: Color) {
        let Some(texture) = self.textures.get(slice.texture.index()).copied() else {
            return;
        };

        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(1.0, slice.height as f32)),
            source: Some(Rect::new(
                slice.texture_column as f32,
                0.0,
                1.0,
                texture.height(),
            )),
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(
            texture,
            slice.column as f32,
            slice.top as f32,
            to_macroquad_color(tint),
            params,
        );
    }
}

fn default_loader(wall: &WallTexture) -> Result<Texture2D> {
    match &wall.source {
        TextureSource::Pixels(image) => {
            let width = u16::try_from(image.width()).context("texture too wide to upload")?;
            let height = u16::try_from(image.height()).context("texture too tall to upload")?;
            let texture = Texture2D::from_rgba8(width, height, image.pixels());
            texture.set_filter(FilterMode::Nearest);
            Ok(texture)
        }
        TextureSource::File(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read wall texture at {}", path.display()))?;
            let texture = Texture2D::from_file_with_format(&bytes, None);
            let (width, height) = (texture.width() as u32, texture.height() as u32);
            if (width, height) != (wall.width, wall.height) {
                bail!(
                    "wall texture {} is {width}x{height} but the manifest declares {}x{}",
                    path.display(),
                    wall.width,
                    wall.height
                );
            }
            texture.set_filter(FilterMode::Nearest);
            Ok(texture)
        }
    }
}
