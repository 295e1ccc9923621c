//! Built-in levels and TOML level packs.

use std::{fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use glam::Vec2;
use keymaze_core::{Pose, ReservedTiles, TileCode, TileMap};
use serde::Deserialize;

/// Playable level: its map plus where the player starts.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LevelDefinition {
    /// Name shown on the menu and when the level starts.
    pub(crate) name: String,
    /// Tile layout.
    pub(crate) map: TileMap,
    /// Starting position in cell units.
    pub(crate) spawn: Vec2,
    /// Starting facing direction.
    pub(crate) facing: Vec2,
}

impl LevelDefinition {
    /// Default spawn point used when a level does not declare one.
    pub(crate) const DEFAULT_SPAWN: Vec2 = Vec2::new(1.5, 1.5);

    /// Validates the spawn against the map and assembles the level.
    pub(crate) fn new(
        name: impl Into<String>,
        map: TileMap,
        spawn: Vec2,
        facing: Vec2,
    ) -> Result<Self> {
        let name = name.into();
        ensure!(
            spawn.x >= 0.0
                && spawn.y >= 0.0
                && spawn.x < map.width() as f32
                && spawn.y < map.height() as f32,
            "level `{name}` spawns outside its {}x{} map at ({}, {})",
            map.width(),
            map.height(),
            spawn.x,
            spawn.y
        );
        ensure!(
            !map.is_solid_at(spawn),
            "level `{name}` spawns inside a wall at ({}, {})",
            spawn.x,
            spawn.y
        );
        let facing = facing.try_normalize().with_context(|| {
            format!("level `{name}` has a zero-length facing direction")
        })?;

        Ok(Self {
            name,
            map,
            spawn,
            facing,
        })
    }

    /// Pose the player starts the level in.
    #[must_use]
    pub(crate) fn spawn_pose(&self, fov: f32) -> Pose {
        Pose::facing(self.spawn, self.facing, fov)
    }
}

#[rustfmt::skip]
const FIRST_LEVEL: [i32; 256] = [
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,0,0,0,0,0,0,0,0,2,0,0,0,0,0,1,
    1,0,1,1,0,1,1,1,0,2,0,1,1,1,0,1,
    1,0,1,0,0,0,0,1,0,2,0,1,0,0,0,1,
    1,0,1,0,1,1,0,1,0,2,0,1,0,1,0,1,
    1,0,0,0,0,0,0,0,0,2,0,0,0,1,0,1,
    1,0,1,1,1,1,1,1,0,2,1,1,0,1,0,1,
    1,0,1,0,0,0,0,1,0,2,0,1,0,1,0,1,
    1,0,1,0,1,1,0,1,0,2,0,1,0,1,0,1,
    1,0,0,0,0,0,0,0,0,2,0,0,0,0,0,1,
    1,0,1,1,1,1,1,1,1,2,1,1,1,1,0,1,
    1,0,0,0,0,0,0,0,0,2,0,0,0,1,0,1,
    1,0,1,1,1,1,1,1,0,2,1,1,0,1,0,1,
    1,0,0,0,0,0,0,0,0,2,0,0,0,0,0,1,
    1,0,0,0,0,0,0,0,0,0,8,0,0,0,9,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
];

#[rustfmt::skip]
const SECOND_LEVEL: [i32; 256] = [
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
    1,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,
    1,0,1,1,0,1,0,1,0,1,0,1,0,1,0,1,
    1,0,1,0,0,1,0,0,0,1,0,0,0,1,0,1,
    1,0,1,0,1,1,1,1,0,1,1,1,0,1,0,1,
    1,0,0,0,0,0,0,1,0,0,0,1,0,0,0,1,
    1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,
    1,0,0,0,0,1,0,0,0,1,0,0,0,1,0,1,
    1,0,1,1,0,1,1,1,0,1,1,1,0,1,0,1,
    1,0,1,0,0,0,0,1,0,0,0,1,0,1,0,1,
    1,0,1,0,1,1,0,1,0,1,0,1,0,1,0,1,
    1,0,0,0,0,0,0,1,0,0,0,1,0,0,0,1,
    1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,
    1,0,0,0,0,0,0,1,0,0,0,1,0,0,0,1,
    1,0,0,0,0,0,8,0,0,0,0,0,0,0,9,1,
    1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,
];

/// The two mazes shipped with the game.
pub(crate) fn builtin_levels() -> Result<Vec<LevelDefinition>> {
    [("Level 1", &FIRST_LEVEL), ("Level 2", &SECOND_LEVEL)]
        .into_iter()
        .map(|(name, codes)| {
            let map = TileMap::from_codes(16, 16, codes, ReservedTiles::default())
                .with_context(|| format!("built-in level `{name}` is malformed"))?;
            LevelDefinition::new(name, map, LevelDefinition::DEFAULT_SPAWN, Vec2::X)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelPack {
    #[serde(default)]
    levels: Vec<PackLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackLevel {
    name: String,
    rows: Vec<Vec<i32>>,
    #[serde(default)]
    spawn: Option<[f32; 2]>,
    #[serde(default)]
    facing: Option<[f32; 2]>,
    #[serde(default)]
    key: Option<i32>,
    #[serde(default)]
    exit: Option<i32>,
}

/// Reads a level pack from disk.
pub(crate) fn load_level_pack(path: impl AsRef<Path>) -> Result<Vec<LevelDefinition>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack at {}", path.display()))?;
    parse_level_pack(&contents)
        .with_context(|| format!("failed to load level pack at {}", path.display()))
}

fn parse_level_pack(contents: &str) -> Result<Vec<LevelDefinition>> {
    let pack: LevelPack = toml::from_str(contents).context("failed to parse level pack toml")?;
    if pack.levels.is_empty() {
        bail!("level pack contains no levels");
    }

    pack.levels.into_iter().map(build_pack_level).collect()
}

fn build_pack_level(level: PackLevel) -> Result<LevelDefinition> {
    let PackLevel {
        name,
        rows,
        spawn,
        facing,
        key,
        exit,
    } = level;

    let height = u32::try_from(rows.len()).context("level has too many rows")?;
    let width = rows.first().map_or(0, Vec::len);
    let width = u32::try_from(width).context("level has too many columns")?;
    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != width as usize)
    {
        bail!(
            "level `{name}` row {index} has {} columns but the first row has {width}",
            row.len()
        );
    }

    let reserved = ReservedTiles::new(
        key.map_or(ReservedTiles::DEFAULT_KEY, TileCode::new),
        exit.map_or(ReservedTiles::DEFAULT_EXIT, TileCode::new),
    );
    let codes: Vec<i32> = rows.into_iter().flatten().collect();
    let map = TileMap::from_codes(width, height, &codes, reserved)
        .with_context(|| format!("level `{name}` has an invalid layout"))?;

    let spawn = spawn.map_or(LevelDefinition::DEFAULT_SPAWN, Vec2::from_array);
    let facing = facing.map_or(Vec2::X, Vec2::from_array);
    LevelDefinition::new(name, map, spawn, facing)
}
