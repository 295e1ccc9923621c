#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Key Maze experience.

mod level_code;
mod levels;
mod simulation;

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use keymaze_core::{Pose, GAME_TITLE};
use keymaze_rendering::{Presentation, RenderingBackend, Scene, WallTexture};
use keymaze_rendering_macroquad::{default_manifest_path, load_wall_manifest, MacroquadBackend};
use keymaze_system_movement::MovementTuning;
use keymaze_system_projection::{MaterialMapping, TextureDimensions};
use tracing_subscriber::EnvFilter;

use crate::{levels::LevelDefinition, simulation::Simulation};

const DEFAULT_LOG_FILTER: &str = "keymaze=info,keymaze_world=info,keymaze_rendering_macroquad=info";

/// Command-line arguments for launching the game.
#[derive(Debug, Parser)]
#[command(name = "keymaze", about = "Find the key and escape the maze")]
struct CliArgs {
    /// One-based level highlighted on the menu at startup.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    level: u32,
    /// TOML level pack replacing the built-in levels.
    #[arg(long, value_name = "PATH", conflicts_with = "level_code")]
    levels: Option<PathBuf>,
    /// Level code to play instead of the built-in levels.
    #[arg(long, value_name = "CODE")]
    level_code: Option<String>,
    /// Print the level code of the selected level and exit.
    #[arg(long)]
    print_level_code: bool,
    /// Wall texture manifest; the procedural set is used when absent.
    #[arg(long, value_name = "PATH")]
    textures: Option<PathBuf>,
    /// How wall codes select textures.
    #[arg(long, value_enum, default_value_t = MappingArg::Modulo)]
    material_mapping: MappingArg,
    /// Camera plane length; larger values widen the field of view.
    #[arg(long, default_value_t = Pose::DEFAULT_FOV, value_parser = parse_positive_f32)]
    fov: f32,
    /// Movement speed in cells per second.
    #[arg(long, default_value_t = MovementTuning::DEFAULT_MOVE_SPEED, value_parser = parse_positive_f32)]
    move_speed: f32,
    /// Keyboard turn speed in radians per second.
    #[arg(long, default_value_t = MovementTuning::DEFAULT_TURN_SPEED, value_parser = parse_positive_f32)]
    turn_speed: f32,
    /// Radians turned per pixel of mouse movement.
    #[arg(long, default_value_t = MovementTuning::DEFAULT_LOOK_SENSITIVITY, value_parser = parse_positive_f32)]
    look_sensitivity: f32,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Present frames as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Initial window width in pixels.
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(i32).range(1..))]
    width: i32,
    /// Initial window height in pixels.
    #[arg(long, default_value_t = 640, value_parser = clap::value_parser!(i32).range(1..))]
    height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MappingArg {
    /// Wrap wall codes around the available textures.
    Modulo,
    /// Require one texture per wall code.
    Direct,
}

impl From<MappingArg> for MaterialMapping {
    fn from(value: MappingArg) -> Self {
        match value {
            MappingArg::Modulo => Self::Modulo,
            MappingArg::Direct => Self::Direct,
        }
    }
}

impl CliArgs {
    fn vsync(&self) -> Option<bool> {
        if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        }
    }

    fn tuning(&self) -> MovementTuning {
        MovementTuning {
            move_speed: self.move_speed,
            turn_speed: self.turn_speed,
            look_sensitivity: self.look_sensitivity,
        }
    }
}

fn parse_positive_f32(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|error| format!("`{value}` is not a number: {error}"))?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(format!("`{value}` must be a positive number"))
    }
}

fn resolve_levels(args: &CliArgs) -> Result<Vec<LevelDefinition>> {
    if let Some(code) = &args.level_code {
        let level = level_code::decode(code).context("failed to decode --level-code")?;
        return Ok(vec![level]);
    }
    match &args.levels {
        Some(path) => levels::load_level_pack(path),
        None => levels::builtin_levels(),
    }
}

fn resolve_wall_textures(args: &CliArgs) -> Result<Vec<WallTexture>> {
    if let Some(path) = &args.textures {
        return load_wall_manifest(path);
    }

    let fallback = default_manifest_path();
    if fallback.exists() {
        tracing::info!(path = %fallback.display(), "loading wall texture manifest");
        load_wall_manifest(&fallback)
    } else {
        tracing::info!("no wall texture manifest found; using procedural textures");
        Ok(WallTexture::procedural())
    }
}

/// Entry point for the Key Maze command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = CliArgs::parse();
    let levels = resolve_levels(&args)?;
    let selected = usize::try_from(args.level - 1).context("level number is too large")?;
    ensure!(
        selected < levels.len(),
        "level {} does not exist; {} level(s) are available",
        args.level,
        levels.len()
    );

    if args.print_level_code {
        let code = level_code::encode(&levels[selected])
            .with_context(|| format!("failed to encode level `{}`", levels[selected].name))?;
        println!("{code}");
        return Ok(());
    }

    let wall_textures = resolve_wall_textures(&args)?;
    let dimensions: Vec<TextureDimensions> = wall_textures
        .iter()
        .map(|texture| TextureDimensions::new(texture.width, texture.height))
        .collect();
    let mut simulation = Simulation::new(
        levels,
        &dimensions,
        args.material_mapping.into(),
        args.tuning(),
        args.fov,
        selected,
    )?;

    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_window_size(args.width, args.height);
    if let Some(enabled) = args.vsync() {
        backend = backend.with_vsync(enabled);
    }

    let scene = Scene::menu(simulation.menu_presentation());
    let presentation = Presentation::new(GAME_TITLE, wall_textures, scene);
    tracing::info!(
        textures = dimensions.len(),
        mapping = ?args.material_mapping,
        "starting Key Maze"
    );

    backend.run(presentation, move |dt, input, scene| {
        simulation.advance(dt, input, scene);
    })
}
