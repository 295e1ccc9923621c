#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Key Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems read the [`TileMap`] and [`Pose`]
//! through world queries and respond exclusively with new command batches.

mod pose;
mod ray;
mod tiles;

use std::time::Duration;

pub use pose::Pose;
pub use ray::{HitMaterial, RayHit, Shade, Side, TextureId, WallSlice};
pub use tiles::{cell_of, GridError, ReservedTiles, TileCode, TileKind, TileMap};

/// Title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Key Maze";

/// Describes which screen of the experience is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayState {
    /// Level selection screen; the simulation is idle.
    Menu,
    /// A level is loaded and the player moves through it.
    Playing,
    /// The exit was reached while holding the key.
    Won,
}

/// Identifier of a level within the loaded level pack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier from a zero-based index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// One-based number shown to players.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.0 + 1
    }
}

/// Per-frame movement intent sampled by the platform layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Seconds elapsed since the previous frame.
    pub elapsed: f32,
    /// Move along the facing direction.
    pub forward: bool,
    /// Move against the facing direction.
    pub backward: bool,
    /// Move perpendicular to the facing direction, to the left.
    pub strafe_left: bool,
    /// Move perpendicular to the facing direction, to the right.
    pub strafe_right: bool,
    /// Rotate counter-clockwise at the configured turn rate.
    pub turn_left: bool,
    /// Rotate clockwise at the configured turn rate.
    pub turn_right: bool,
    /// Horizontal pointer movement since the previous frame, in pixels.
    pub look_delta: f32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level and places the player at its spawn pose.
    LoadLevel {
        /// Identifier of the level being loaded.
        level: LevelId,
        /// Validated tile map for the level.
        map: TileMap,
        /// Pose the player starts from.
        spawn: Pose,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Commits a pose already resolved against the tile map.
    CommitPose {
        /// Pose the player occupies after movement.
        pose: Pose,
    },
    /// Leaves the current level and returns to the menu.
    ReturnToMenu,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level was loaded.
    LevelLoaded {
        /// Identifier of the loaded level.
        level: LevelId,
    },
    /// Announces that the world entered a new play state.
    PlayStateChanged {
        /// State that became active after processing commands.
        state: PlayState,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The player stepped onto the key tile and collected it.
    KeyCollected {
        /// Cell that held the key.
        cell: (i32, i32),
    },
    /// The player stands on the exit without holding the key.
    ExitLocked {
        /// Cell holding the exit.
        cell: (i32, i32),
    },
    /// The player reached the exit while holding the key.
    LevelCompleted {
        /// Identifier of the completed level.
        level: LevelId,
    },
}

/// Kind of transient message shown over the first-person view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Announces the level that just started.
    LevelStarted(LevelId),
    /// Confirms the key pickup.
    KeyCollected,
    /// Reminds the player that the exit needs the key.
    KeyRequired,
}

impl NoticeKind {
    /// How long the notice remains visible.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::LevelStarted(_) => Duration::from_millis(1_000),
            Self::KeyCollected => Duration::from_millis(1_200),
            Self::KeyRequired => Duration::from_millis(1_000),
        }
    }
}

/// Transient message with its remaining display time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Notice {
    /// Message being shown.
    pub kind: NoticeKind,
    /// Display time left before the notice disappears.
    pub remaining: Duration,
}

impl Notice {
    /// Creates a notice with its full display duration.
    #[must_use]
    pub const fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            remaining: kind.duration(),
        }
    }
}

/// HUD-relevant flags produced for the presentation layer each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HudState {
    /// Whether the key has been collected in the current level.
    pub key_held: bool,
    /// Whether the level was completed.
    pub won: bool,
    /// Whether the player stood on a locked exit during the last pose commit.
    pub exit_locked: bool,
}
