#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Key Maze.

use std::time::Duration;

use keymaze_core::{
    cell_of, Command, Event, LevelId, Notice, NoticeKind, PlayState, Pose, TileCode, TileKind,
    TileMap, GAME_TITLE,
};

/// Level currently loaded into the world.
#[derive(Debug)]
struct ActiveLevel {
    id: LevelId,
    map: TileMap,
}

/// Represents the authoritative Key Maze world state.
#[derive(Debug)]
pub struct World {
    title: &'static str,
    play_state: PlayState,
    level: Option<ActiveLevel>,
    pose: Pose,
    key_held: bool,
    exit_locked: bool,
    notice: Option<Notice>,
    tick_index: u64,
}

impl World {
    /// Creates a new world idling on the menu with no level loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: GAME_TITLE,
            play_state: PlayState::Menu,
            level: None,
            pose: Pose::default(),
            key_held: false,
            exit_locked: false,
            notice: None,
            tick_index: 0,
        }
    }

    fn set_play_state(&mut self, state: PlayState, out_events: &mut Vec<Event>) {
        if self.play_state != state {
            self.play_state = state;
            out_events.push(Event::PlayStateChanged { state });
        }
    }

    fn show_notice(&mut self, kind: NoticeKind) {
        self.notice = Some(Notice::new(kind));
    }

    fn resolve_occupied_cell(&mut self, out_events: &mut Vec<Event>) {
        let Some(level) = self.level.as_mut() else {
            return;
        };

        let (column, row) = cell_of(self.pose.position);
        match level.map.classify(column, row) {
            TileKind::Key => {
                let _ = level.map.set_tile(column, row, TileCode::EMPTY);
                self.key_held = true;
                tracing::info!(column, row, "key collected");
                out_events.push(Event::KeyCollected { cell: (column, row) });
                self.show_notice(NoticeKind::KeyCollected);
            }
            TileKind::Exit if self.key_held => {
                let id = level.id;
                tracing::info!(level = id.number(), "level completed");
                out_events.push(Event::LevelCompleted { level: id });
                self.set_play_state(PlayState::Won, out_events);
            }
            TileKind::Exit => {
                self.exit_locked = true;
                tracing::debug!(column, row, "exit locked");
                out_events.push(Event::ExitLocked { cell: (column, row) });
                self.show_notice(NoticeKind::KeyRequired);
            }
            TileKind::Empty | TileKind::Wall(_) | TileKind::Boundary => {}
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level, map, spawn } => {
            tracing::info!(
                level = level.number(),
                width = map.width(),
                height = map.height(),
                "level loaded"
            );
            world.level = Some(ActiveLevel { id: level, map });
            world.pose = spawn;
            world.key_held = false;
            world.exit_locked = false;
            world.show_notice(NoticeKind::LevelStarted(level));
            out_events.push(Event::LevelLoaded { level });
            world.set_play_state(PlayState::Playing, out_events);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            if let Some(notice) = world.notice.as_mut() {
                notice.remaining = notice.remaining.saturating_sub(dt);
                if notice.remaining == Duration::ZERO {
                    world.notice = None;
                }
            }
        }
        Command::CommitPose { pose } => {
            if world.play_state != PlayState::Playing || world.level.is_none() {
                return;
            }

            world.pose = pose;
            world.exit_locked = false;
            world.resolve_occupied_cell(out_events);
        }
        Command::ReturnToMenu => {
            world.level = None;
            world.key_held = false;
            world.exit_locked = false;
            world.notice = None;
            world.set_play_state(PlayState::Menu, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use keymaze_core::{HudState, LevelId, Notice, PlayState, Pose, TileMap};

    /// Retrieves the title that adapters may display to players.
    #[must_use]
    pub fn title(world: &World) -> &'static str {
        world.title
    }

    /// Reports the active play state.
    #[must_use]
    pub fn play_state(world: &World) -> PlayState {
        world.play_state
    }

    /// Identifier of the loaded level, if any.
    #[must_use]
    pub fn level(world: &World) -> Option<LevelId> {
        world.level.as_ref().map(|level| level.id)
    }

    /// Provides read-only access to the loaded tile map.
    #[must_use]
    pub fn tile_map(world: &World) -> Option<&TileMap> {
        world.level.as_ref().map(|level| &level.map)
    }

    /// Pose the player currently occupies.
    #[must_use]
    pub fn pose(world: &World) -> Pose {
        world.pose
    }

    /// Whether the key was collected in the current level.
    #[must_use]
    pub fn key_held(world: &World) -> bool {
        world.key_held
    }

    /// Transient message currently on screen, if any.
    #[must_use]
    pub fn notice(world: &World) -> Option<Notice> {
        world.notice
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the HUD flags for the presentation layer.
    #[must_use]
    pub fn hud_state(world: &World) -> HudState {
        HudState {
            key_held: world.key_held,
            won: world.play_state == PlayState::Won,
            exit_locked: world.exit_locked,
        }
    }
}
