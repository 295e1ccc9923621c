//! Frame loop glue that drives the world and systems from adapter input.

use std::time::Duration;

use anyhow::{Context, Result};
use keymaze_core::{Command, Event, LevelId, NoticeKind, PlayState};
use keymaze_rendering::{FrameInput, MenuPresentation, Minimap, Scene};
use keymaze_system_movement::{Movement, MovementTuning};
use keymaze_system_projection::{MaterialMapping, MaterialTable, Projector, TextureDimensions};
use keymaze_system_raycast::RayCaster;
use keymaze_world::{self as world, query, World};

use crate::levels::LevelDefinition;

/// Level paired with the material table validated for it.
#[derive(Debug)]
struct PreparedLevel {
    definition: LevelDefinition,
    materials: MaterialTable,
}

/// Owns the world and every system, advancing them once per rendered frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    caster: RayCaster,
    projector: Option<Projector>,
    levels: Vec<PreparedLevel>,
    fov: f32,
    selected: usize,
    carried_events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Validates every level against the wall textures and prepares the systems.
    pub(crate) fn new(
        levels: Vec<LevelDefinition>,
        textures: &[TextureDimensions],
        mapping: MaterialMapping,
        tuning: MovementTuning,
        fov: f32,
        selected: usize,
    ) -> Result<Self> {
        let levels = levels
            .into_iter()
            .map(|definition| {
                let materials = MaterialTable::build(&definition.map, textures, mapping)
                    .with_context(|| {
                        format!("level `{}` cannot be textured", definition.name)
                    })?;
                Ok(PreparedLevel {
                    definition,
                    materials,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        anyhow::ensure!(!levels.is_empty(), "no levels to play");

        Ok(Self {
            world: World::new(),
            movement: Movement::new(tuning),
            caster: RayCaster::default(),
            projector: None,
            selected: selected.min(levels.len() - 1),
            levels,
            fov,
            carried_events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Level list and highlight for the menu screen.
    pub(crate) fn menu_presentation(&self) -> MenuPresentation {
        MenuPresentation {
            levels: self
                .levels
                .iter()
                .map(|level| level.definition.name.clone())
                .collect(),
            selected: self.selected,
        }
    }

    /// Advances one frame and refreshes the scene.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let mut events = std::mem::take(&mut self.carried_events);

        match query::play_state(&self.world) {
            PlayState::Menu => {
                if let Some(index) = input.select_level {
                    if index < self.levels.len() {
                        self.selected = index;
                    }
                }
                if input.confirm {
                    self.start_level(&mut events);
                }
            }
            PlayState::Won => {
                if input.confirm {
                    self.projector = None;
                    world::apply(&mut self.world, Command::ReturnToMenu, &mut events);
                }
            }
            PlayState::Playing => {}
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        if let Some(map) = query::tile_map(&self.world) {
            self.movement.handle(
                &events,
                &input.player,
                query::pose(&self.world),
                map,
                &mut self.commands,
            );
        }

        let mut follow_up = Vec::new();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut follow_up);
        }
        self.carried_events = follow_up;

        self.populate_scene(input, scene);
    }

    fn start_level(&mut self, events: &mut Vec<Event>) {
        let Some(level) = self.levels.get(self.selected) else {
            return;
        };

        self.projector = Some(Projector::new(level.materials.clone()));
        let id = LevelId::new(u32::try_from(self.selected).unwrap_or(u32::MAX));
        world::apply(
            &mut self.world,
            Command::LoadLevel {
                level: id,
                map: level.definition.map.clone(),
                spawn: level.definition.spawn_pose(self.fov),
            },
            events,
        );
    }

    fn notice_text(&self, kind: NoticeKind) -> String {
        match kind {
            NoticeKind::LevelStarted(level) => self
                .levels
                .get(level.get() as usize)
                .map_or_else(
                    || format!("Level {}", level.number()),
                    |prepared| prepared.definition.name.clone(),
                ),
            NoticeKind::KeyCollected => "Key collected".to_owned(),
            NoticeKind::KeyRequired => "You need the key".to_owned(),
        }
    }

    fn populate_scene(&mut self, input: FrameInput, scene: &mut Scene) {
        let play_state = query::play_state(&self.world);
        scene.play_state = play_state;
        scene.menu = self.menu_presentation();
        scene.hud = query::hud_state(&self.world);
        scene.notice = query::notice(&self.world).map(|notice| self.notice_text(notice.kind));
        scene.slices.clear();
        scene.minimap = None;

        if play_state != PlayState::Playing {
            return;
        }
        let (Some(map), Some(projector)) = (query::tile_map(&self.world), self.projector.as_mut())
        else {
            return;
        };

        let pose = query::pose(&self.world);
        let viewport = input.viewport;
        let hits = self.caster.cast_frame(map, &pose, viewport.width);
        let slices = projector.project_frame(&pose, hits, viewport.height);
        scene.slices.extend_from_slice(slices);
        scene.minimap = Some(Minimap::capture(map, &pose));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::builtin_levels;
    use glam::Vec2;
    use keymaze_core::{PlayerInput, ReservedTiles, TileMap, WallSlice};
    use keymaze_rendering::Viewport;

    const FRAME: Duration = Duration::from_millis(16);

    fn corridor_level() -> LevelDefinition {
        #[rustfmt::skip]
        let codes = [
            1, 1, 1, 1, 1, 1, 1,
            1, 0, 8, 0, 9, 0, 1,
            1, 1, 1, 1, 1, 1, 1,
        ];
        let map = TileMap::from_codes(7, 3, &codes, ReservedTiles::default()).expect("valid map");
        LevelDefinition::new("Corridor", map, Vec2::new(1.5, 1.5), Vec2::X).expect("valid level")
    }

    fn simulation(levels: Vec<LevelDefinition>) -> Simulation {
        Simulation::new(
            levels,
            &[TextureDimensions::new(64, 64)],
            MaterialMapping::Modulo,
            MovementTuning::default(),
            0.66,
            0,
        )
        .expect("levels are texturable")
    }

    fn frame(player: PlayerInput, confirm: bool) -> FrameInput {
        FrameInput {
            player: PlayerInput {
                elapsed: FRAME.as_secs_f32(),
                ..player
            },
            viewport: Viewport::new(160, 100),
            select_level: None,
            confirm,
        }
    }

    fn forward() -> PlayerInput {
        PlayerInput {
            forward: true,
            ..PlayerInput::default()
        }
    }

    #[test]
    fn menu_selection_and_confirm_start_the_level() {
        let mut simulation =
            simulation(builtin_levels().expect("built-in levels are valid"));
        let mut scene = Scene::menu(simulation.menu_presentation());

        let mut pick = frame(PlayerInput::default(), false);
        pick.select_level = Some(1);
        simulation.advance(FRAME, pick, &mut scene);
        assert_eq!(scene.play_state, PlayState::Menu);
        assert_eq!(scene.menu.selected, 1);
        assert!(scene.slices.is_empty());

        simulation.advance(FRAME, frame(PlayerInput::default(), true), &mut scene);
        assert_eq!(scene.play_state, PlayState::Playing);
        assert_eq!(scene.slices.len(), 160);
        assert_eq!(scene.notice.as_deref(), Some("Level 2"));
        assert!(scene.minimap.is_some());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut simulation = simulation(vec![corridor_level()]);
        let mut scene = Scene::menu(simulation.menu_presentation());
        let mut pick = frame(PlayerInput::default(), false);
        pick.select_level = Some(5);

        simulation.advance(FRAME, pick, &mut scene);

        assert_eq!(scene.menu.selected, 0);
    }

    #[test]
    fn walking_the_corridor_wins_and_enter_returns_to_menu() {
        let mut simulation = simulation(vec![corridor_level()]);
        let mut scene = Scene::menu(simulation.menu_presentation());
        simulation.advance(FRAME, frame(PlayerInput::default(), true), &mut scene);

        let mut collected_at = None;
        for step in 0..400 {
            simulation.advance(FRAME, frame(forward(), false), &mut scene);
            if collected_at.is_none() && scene.hud.key_held {
                collected_at = Some(step);
                assert_eq!(scene.notice.as_deref(), Some("Key collected"));
            }
            if scene.play_state == PlayState::Won {
                break;
            }
        }

        assert!(collected_at.is_some());
        assert_eq!(scene.play_state, PlayState::Won);
        assert!(scene.slices.is_empty());

        simulation.advance(FRAME, frame(PlayerInput::default(), true), &mut scene);
        assert_eq!(scene.play_state, PlayState::Menu);
        assert!(!scene.hud.key_held);
    }

    fn replay_slices() -> Vec<WallSlice> {
        let mut simulation =
            simulation(builtin_levels().expect("built-in levels are valid"));
        let mut scene = Scene::menu(simulation.menu_presentation());
        simulation.advance(FRAME, frame(PlayerInput::default(), true), &mut scene);

        let turning = PlayerInput {
            forward: true,
            turn_right: true,
            look_delta: 3.0,
            ..PlayerInput::default()
        };
        for step in 0..90 {
            let player = if step % 3 == 0 { turning } else { forward() };
            simulation.advance(FRAME, frame(player, false), &mut scene);
        }
        scene.slices
    }

    #[test]
    fn identical_scripts_project_identical_slices() {
        let first = replay_slices();
        let second = replay_slices();

        assert_eq!(first.len(), 160);
        assert_eq!(first, second);
    }

    #[test]
    fn direct_mapping_rejects_untextured_levels_up_front() {
        let result = Simulation::new(
            builtin_levels().expect("built-in levels are valid"),
            &[TextureDimensions::new(64, 64)],
            MaterialMapping::Direct,
            MovementTuning::default(),
            0.66,
            0,
        );

        let error = result.expect_err("level 1 uses wall code 2");
        assert!(format!("{error:#}").contains("Level 1"));
    }
}
