#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Key Maze.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Wall columns are drawn as one-pixel-wide slices of the uploaded wall
//! textures, sampled with nearest filtering so texels stay crisp up close.

mod walls;

pub use self::walls::{default_manifest_path, load_wall_manifest};

use anyhow::Result;
use glam::Vec2;
use keymaze_core::{HudState, PlayState, PlayerInput};
use keymaze_rendering::{
    Color, FrameInput, MenuPresentation, Minimap, Presentation, RenderingBackend, Scene, Viewport,
};
use macroquad::input::{
    is_key_down, is_key_pressed, mouse_position, set_cursor_grab, show_mouse, KeyCode,
};
use std::{sync::mpsc, time::Duration};

use self::walls::WallAtlas;

const LEVEL_KEYS: [KeyCode; 9] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
];

const NOTICE_FONT_SIZE: u16 = 40;
const HUD_FONT_SIZE: f32 = 24.0;

/// Converts absolute pointer positions into per-frame horizontal deltas.
///
/// The first observation after a reset reports no motion, so grabbing the
/// cursor never produces a sudden turn.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    last: Option<Vec2>,
}

impl PointerTracker {
    /// Records the pointer position and returns the horizontal motion since the last frame.
    pub fn observe(&mut self, position: Vec2) -> f32 {
        let delta = self.last.map_or(0.0, |last| position.x - last.x);
        self.last = Some(position);
        delta
    }

    /// Forgets the previous position.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Snapshot of the keys observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardState {
    /// `W` or `Up`.
    forward: bool,
    /// `S` or `Down`.
    backward: bool,
    /// `A`.
    strafe_left: bool,
    /// `D`.
    strafe_right: bool,
    /// `Left`.
    turn_left: bool,
    /// `Right`.
    turn_right: bool,
    /// `Enter` pressed this frame.
    confirm: bool,
    /// `Escape` pressed this frame.
    quit_requested: bool,
    /// Digit `1`..`9` pressed this frame, as a zero-based level index.
    level_digit: Option<usize>,
}

impl KeyboardState {
    fn poll() -> Self {
        Self {
            forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            backward: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            strafe_left: is_key_down(KeyCode::A),
            strafe_right: is_key_down(KeyCode::D),
            turn_left: is_key_down(KeyCode::Left),
            turn_right: is_key_down(KeyCode::Right),
            confirm: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            quit_requested: is_key_pressed(KeyCode::Escape),
            level_digit: LEVEL_KEYS.iter().position(|key| is_key_pressed(*key)),
        }
    }
}

fn frame_input_from_observations(
    keyboard: KeyboardState,
    elapsed: f32,
    look_delta: f32,
    viewport: Viewport,
) -> FrameInput {
    FrameInput {
        player: PlayerInput {
            elapsed: elapsed.max(0.0),
            forward: keyboard.forward,
            backward: keyboard.backward,
            strafe_left: keyboard.strafe_left,
            strafe_right: keyboard.strafe_right,
            turn_left: keyboard.turn_left,
            turn_right: keyboard.turn_right,
            look_delta,
        },
        viewport,
        select_level: keyboard.level_digit,
        confirm: keyboard.confirm,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_size: (i32, i32),
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_size: (1024, 640),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width, height);
        self
    }
}

/// Counts rendered frames and reports the rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a frame and returns the frames per second once a full second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_size: (window_width, window_height),
        } = self;

        let Presentation {
            window_title,
            clear_color,
            ceiling_color,
            floor_color,
            wall_textures,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let atlas = match WallAtlas::upload(&wall_textures) {
                Ok(atlas) => {
                    let _ = init_sender.send(Ok(()));
                    atlas
                }
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut pointer = PointerTracker::default();
            let mut cursor_grabbed = false;

            loop {
                let keyboard = KeyboardState::poll();
                if keyboard.quit_requested {
                    tracing::info!("quit requested");
                    break;
                }

                let playing = scene.play_state == PlayState::Playing;
                if playing != cursor_grabbed {
                    set_cursor_grab(playing);
                    show_mouse(!playing);
                    pointer.reset();
                    cursor_grabbed = playing;
                }
                let (cursor_x, cursor_y) = mouse_position();
                let look_delta = if playing {
                    pointer.observe(Vec2::new(cursor_x, cursor_y))
                } else {
                    0.0
                };

                macroquad::window::clear_background(background);

                let viewport = Viewport::new(
                    macroquad::window::screen_width().max(1.0) as u32,
                    macroquad::window::screen_height().max(1.0) as u32,
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input =
                    frame_input_from_observations(keyboard, dt_seconds, look_delta, viewport);

                update_scene(frame_dt, frame_input, &mut scene);

                match scene.play_state {
                    PlayState::Menu => draw_menu(&scene.menu),
                    PlayState::Playing => {
                        draw_view(&scene, &atlas, ceiling_color, floor_color, viewport);
                        if let Some(minimap) = &scene.minimap {
                            draw_minimap(minimap);
                        }
                        draw_hud(scene.hud, viewport);
                        if let Some(notice) = &scene.notice {
                            draw_notice(notice, viewport);
                        }
                    }
                    PlayState::Won => draw_victory(),
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        tracing::info!(fps = f64::from(per_second), "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_view(
    scene: &Scene,
    atlas: &WallAtlas,
    ceiling: Color,
    floor: Color,
    viewport: Viewport,
) {
    let width = viewport.width as f32;
    let horizon = (viewport.height / 2) as f32;
    macroquad::shapes::draw_rectangle(0.0, 0.0, width, horizon, to_macroquad_color(ceiling));
    macroquad::shapes::draw_rectangle(
        0.0,
        horizon,
        width,
        viewport.height as f32 - horizon,
        to_macroquad_color(floor),
    );

    for slice in &scene.slices {
        atlas.draw_column(slice, Color::for_shade(slice.shade));
    }
}

fn draw_minimap(minimap: &Minimap) {
    let cell = Minimap::CELL_PIXELS;
    let origin = Vec2::splat(Minimap::MARGIN);

    for row in 0..minimap.rows {
        for column in 0..minimap.columns {
            let Some(kind) = minimap.cell(column, row) else {
                continue;
            };
            macroquad::shapes::draw_rectangle(
                origin.x + column as f32 * cell,
                origin.y + row as f32 * cell,
                cell,
                cell,
                to_macroquad_color(kind.color()),
            );
        }
    }

    let marker = to_macroquad_color(Color::from_rgb_u8(230, 41, 55));
    let player = origin + minimap.player * cell;
    let tip = origin + (minimap.player + minimap.heading * Minimap::HEADING_LENGTH) * cell;
    macroquad::shapes::draw_circle(player.x, player.y, 3.0, marker);
    macroquad::shapes::draw_line(player.x, player.y, tip.x, tip.y, 1.0, marker);
}

fn draw_hud(hud: HudState, viewport: Viewport) {
    let (text, color) = if hud.key_held {
        ("Key: YES", Color::from_rgb_u8(0, 228, 48))
    } else {
        ("Key: NO", Color::from_rgb_u8(130, 130, 130))
    };
    draw_label(text, 20.0, viewport.height as f32 - 20.0, HUD_FONT_SIZE, color);
}

fn draw_notice(text: &str, viewport: Viewport) {
    let text_width = macroquad::text::measure_text(text, None, NOTICE_FONT_SIZE, 1.0).width;
    let left = viewport.width as f32 / 2.0 - text_width / 2.0;
    macroquad::shapes::draw_rectangle(
        left - 12.0,
        18.0,
        text_width + 24.0,
        52.0,
        to_macroquad_color(Color::from_rgb_u8(0, 0, 0).with_alpha(140.0 / 255.0)),
    );
    draw_label(
        text,
        left,
        56.0,
        f32::from(NOTICE_FONT_SIZE),
        Color::from_rgb_u8(253, 249, 0),
    );
}

fn draw_menu(menu: &MenuPresentation) {
    let text = Color::from_rgb_u8(200, 200, 200);
    let highlight = Color::from_rgb_u8(253, 249, 0);

    draw_label("KEY MAZE", 60.0, 100.0, 36.0, Color::from_rgb_u8(245, 245, 245));
    draw_label("Find the KEY, then reach the exit.", 60.0, 150.0, 22.0, text);
    draw_label(
        "W/S: forward/back  A/D: strafe  Mouse or Left/Right: turn",
        60.0,
        180.0,
        22.0,
        Color::from_rgb_u8(130, 130, 130),
    );

    let pick_hint = format!("Level (1-{})", menu.levels.len().clamp(1, 9));
    draw_label(&pick_hint, 60.0, 230.0, 26.0, text);
    for (index, name) in menu.levels.iter().enumerate() {
        let (marker, color) = if index == menu.selected {
            ("> ", highlight)
        } else {
            ("  ", text.lighten(0.2))
        };
        let line = format!("{marker}{}. {name}", index + 1);
        draw_label(&line, 60.0, 262.0 + index as f32 * 30.0, 26.0, color);
    }

    let footer = 300.0 + menu.levels.len() as f32 * 30.0;
    draw_label("ENTER to play", 60.0, footer, 28.0, highlight);
}

fn draw_victory() {
    draw_label("YOU WIN!", 60.0, 130.0, 60.0, Color::from_rgb_u8(253, 249, 0));
    draw_label("ENTER: menu", 60.0, 190.0, 28.0, Color::from_rgb_u8(245, 245, 245));
}

fn draw_label(text: &str, x: f32, baseline: f32, font_size: f32, color: Color) {
    let _ = macroquad::text::draw_text(text, x, baseline, font_size, to_macroquad_color(color));
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
