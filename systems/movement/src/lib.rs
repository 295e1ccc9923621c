#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that integrates player input against the tile map.

use glam::Vec2;
use keymaze_core::{Command, Event, PlayState, PlayerInput, Pose, TileMap};

/// Speeds applied when converting input into motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementTuning {
    /// Translation speed in cells per second.
    pub move_speed: f32,
    /// Keyboard rotation speed in radians per second.
    pub turn_speed: f32,
    /// Radians of rotation per pixel of horizontal pointer movement.
    pub look_sensitivity: f32,
}

impl MovementTuning {
    /// Default translation speed in cells per second.
    pub const DEFAULT_MOVE_SPEED: f32 = 4.5;
    /// Default keyboard rotation speed in radians per second.
    pub const DEFAULT_TURN_SPEED: f32 = 2.0;
    /// Default pointer sensitivity in radians per pixel.
    pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.0028;
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: Self::DEFAULT_MOVE_SPEED,
            turn_speed: Self::DEFAULT_TURN_SPEED,
            look_sensitivity: Self::DEFAULT_LOOK_SENSITIVITY,
        }
    }
}

/// Pure system that reacts to world events and emits pose commits.
#[derive(Debug)]
pub struct Movement {
    tuning: MovementTuning,
    play_state: PlayState,
}

impl Movement {
    /// Creates a movement system using the provided tuning.
    #[must_use]
    pub fn new(tuning: MovementTuning) -> Self {
        Self {
            tuning,
            play_state: PlayState::Menu,
        }
    }

    /// Consumes world events and the frame's input to emit a pose commit.
    ///
    /// A commit is emitted every playing frame, even when the pose did not
    /// change, so the world re-evaluates the cell the player stands on.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: &PlayerInput,
        pose: Pose,
        map: &TileMap,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::PlayStateChanged { state } = event {
                self.play_state = *state;
            }
        }

        if self.play_state != PlayState::Playing {
            return;
        }

        let steered = steer(pose, input, &self.tuning);
        let offset = displacement(&steered, input, &self.tuning);
        out.push(Command::CommitPose {
            pose: integrate(steered, offset, map),
        });
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(MovementTuning::default())
    }
}

/// Applies pointer and keyboard rotation to the pose.
///
/// Pointer movement to the right turns clockwise. Keyboard turns are scaled by
/// elapsed time; holding both turn keys cancels out.
#[must_use]
pub fn steer(pose: Pose, input: &PlayerInput, tuning: &MovementTuning) -> Pose {
    let mut pose = pose.rotated(-input.look_delta * tuning.look_sensitivity);
    let turn = tuning.turn_speed * input.elapsed;
    if input.turn_right {
        pose = pose.rotated(-turn);
    }
    if input.turn_left {
        pose = pose.rotated(turn);
    }
    pose
}

/// Computes the desired displacement for the frame from the pose's heading.
#[must_use]
pub fn displacement(pose: &Pose, input: &PlayerInput, tuning: &MovementTuning) -> Vec2 {
    let step = tuning.move_speed * input.elapsed;
    let heading = pose.direction;
    let left = Vec2::new(-heading.y, heading.x);

    let mut offset = Vec2::ZERO;
    if input.forward {
        offset += heading * step;
    }
    if input.backward {
        offset -= heading * step;
    }
    if input.strafe_left {
        offset += left * step;
    }
    if input.strafe_right {
        offset -= left * step;
    }
    offset
}

/// Moves the pose by `offset`, resolving each axis independently.
///
/// The X move is tested against the old Y; the Y move is tested against the
/// possibly updated X. An axis whose destination cell is solid is dropped,
/// which lets the player slide along walls.
#[must_use]
pub fn integrate(pose: Pose, offset: Vec2, map: &TileMap) -> Pose {
    let mut position = pose.position;

    let candidate_x = Vec2::new(position.x + offset.x, position.y);
    if !map.is_solid_at(candidate_x) {
        position = candidate_x;
    }

    let candidate_y = Vec2::new(position.x, position.y + offset.y);
    if !map.is_solid_at(candidate_y) {
        position = candidate_y;
    }

    pose.with_position(position)
}
