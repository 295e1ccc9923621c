//! Player pose expressed in grid-cell units.

use glam::Vec2;

/// Continuous position, facing direction and camera plane of the player.
///
/// The camera plane stays perpendicular to the direction; its length encodes
/// the horizontal field of view. Both vectors only ever change through
/// [`Pose::rotated`], which applies the same rotation to each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position measured in cells from the grid origin.
    pub position: Vec2,
    /// Unit-length facing direction.
    pub direction: Vec2,
    /// Camera plane vector perpendicular to `direction`.
    pub plane: Vec2,
}

impl Pose {
    /// Default camera plane magnitude, roughly a 66 degree field of view.
    pub const DEFAULT_FOV: f32 = 0.66;

    /// Creates a pose from explicit vectors.
    #[must_use]
    pub const fn new(position: Vec2, direction: Vec2, plane: Vec2) -> Self {
        Self {
            position,
            direction,
            plane,
        }
    }

    /// Creates a pose facing `direction` with a camera plane of magnitude `fov`.
    ///
    /// The plane is placed on the clockwise side of the direction, so a pose
    /// facing +X sees +Y on its right-hand screen edge.
    #[must_use]
    pub fn facing(position: Vec2, direction: Vec2, fov: f32) -> Self {
        let direction = direction.normalize_or_zero();
        let plane = Vec2::new(-direction.y, direction.x) * fov;
        Self::new(position, direction, plane)
    }

    /// Returns the pose rotated by `angle` radians around its position.
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        if angle == 0.0 {
            return self;
        }
        let rotation = Vec2::from_angle(angle);
        Self {
            position: self.position,
            direction: rotation.rotate(self.direction),
            plane: rotation.rotate(self.plane),
        }
    }

    /// Returns the pose moved to a new position with unchanged orientation.
    #[must_use]
    pub const fn with_position(self, position: Vec2) -> Self {
        Self {
            position,
            direction: self.direction,
            plane: self.plane,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::facing(Vec2::new(1.5, 1.5), Vec2::X, Self::DEFAULT_FOV)
    }
}
