#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Perspective projection and texture sampling for ray hits.
//!
//! The projector turns each [`RayHit`] into a [`WallSlice`]: a column height
//! inversely proportional to the perpendicular distance, a vertically centred
//! origin, and the texel column to sample from the wall's texture.

mod materials;

use glam::Vec2;
use keymaze_core::{Pose, RayHit, Shade, Side, WallSlice};

pub use materials::{MaterialError, MaterialMapping, MaterialTable, TextureDimensions};

/// Height in pixels of a wall column at perpendicular distance `perp_distance`.
#[must_use]
pub fn column_height(screen_height: u32, perp_distance: f32) -> u32 {
    (screen_height as f32 / perp_distance) as u32
}

/// Y coordinate of the top edge that centres a column of `height` pixels.
#[must_use]
pub fn column_top(screen_height: u32, height: u32) -> i32 {
    let half_screen = i32::try_from(screen_height / 2).unwrap_or(i32::MAX);
    let half_column = i32::try_from(height / 2).unwrap_or(i32::MAX);
    half_screen.saturating_sub(half_column)
}

/// Position along the hit wall face in the range 0..1.
#[must_use]
pub fn wall_fraction(origin: Vec2, hit: &RayHit) -> f32 {
    let along = match hit.side {
        Side::X => origin.y + hit.perp_distance * hit.ray_direction.y,
        Side::Y => origin.x + hit.perp_distance * hit.ray_direction.x,
    };
    along - along.floor()
}

/// Texel column sampled for a wall fraction on a texture `texture_width` wide.
///
/// Faces seen from the positive X side and the negative Y side are mirrored
/// so textures read the same way on every face.
#[must_use]
pub fn texture_column(fraction: f32, texture_width: u32, side: Side, ray_direction: Vec2) -> u32 {
    if texture_width == 0 {
        return 0;
    }

    let column = ((fraction * texture_width as f32) as u32).min(texture_width - 1);
    let mirrored = match side {
        Side::X => ray_direction.x > 0.0,
        Side::Y => ray_direction.y < 0.0,
    };
    if mirrored {
        texture_width - column - 1
    } else {
        column
    }
}

/// Pure system that projects a frame of hits into drawable wall slices.
#[derive(Debug)]
pub struct Projector {
    materials: MaterialTable,
    slices: Vec<WallSlice>,
}

impl Projector {
    /// Creates a projector sampling textures through the provided table.
    #[must_use]
    pub fn new(materials: MaterialTable) -> Self {
        Self {
            materials,
            slices: Vec::new(),
        }
    }

    /// Projects a single hit seen from `pose`.
    #[must_use]
    pub fn project(&self, pose: &Pose, hit: &RayHit, screen_height: u32) -> WallSlice {
        let height = column_height(screen_height, hit.perp_distance);
        let texture = self.materials.texture_for(hit.material);
        let fraction = wall_fraction(pose.position, hit);

        WallSlice {
            column: hit.column,
            height,
            top: column_top(screen_height, height),
            texture,
            texture_column: texture_column(
                fraction,
                self.materials.texture_width(texture),
                hit.side,
                hit.ray_direction,
            ),
            shade: Shade::for_side(hit.side),
        }
    }

    /// Projects every hit of a frame, preserving column order.
    pub fn project_frame(
        &mut self,
        pose: &Pose,
        hits: &[RayHit],
        screen_height: u32,
    ) -> &[WallSlice] {
        self.slices.clear();
        for hit in hits {
            let slice = self.project(pose, hit, screen_height);
            self.slices.push(slice);
        }
        &self.slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymaze_core::{HitMaterial, ReservedTiles, TextureId, TileCode, TileMap};

    fn hit(side: Side, ray_direction: Vec2, perp_distance: f32) -> RayHit {
        RayHit {
            column: 7,
            ray_direction,
            perp_distance,
            side,
            material: HitMaterial::Wall(TileCode::new(1)),
            cell: (4, 1),
        }
    }

    fn projector(texture_count: usize) -> Projector {
        let map = TileMap::from_codes(2, 1, &[1, 2], ReservedTiles::default()).expect("valid map");
        let textures = vec![TextureDimensions::new(128, 128); texture_count];
        let table = MaterialTable::build(&map, &textures, MaterialMapping::Modulo)
            .expect("modulo mapping accepts any texture count");
        Projector::new(table)
    }

    #[test]
    fn column_height_follows_inverse_distance() {
        assert_eq!(column_height(640, 2.5), 256);
        assert_eq!(column_height(640, 1.0), 640);
        assert_eq!(column_height(640, 0.5), 1280);
    }

    #[test]
    fn column_height_never_grows_with_distance() {
        let mut previous = u32::MAX;
        for step in 1..2_000 {
            let distance = step as f32 * 0.01;
            let height = column_height(480, distance);
            assert!(height <= previous, "height grew at distance {distance}");
            previous = height;
        }
        assert!(column_height(480, 1.0) > column_height(480, 2.0));
        assert!(column_height(480, 2.0) > column_height(480, 3.0));
    }

    #[test]
    fn columns_are_centred_vertically() {
        assert_eq!(column_top(640, 256), 192);
        assert_eq!(column_top(640, 1280), -320);
        assert_eq!(column_top(641, 255), 193);
    }

    #[test]
    fn wall_fraction_uses_the_axis_along_the_face() {
        let origin = Vec2::new(1.5, 1.25);
        let x_hit = hit(Side::X, Vec2::new(1.0, 0.2), 2.5);
        let y_hit = hit(Side::Y, Vec2::new(0.3, 1.0), 1.75);

        assert!((wall_fraction(origin, &x_hit) - 0.75).abs() < 1e-5);
        assert!((wall_fraction(origin, &y_hit) - 0.025).abs() < 1e-5);
    }

    #[test]
    fn texture_column_stays_within_the_texture() {
        let directions = [
            (Side::X, Vec2::new(1.0, 0.3)),
            (Side::X, Vec2::new(-1.0, 0.3)),
            (Side::Y, Vec2::new(0.3, 1.0)),
            (Side::Y, Vec2::new(0.3, -1.0)),
        ];
        for (side, direction) in directions {
            for step in 0..1_000 {
                let fraction = step as f32 / 1_000.0;
                let column = texture_column(fraction, 64, side, direction);
                assert!(column < 64, "fraction {fraction} sampled {column}");
            }
            let column = texture_column(0.999_999_9, 64, side, direction);
            assert!(column < 64);
        }
    }

    #[test]
    fn back_faces_are_mirrored() {
        assert_eq!(texture_column(0.25, 128, Side::X, Vec2::new(-1.0, 0.0)), 32);
        assert_eq!(texture_column(0.25, 128, Side::X, Vec2::new(1.0, 0.0)), 95);
        assert_eq!(texture_column(0.25, 128, Side::Y, Vec2::new(0.0, 1.0)), 32);
        assert_eq!(texture_column(0.25, 128, Side::Y, Vec2::new(0.0, -1.0)), 95);
    }

    #[test]
    fn y_side_hits_are_shadowed() {
        let projector = projector(3);
        let pose = Pose::default();

        let lit = projector.project(&pose, &hit(Side::X, Vec2::X, 2.5), 640);
        let shadowed = projector.project(&pose, &hit(Side::Y, Vec2::Y, 2.5), 640);

        assert_eq!(lit.shade, Shade::Lit);
        assert_eq!(shadowed.shade, Shade::Shadowed);
    }

    #[test]
    fn spawn_center_column_projects_expected_slice() {
        let projector = projector(3);
        let pose = Pose::default();

        let slice = projector.project(&pose, &hit(Side::X, Vec2::X, 2.5), 640);

        assert_eq!(
            slice,
            WallSlice {
                column: 7,
                height: 256,
                top: 192,
                texture: TextureId::new(0),
                texture_column: 63,
                shade: Shade::Lit,
            }
        );
    }

    #[test]
    fn project_frame_preserves_column_order() {
        let mut projector = projector(1);
        let pose = Pose::default();
        let hits: Vec<RayHit> = (0..4)
            .map(|column| RayHit {
                column,
                ..hit(Side::X, Vec2::X, 1.0 + column as f32)
            })
            .collect();

        let slices = projector.project_frame(&pose, &hits, 480);

        let columns: Vec<u32> = slices.iter().map(|slice| slice.column).collect();
        assert_eq!(columns, vec![0, 1, 2, 3]);
        assert_eq!(slices[0].height, 480);
        assert_eq!(slices[3].height, 120);
    }
}
