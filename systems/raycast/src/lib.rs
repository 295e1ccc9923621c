#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Digital differential analyzer that casts one ray per screen column.
//!
//! Each ray runs through three stages: [`Traversal::new`] derives the step
//! directions and initial side distances, [`Traversal::advance`] crosses one
//! grid line at a time, and [`classify`] decides whether the entered cell stops
//! the ray. [`trace`] drives the stages until a hit is found.

use glam::Vec2;
use keymaze_core::{HitMaterial, Pose, RayHit, Side, TileKind, TileMap};

/// Delta distance substituted for a ray component that is exactly zero.
pub const ZERO_COMPONENT_DELTA: f32 = 1e30;

/// Smallest perpendicular distance reported for a hit.
pub const MIN_PERP_DISTANCE: f32 = 1e-4;

/// Normalised camera-space offset of a screen column in the range -1..1.
#[must_use]
pub fn camera_x(column: u32, screen_width: u32) -> f32 {
    2.0 * column as f32 / screen_width as f32 - 1.0
}

/// Direction of the ray cast through the given camera-space offset.
#[must_use]
pub fn ray_direction(pose: &Pose, camera_x: f32) -> Vec2 {
    pose.direction + pose.plane * camera_x
}

fn delta_distance(component: f32) -> f32 {
    if component == 0.0 {
        ZERO_COMPONENT_DELTA
    } else {
        (1.0 / component).abs()
    }
}

/// Grid traversal state for a single ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Traversal {
    map_x: i32,
    map_y: i32,
    step_x: i32,
    step_y: i32,
    side_dist_x: f32,
    side_dist_y: f32,
    delta_dist_x: f32,
    delta_dist_y: f32,
    last_side: Option<Side>,
    steps: u32,
}

impl Traversal {
    /// Prepares a traversal from `origin` along `ray_direction`.
    #[must_use]
    pub fn new(origin: Vec2, ray_direction: Vec2) -> Self {
        let map_x = origin.x.floor() as i32;
        let map_y = origin.y.floor() as i32;
        let delta_dist_x = delta_distance(ray_direction.x);
        let delta_dist_y = delta_distance(ray_direction.y);

        let (step_x, side_dist_x) = if ray_direction.x < 0.0 {
            (-1, (origin.x - map_x as f32) * delta_dist_x)
        } else {
            (1, (map_x as f32 + 1.0 - origin.x) * delta_dist_x)
        };
        let (step_y, side_dist_y) = if ray_direction.y < 0.0 {
            (-1, (origin.y - map_y as f32) * delta_dist_y)
        } else {
            (1, (map_y as f32 + 1.0 - origin.y) * delta_dist_y)
        };

        Self {
            map_x,
            map_y,
            step_x,
            step_y,
            side_dist_x,
            side_dist_y,
            delta_dist_x,
            delta_dist_y,
            last_side: None,
            steps: 0,
        }
    }

    /// Crosses the nearest grid line and returns the axis that was crossed.
    ///
    /// X advances only when its side distance is strictly smaller, so ties
    /// always step along Y.
    pub fn advance(&mut self) -> Side {
        let side = if self.side_dist_x < self.side_dist_y {
            self.side_dist_x += self.delta_dist_x;
            self.map_x += self.step_x;
            Side::X
        } else {
            self.side_dist_y += self.delta_dist_y;
            self.map_y += self.step_y;
            Side::Y
        };
        self.last_side = Some(side);
        self.steps += 1;
        side
    }

    /// Cell the traversal currently occupies.
    #[must_use]
    pub const fn cell(&self) -> (i32, i32) {
        (self.map_x, self.map_y)
    }

    /// Per-axis step direction, each either -1 or +1.
    #[must_use]
    pub const fn step(&self) -> (i32, i32) {
        (self.step_x, self.step_y)
    }

    /// Distance along the ray to the next X and Y grid-line crossings.
    #[must_use]
    pub const fn side_distances(&self) -> (f32, f32) {
        (self.side_dist_x, self.side_dist_y)
    }

    /// Distance along the ray between consecutive X and Y grid lines.
    #[must_use]
    pub const fn delta_distances(&self) -> (f32, f32) {
        (self.delta_dist_x, self.delta_dist_y)
    }

    /// Axis crossed by the most recent step, if any step was taken.
    #[must_use]
    pub const fn last_side(&self) -> Option<Side> {
        self.last_side
    }

    /// Number of grid lines crossed so far.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Perpendicular distance to the grid line crossed by the last step.
    ///
    /// Clamped to [`MIN_PERP_DISTANCE`]; a traversal that has not stepped yet
    /// reports the minimum.
    #[must_use]
    pub fn perp_distance(&self) -> f32 {
        let distance = match self.last_side {
            Some(Side::X) => self.side_dist_x - self.delta_dist_x,
            Some(Side::Y) => self.side_dist_y - self.delta_dist_y,
            None => 0.0,
        };
        distance.max(MIN_PERP_DISTANCE)
    }
}

/// Decides whether the given cell stops a ray.
///
/// Key and exit cells are transparent; cells outside the grid stop the ray
/// with [`HitMaterial::Boundary`].
#[must_use]
pub fn classify(map: &TileMap, cell: (i32, i32)) -> Option<HitMaterial> {
    match map.classify(cell.0, cell.1) {
        TileKind::Wall(code) => Some(HitMaterial::Wall(code)),
        TileKind::Boundary => Some(HitMaterial::Boundary),
        TileKind::Empty | TileKind::Key | TileKind::Exit => None,
    }
}

/// Advances the traversal until it enters a cell that stops the ray.
///
/// Every step moves one cell along an axis, so the traversal leaves any
/// finite grid and is guaranteed to terminate.
pub fn trace(map: &TileMap, traversal: &mut Traversal) -> HitMaterial {
    loop {
        let _ = traversal.advance();
        if let Some(material) = classify(map, traversal.cell()) {
            return material;
        }
    }
}

/// Casts a single ray from `origin` and packages the hit for `column`.
#[must_use]
pub fn cast_ray(map: &TileMap, origin: Vec2, ray_direction: Vec2, column: u32) -> RayHit {
    let mut traversal = Traversal::new(origin, ray_direction);
    let material = trace(map, &mut traversal);

    RayHit {
        column,
        ray_direction,
        perp_distance: traversal.perp_distance(),
        side: traversal.last_side().unwrap_or(Side::X),
        material,
        cell: traversal.cell(),
    }
}

/// Pure system that sweeps every screen column once per frame.
#[derive(Debug, Default)]
pub struct RayCaster {
    hits: Vec<RayHit>,
}

impl RayCaster {
    /// Casts one ray per column of a `screen_width` wide view from `pose`.
    ///
    /// Hits are ordered by column and stored in a buffer reused across frames.
    pub fn cast_frame(&mut self, map: &TileMap, pose: &Pose, screen_width: u32) -> &[RayHit] {
        self.hits.clear();
        self.hits.reserve(screen_width as usize);
        for column in 0..screen_width {
            let direction = ray_direction(pose, camera_x(column, screen_width));
            self.hits
                .push(cast_ray(map, pose.position, direction, column));
        }
        &self.hits
    }

    /// Hits produced by the most recent sweep.
    #[must_use]
    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymaze_core::{ReservedTiles, TileCode};

    fn bordered(width: u32, height: u32) -> TileMap {
        let mut codes = Vec::new();
        for row in 0..height {
            for column in 0..width {
                let edge = row == 0 || column == 0 || row == height - 1 || column == width - 1;
                codes.push(i32::from(edge));
            }
        }
        TileMap::from_codes(width, height, &codes, ReservedTiles::default()).expect("valid map")
    }

    #[test]
    fn camera_x_spans_the_screen() {
        assert_eq!(camera_x(0, 640), -1.0);
        assert_eq!(camera_x(320, 640), 0.0);
        assert!(camera_x(639, 640) < 1.0);
    }

    #[test]
    fn center_column_of_bordered_room_hits_east_wall() {
        let map = bordered(5, 5);
        let pose = Pose::new(Vec2::new(1.5, 1.5), Vec2::X, Vec2::new(0.0, 0.66));

        let hit = cast_ray(&map, pose.position, ray_direction(&pose, 0.0), 320);

        assert!((hit.perp_distance - 2.5).abs() < 1e-5);
        assert_eq!(hit.side, Side::X);
        assert_eq!(hit.cell, (4, 1));
        assert_eq!(hit.material, HitMaterial::Wall(TileCode::new(1)));
    }

    #[test]
    fn perpendicular_distance_is_constant_across_a_facing_wall() {
        let map = bordered(5, 9);
        let pose = Pose::new(Vec2::new(1.5, 4.5), Vec2::X, Vec2::new(0.0, 0.66));
        let mut caster = RayCaster::default();

        let hits = caster.cast_frame(&map, &pose, 64);

        assert_eq!(hits.len(), 64);
        for hit in hits {
            assert_eq!(hit.side, Side::X, "column {}", hit.column);
            assert_eq!(hit.cell.0, 4, "column {}", hit.column);
            assert!(
                (hit.perp_distance - 2.5).abs() < 1e-4,
                "column {} reported {}",
                hit.column,
                hit.perp_distance
            );
        }
    }

    #[test]
    fn ties_step_along_y() {
        let mut traversal = Traversal::new(Vec2::new(0.5, 0.5), Vec2::new(1.0, 1.0));

        assert_eq!(traversal.side_distances(), (0.5, 0.5));
        assert_eq!(traversal.advance(), Side::Y);
        assert_eq!(traversal.cell(), (0, 1));
        assert_eq!(traversal.advance(), Side::X);
        assert_eq!(traversal.cell(), (1, 1));
    }

    #[test]
    fn zero_components_use_the_sentinel_delta() {
        let traversal = Traversal::new(Vec2::new(2.25, 1.5), Vec2::new(0.0, -1.0));

        assert_eq!(traversal.delta_distances(), (ZERO_COMPONENT_DELTA, 1.0));
        assert_eq!(traversal.step(), (1, -1));
        assert!((traversal.side_distances().1 - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn axis_aligned_ray_never_steps_along_the_zero_axis() {
        let map = bordered(6, 6);
        let mut traversal = Traversal::new(Vec2::new(2.5, 4.5), Vec2::new(0.0, -1.0));

        let material = trace(&map, &mut traversal);

        assert_eq!(material, HitMaterial::Wall(TileCode::new(1)));
        assert_eq!(traversal.cell(), (2, 0));
        assert_eq!(traversal.last_side(), Some(Side::Y));
        assert!((traversal.perp_distance() - 3.5).abs() < 1e-5);
    }

    #[test]
    fn leaving_the_grid_reports_a_boundary_hit() {
        let map = TileMap::from_codes(3, 3, &[0; 9], ReservedTiles::default()).expect("valid map");

        let hit = cast_ray(&map, Vec2::new(1.5, 1.5), Vec2::new(-1.0, 0.0), 0);

        assert_eq!(hit.material, HitMaterial::Boundary);
        assert_eq!(hit.cell, (-1, 1));
        assert!((hit.perp_distance - 1.5).abs() < 1e-5);
    }

    #[test]
    fn key_and_exit_cells_do_not_stop_rays() {
        #[rustfmt::skip]
        let codes = [
            1, 1, 1, 1, 1, 1,
            1, 0, 8, 9, 3, 1,
            1, 1, 1, 1, 1, 1,
        ];
        let map = TileMap::from_codes(6, 3, &codes, ReservedTiles::default()).expect("valid map");

        let hit = cast_ray(&map, Vec2::new(1.5, 1.5), Vec2::X, 0);

        assert_eq!(hit.material, HitMaterial::Wall(TileCode::new(3)));
        assert_eq!(hit.cell, (4, 1));
        assert!((hit.perp_distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn perpendicular_distance_is_clamped_when_hugging_a_wall() {
        let map = TileMap::from_codes(3, 1, &[0, 1, 0], ReservedTiles::default())
            .expect("valid map");

        let hit = cast_ray(&map, Vec2::new(2.0, 0.5), Vec2::new(-1.0, 0.0), 0);

        assert_eq!(hit.cell, (1, 0));
        assert_eq!(hit.perp_distance, MIN_PERP_DISTANCE);
    }

    #[test]
    fn traversal_terminates_within_grid_perimeter() {
        let width = 12;
        let height = 9;
        let map = bordered(width, height);
        let origins = [
            Vec2::new(1.5, 1.5),
            Vec2::new(5.25, 4.75),
            Vec2::new(10.9, 7.1),
        ];

        for origin in origins {
            for index in 0..360 {
                let angle = (index as f32).to_radians();
                let mut traversal = Traversal::new(origin, Vec2::from_angle(angle));
                let _ = trace(&map, &mut traversal);
                assert!(
                    traversal.steps() <= width + height,
                    "ray at {index} degrees from {origin} took {} steps",
                    traversal.steps()
                );
            }
        }
    }
}
