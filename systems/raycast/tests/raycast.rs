use glam::Vec2;
use keymaze_core::{Command, HitMaterial, LevelId, Pose, ReservedTiles, Side, TileMap};
use keymaze_system_raycast::RayCaster;
use keymaze_world::{self as world, query, World};

fn bordered_world(width: u32, height: u32, spawn: Pose) -> World {
    let mut codes = Vec::new();
    for row in 0..height {
        for column in 0..width {
            let edge = row == 0 || column == 0 || row == height - 1 || column == width - 1;
            codes.push(if edge { 2 } else { 0 });
        }
    }
    let map = TileMap::from_codes(width, height, &codes, ReservedTiles::default())
        .expect("valid bordered map");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelId::new(0),
            map,
            spawn,
        },
        &mut events,
    );
    world
}

#[test]
fn spawn_view_of_a_bordered_room_matches_expected_geometry() {
    let world = bordered_world(5, 5, Pose::default());
    let map = query::tile_map(&world).expect("level loaded");
    let pose = query::pose(&world);
    let mut caster = RayCaster::default();

    let hits = caster.cast_frame(map, &pose, 640);

    assert_eq!(hits.len(), 640);
    let center = hits[320];
    assert_eq!(center.column, 320);
    assert_eq!(center.side, Side::X);
    assert!((center.perp_distance - 2.5).abs() < 1e-5);
    for (column, hit) in hits.iter().enumerate() {
        assert_eq!(hit.column as usize, column);
        assert!(hit.perp_distance > 0.0);
        assert!(matches!(hit.material, HitMaterial::Wall(_)));
    }
}

#[test]
fn casting_is_repeatable_for_the_same_pose() {
    let spawn = Pose::facing(Vec2::new(3.2, 2.7), Vec2::new(0.3, -0.8), Pose::DEFAULT_FOV);
    let world = bordered_world(8, 6, spawn);
    let map = query::tile_map(&world).expect("level loaded");
    let pose = query::pose(&world);
    let mut first = RayCaster::default();
    let mut second = RayCaster::default();

    let first_hits = first.cast_frame(map, &pose, 320).to_vec();
    let second_hits = second.cast_frame(map, &pose, 320).to_vec();

    assert_eq!(first_hits, second_hits);
    assert_eq!(first.hits(), first_hits.as_slice());
}

#[test]
fn hit_buffer_is_resized_with_the_viewport() {
    let world = bordered_world(5, 5, Pose::default());
    let map = query::tile_map(&world).expect("level loaded");
    let pose = query::pose(&world);
    let mut caster = RayCaster::default();

    assert_eq!(caster.cast_frame(map, &pose, 200).len(), 200);
    assert_eq!(caster.cast_frame(map, &pose, 80).len(), 80);
}
