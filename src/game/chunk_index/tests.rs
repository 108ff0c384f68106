use super::*;
use crate::game::simulation::SimulationPlugin;
use crate::game::targeting::TargetFindingConfig;
use crate::game::unit::{unit_bundle, ChunkCoord, FlagForCleanup, Health, UnitMover};

fn occupant(bits: u64, position: Vec3) -> ChunkOccupant {
    ChunkOccupant { entity: Entity::from_bits(bits), faction: Faction::Friendly, position }
}

#[test]
fn chunk_of_floors_negative_coordinates() {
    let index = ChunkIndex::new(10.0);
    assert_eq!(index.chunk_of(Vec3::new(0.0, 5.0, 0.0)), IVec2::ZERO);
    assert_eq!(index.chunk_of(Vec3::new(9.99, 0.0, 10.0)), IVec2::new(0, 1));
    assert_eq!(index.chunk_of(Vec3::new(-0.1, 0.0, -10.0)), IVec2::new(-1, -1));
    assert_eq!(index.chunk_of(Vec3::new(-10.1, 0.0, 0.0)), IVec2::new(-2, 0));
}

#[test]
fn many_occupants_per_chunk() {
    let mut index = ChunkIndex::new(10.0);
    for i in 0..20 {
        index.insert(occupant(i + 1, Vec3::new(1.0 + i as f32 * 0.1, 0.0, 1.0)));
    }
    index.insert(occupant(100, Vec3::new(15.0, 0.0, 1.0)));

    assert_eq!(index.occupants(IVec2::ZERO).len(), 20);
    assert_eq!(index.occupants(IVec2::new(1, 0)).len(), 1);
    assert_eq!(index.total_entries(), 21);
    assert_eq!(index.non_empty_chunks(), 2);
}

#[test]
fn clear_empties_every_chunk() {
    let mut index = ChunkIndex::new(10.0);
    index.insert(occupant(1, Vec3::new(1.0, 0.0, 1.0)));
    index.insert(occupant(2, Vec3::new(51.0, 0.0, 1.0)));
    index.clear();

    assert_eq!(index.total_entries(), 0);
    assert_eq!(index.non_empty_chunks(), 0);
    assert!(index.occupants(IVec2::ZERO).is_empty());
}

#[test]
fn clear_drops_buckets_left_empty() {
    let mut index = ChunkIndex::new(10.0);
    for x in 0..50 {
        index.clear();
        index.insert(occupant(1, Vec3::new(x as f32 * 10.0 + 1.0, 0.0, 1.0)));
    }

    // Only the chunk filled before the last clear keeps its bucket.
    assert!(index.chunks.len() <= 2, "{} buckets retained", index.chunks.len());
    assert_eq!(index.non_empty_chunks(), 1);
    assert_eq!(index.occupants(IVec2::new(49, 0)).len(), 1);
}

#[test]
fn reset_changes_chunk_size() {
    let mut index = ChunkIndex::new(10.0);
    index.insert(occupant(1, Vec3::new(15.0, 0.0, 1.0)));
    index.reset(20.0);

    assert_eq!(index.total_entries(), 0);
    assert_eq!(index.chunk_of(Vec3::new(15.0, 0.0, 1.0)), IVec2::ZERO);

    index.reset(0.0);
    assert_eq!(index.chunk_size(), DEFAULT_CHUNK_SIZE);
}

#[test]
fn for_each_within_spans_chunks_and_filters_distance() {
    let mut index = ChunkIndex::new(5.0);
    index.insert(occupant(1, Vec3::new(4.5, 0.0, 4.5)));
    index.insert(occupant(2, Vec3::new(5.5, 0.0, 4.5)));
    index.insert(occupant(3, Vec3::new(5.0, 0.0, 7.9)));
    index.insert(occupant(4, Vec3::new(12.0, 0.0, 5.0)));

    let mut seen = Vec::new();
    index.for_each_within(Vec3::new(5.0, 0.0, 5.0), 3.0, |o| seen.push(o.entity.to_bits()));
    seen.sort_unstable();

    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn rebuild_skips_dead_and_flagged_units() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins((SimulationPlugin, ChunkIndexPlugin));
    app.insert_resource(TargetFindingConfig { chunk_size: 10.0, ..default() });

    let mover = UnitMover::default();
    let alive = app.world_mut().spawn(unit_bundle(Faction::Friendly, 0, Vec3::new(25.0, 0.0, 3.0), 100.0, mover)).id();
    let dead = app.world_mut().spawn(unit_bundle(Faction::Hostile, 1, Vec3::new(1.0, 0.0, 1.0), 100.0, mover)).id();
    let flagged = app.world_mut().spawn(unit_bundle(Faction::Hostile, 2, Vec3::new(2.0, 0.0, 1.0), 100.0, mover)).id();
    app.world_mut().get_mut::<Health>(dead).unwrap().current = 0.0;
    app.world_mut().entity_mut(flagged).insert(FlagForCleanup);

    app.world_mut().run_schedule(FixedUpdate);

    let index = app.world().resource::<ChunkIndex>();
    assert_eq!(index.chunk_size(), 10.0);
    assert_eq!(index.total_entries(), 1);
    assert_eq!(index.occupants(IVec2::new(2, 0))[0].entity, alive);

    let coord = app.world().get::<ChunkCoord>(alive).unwrap();
    assert_eq!(coord.current, IVec2::new(2, 0));
}

#[test]
fn chunk_coord_keeps_previous_value() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins((SimulationPlugin, ChunkIndexPlugin));
    app.insert_resource(TargetFindingConfig { chunk_size: 10.0, ..default() });

    let unit = app
        .world_mut()
        .spawn(unit_bundle(Faction::Friendly, 0, Vec3::new(5.0, 0.0, 5.0), 100.0, UnitMover::default()))
        .id();
    app.world_mut().run_schedule(FixedUpdate);

    app.world_mut().get_mut::<Transform>(unit).unwrap().translation = Vec3::new(15.0, 0.0, -5.0);
    app.world_mut().run_schedule(FixedUpdate);

    let coord = app.world().get::<ChunkCoord>(unit).unwrap();
    assert_eq!(coord.previous, IVec2::ZERO);
    assert_eq!(coord.current, IVec2::new(1, -1));
}
