mod components;

use bevy::prelude::*;

pub use components::{
    ChunkCoord, Faction, FlagForCleanup, Health, MoverMode, MoverState, TargetData, Unit, UnitMover,
};

/// Components every unit needs to take part in targeting, pathfinding and
/// movement. Combat components are added on top by the caller.
pub fn unit_bundle(
    faction: Faction,
    id: u32,
    position: Vec3,
    max_health: f32,
    mover: UnitMover,
) -> impl Bundle {
    (
        Unit::new(faction, id),
        Health::new(max_health),
        Transform::from_translation(position),
        ChunkCoord::default(),
        TargetData::default(),
        mover,
        MoverState::default(),
    )
}
