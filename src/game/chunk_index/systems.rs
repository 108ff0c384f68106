use bevy::prelude::*;
use skirmish_macros::profile;

use crate::game::simulation::SimTick;
use crate::game::targeting::TargetFindingConfig;
use crate::game::unit::{ChunkCoord, FlagForCleanup, Health, Unit};

use super::{chunk_coord, ChunkIndex, ChunkOccupant};

/// Recompute every unit's chunk coordinate, keeping the previous one.
pub fn update_chunk_coords(
    index: Res<ChunkIndex>,
    config: Option<Res<TargetFindingConfig>>,
    mut units: Query<(&Transform, &mut ChunkCoord), With<Unit>>,
) {
    let chunk_size = config.map_or(index.chunk_size(), |c| c.chunk_size);
    if !(chunk_size > 0.0) {
        return;
    }

    units.par_iter_mut().for_each(|(transform, mut coord)| {
        let current = chunk_coord(transform.translation, chunk_size);
        coord.previous = coord.current;
        coord.current = current;
    });
}

/// Refill the chunk index from live units.
///
/// Dead or flagged units are left out, so nothing downstream can acquire
/// them as a target or steer around them.
#[profile(2)]
pub fn rebuild_chunk_index(
    mut index: ResMut<ChunkIndex>,
    config: Option<Res<TargetFindingConfig>>,
    units: Query<(Entity, &Unit, &Transform, &Health), Without<FlagForCleanup>>,
    tick: Res<SimTick>,
) {
    match config {
        Some(config) if config.chunk_size != index.chunk_size() => index.reset(config.chunk_size),
        _ => index.clear(),
    }

    for (entity, unit, transform, health) in units.iter() {
        if !health.is_alive() {
            continue;
        }
        index.insert(ChunkOccupant {
            entity,
            faction: unit.faction,
            position: transform.translation,
        });
    }

    crate::profile_log!(
        tick,
        "[CHUNKS] {} units in {} chunks",
        index.total_entries(),
        index.non_empty_chunks()
    );
}
