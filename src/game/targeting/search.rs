use bevy::prelude::*;

use crate::game::chunk_index::{ChunkIndex, ChunkOccupant};
use crate::game::unit::Faction;

use super::TargetFindingConfig;

/// Closest occupant of `target_faction` around `center`.
///
/// The seeker's own chunk is searched first with no distance cap. Only if
/// it holds no candidate are the square rings `1..=max_chunk_search_radius`
/// searched, perimeter chunks only, with `max_search_range` enforced. The
/// search stops at the first ring that yields anything, so a closer unit
/// further out in chunk terms can be missed. Ties keep the first occupant
/// found.
pub fn find_target(
    index: &ChunkIndex,
    center: IVec2,
    position: Vec3,
    target_faction: Faction,
    config: &TargetFindingConfig,
) -> Option<ChunkOccupant> {
    let mut best: Option<(f32, ChunkOccupant)> = None;
    scan_chunk(index, center, position, target_faction, None, &mut best);
    if let Some((_, found)) = best {
        return Some(found);
    }

    let range_sq = (config.max_search_range > 0.0)
        .then(|| config.max_search_range * config.max_search_range);

    for radius in 1..=config.max_chunk_search_radius {
        for x in -radius..=radius {
            for z in -radius..=radius {
                if x.abs() != radius && z.abs() != radius {
                    continue;
                }
                let chunk = center + IVec2::new(x, z);
                scan_chunk(index, chunk, position, target_faction, range_sq, &mut best);
            }
        }

        if let Some((_, found)) = best {
            return Some(found);
        }
    }

    None
}

fn scan_chunk(
    index: &ChunkIndex,
    chunk: IVec2,
    position: Vec3,
    target_faction: Faction,
    range_sq: Option<f32>,
    best: &mut Option<(f32, ChunkOccupant)>,
) {
    for occupant in index.occupants(chunk) {
        if occupant.faction != target_faction {
            continue;
        }
        let dist_sq = position.distance_squared(occupant.position);
        if range_sq.is_some_and(|limit| dist_sq > limit) {
            continue;
        }
        if best.map_or(true, |(closest, _)| dist_sq < closest) {
            *best = Some((dist_sq, *occupant));
        }
    }
}
