use bevy::prelude::*;
use skirmish_macros::profile;

use crate::game::chunk_index::ChunkIndex;
use crate::game::unit::{ChunkCoord, FlagForCleanup, Health, TargetData, Unit, UnitMover};

use super::{find_target, TargetFindingConfig};

/// Overwrite every live unit's target with the nearest enemy, or clear it.
#[profile(2)]
pub fn acquire_targets(
    config: Option<Res<TargetFindingConfig>>,
    index: Res<ChunkIndex>,
    mut units: Query<(&Unit, &Transform, &ChunkCoord, &mut TargetData), Without<FlagForCleanup>>,
) {
    let Some(config) = config else {
        return;
    };
    let config = *config;
    let index = &*index;

    units
        .par_iter_mut()
        .for_each(|(unit, transform, coord, mut target)| {
            match find_target(index, coord.current, transform.translation, unit.target_faction, &config) {
                Some(found) => target.acquire(found.entity, found.position),
                None => target.clear(),
            }
        });
}

/// Drop targets that died or despawned since acquisition and refresh the
/// in-range flag. Runs every tick, between acquisition cycles too.
pub fn validate_targets(
    mut units: Query<(&Transform, &UnitMover, &mut TargetData)>,
    targets: Query<(&Health, Has<FlagForCleanup>), With<Unit>>,
) {
    units
        .par_iter_mut()
        .for_each(|(transform, mover, mut target)| {
            if !target.has_target {
                if target.in_range || target.target.is_some() {
                    target.clear();
                }
                return;
            }

            let alive = target
                .target
                .and_then(|entity| targets.get(entity).ok())
                .is_some_and(|(health, flagged)| health.is_alive() && !flagged);
            if !alive {
                target.clear();
                return;
            }

            let in_range =
                transform.translation.distance(target.target_position) <= mover.min_distance_to_target;
            if target.in_range != in_range {
                target.in_range = in_range;
            }
        });
}
