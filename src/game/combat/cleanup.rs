use bevy::prelude::*;

use crate::game::unit::FlagForCleanup;

/// Despawn every unit flagged dead during this tick.
pub fn despawn_flagged_units(mut commands: Commands, flagged: Query<Entity, With<FlagForCleanup>>) {
    let mut count = 0usize;
    for entity in flagged.iter() {
        commands.entity(entity).despawn();
        count += 1;
    }
    if count > 0 {
        debug!("Despawned {} dead units", count);
    }
}
