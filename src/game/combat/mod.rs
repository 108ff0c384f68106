//! Melee combat, faction health bookkeeping and removal of dead units.

use bevy::prelude::*;

use crate::game::simulation::{faction_health_due, SimSet};

pub mod cleanup;
pub mod health;
pub mod melee;

pub use cleanup::despawn_flagged_units;
pub use health::{update_faction_health, BattleOutcome, FactionHealth, FactionTotals};
pub use melee::{melee_attacks, AttackTimer, MeleeAttack, MeleeProfile};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FactionHealth>();
        app.add_systems(
            FixedUpdate,
            (
                melee_attacks,
                update_faction_health.run_if(faction_health_due),
            )
                .chain()
                .in_set(SimSet::Combat),
        );
        app.add_systems(FixedUpdate, despawn_flagged_units.in_set(SimSet::Cleanup));
    }
}
