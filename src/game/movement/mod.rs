//! Per-unit steering and integration.

use bevy::prelude::*;

use crate::game::simulation::SimSet;

pub mod steering;
pub mod systems;

pub use systems::move_units;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, move_units.in_set(SimSet::Movement));
    }
}
