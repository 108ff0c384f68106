/// Simulation layer: fixed-tick clock and phase ordering.
///
/// Every gameplay plugin registers its systems into one of the [`SimSet`]
/// phases below. The phases are chained, so a phase always observes the
/// complete output of the previous one within the same tick.

use bevy::prelude::*;

pub mod resources;
pub mod systems;

pub use resources::*;
pub use systems::{faction_health_due, flow_field_due, targeting_due};

/// Default fixed tick rate.
pub const DEFAULT_TICK_RATE: f64 = 30.0;

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SimSet {
    Clock,      // Tick counter, simulated time, phase cadences
    Spatial,    // Chunk coordinates and chunk index rebuild
    Targeting,  // Nearest-enemy acquisition and validation
    FlowField,  // Cost solve, direction build, publish
    Movement,   // Steering and integration
    Combat,     // Melee and faction health
    Cleanup,    // Despawn dead units
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(DEFAULT_TICK_RATE));

        app.init_resource::<SimTick>();
        app.insert_resource(SimClock::from_hz(DEFAULT_TICK_RATE));
        app.init_resource::<PhaseCadences>();

        app.configure_sets(FixedUpdate, (
            SimSet::Clock,
            SimSet::Spatial,
            SimSet::Targeting,
            SimSet::FlowField,
            SimSet::Movement,
            SimSet::Combat,
            SimSet::Cleanup,
        ).chain());

        app.add_systems(FixedUpdate, (
            systems::increment_sim_tick,
            systems::advance_clock,
        ).chain().in_set(SimSet::Clock));
    }
}
