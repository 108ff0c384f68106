use bevy::prelude::*;

pub mod chunk_index;
pub mod combat;
pub mod config;
pub mod flow_field;
pub mod math;
pub mod movement;
pub mod scenario;
pub mod simulation;
pub mod targeting;
pub mod unit;

use chunk_index::ChunkIndexPlugin;
use combat::CombatPlugin;
use config::ConfigPlugin;
use flow_field::FlowFieldPlugin;
use movement::MovementPlugin;
use scenario::ScenarioPlugin;
use simulation::SimulationPlugin;
use targeting::TargetingPlugin;

/// The fixed-tick battle simulation without config loading or spawning.
///
/// Callers install [`flow_field::FlowFieldSettings`] and
/// [`targeting::TargetFindingConfig`] themselves; until they do, the
/// pathfinding pipeline is skipped.
pub struct SimulationCorePlugin;

impl Plugin for SimulationCorePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SimulationPlugin,
            ChunkIndexPlugin,
            TargetingPlugin,
            FlowFieldPlugin,
            MovementPlugin,
            CombatPlugin,
        ));
    }
}

/// Full game: simulation, config from disk and the opening scenario.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SimulationCorePlugin,
            ConfigPlugin::default(),
            ScenarioPlugin,
        ));
    }
}
