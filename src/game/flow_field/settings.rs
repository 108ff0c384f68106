use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::unit::Faction;

use super::grid::GridGeometry;

/// Global flow-field tunables.
///
/// Read once per solve cycle. External tooling (the hot-reloaded tuning
/// asset, scenario auto-fit) may rewrite it between cycles.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowFieldSettings {
    /// Cells along X and Z.
    pub grid_size: IVec2,
    pub cell_size: f32,
    /// World position of the grid's minimum corner.
    pub grid_origin: Vec3,
    /// Initial cost of every cell; a cell still at this value after a solve
    /// is unreachable.
    pub max_cost: f32,
    /// Weight added to a cell and its 8 neighbours per same-faction unit.
    pub neighbor_cost_multiplier: f32,
    /// Largest cost step allowed from one cell to the next during relaxation.
    pub max_cost_change_per_update: f32,
    pub unit_avoidance_radius: f32,
    pub unit_avoidance_strength: f32,
    /// Log a summary line for `visualized_faction` on every publish.
    pub enable_visualization: bool,
    pub visualized_faction: Faction,
}

impl FlowFieldSettings {
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.grid_size, self.cell_size, self.grid_origin)
    }

    /// True when the settings describe a grid the solver can work on.
    pub fn is_usable(&self) -> bool {
        self.grid_size.x > 0
            && self.grid_size.y > 0
            && self.cell_size > 0.0
            && self.max_cost > 0.0
            && self.max_cost_change_per_update > 0.0
            // Edge weights must stay non-negative for the relaxation to terminate
            && self.neighbor_cost_multiplier >= 0.0
    }
}

impl Default for FlowFieldSettings {
    fn default() -> Self {
        Self {
            grid_size: IVec2::new(50, 50),
            cell_size: 2.0,
            grid_origin: Vec3::ZERO,
            max_cost: 1000.0,
            neighbor_cost_multiplier: 2.5,
            max_cost_change_per_update: 10.0,
            unit_avoidance_radius: 2.0,
            unit_avoidance_strength: 0.7,
            enable_visualization: false,
            visualized_faction: Faction::Friendly,
        }
    }
}

/// Circular blocker rasterised into the obstacle mask of every faction's
/// field. Nothing spawns these by default.
#[derive(Component, Debug, Clone, Copy)]
pub struct FlowFieldObstacle {
    pub radius: f32,
}
