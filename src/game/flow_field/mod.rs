//! Per-faction flow fields.
//!
//! Each solve cycle builds, for both factions, a cost field that grows
//! outward from enemy-occupied cells, derives a steepest-descent direction
//! per cell and publishes the pair as an immutable [`FlowFieldSnapshot`].
//!
//! - **settings**: global tunables and the obstacle hook
//! - **grid**: grid placement and neighbour tables
//! - **cost**: congestion weights, obstacle rasterisation, wavefront solve
//! - **direction**: steepest-descent direction field
//! - **snapshot**: immutable snapshot, sampling, per-faction publisher
//! - **systems**: the solve-and-publish system

use bevy::prelude::*;

use crate::game::simulation::{flow_field_due, SimSet};

pub mod cost;
pub mod direction;
pub mod grid;
pub mod settings;
pub mod snapshot;
pub mod systems;


pub use grid::GridGeometry;
pub use settings::{FlowFieldObstacle, FlowFieldSettings};
pub use snapshot::{FlowFieldSnapshot, FlowFieldStats, FlowFields};
pub use systems::{solve_faction, update_flow_fields};

pub struct FlowFieldPlugin;

impl Plugin for FlowFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlowFields>();
        app.add_systems(
            FixedUpdate,
            update_flow_fields
                .in_set(SimSet::FlowField)
                .run_if(flow_field_due),
        );
    }
}
