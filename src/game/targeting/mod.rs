//! Nearest-enemy target acquisition over the chunk index.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::chunk_index::DEFAULT_CHUNK_SIZE;
use crate::game::simulation::{targeting_due, SimSet};

mod search;
pub mod systems;

pub use search::find_target;
pub use systems::{acquire_targets, validate_targets};

/// Target acquisition tunables.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFindingConfig {
    /// Chunk edge length in world units. Also sizes the chunk index.
    pub chunk_size: f32,
    /// How many rings of chunks to search around the unit's own chunk.
    pub max_chunk_search_radius: i32,
    /// World distance cap for ring candidates. Zero or negative disables it.
    pub max_search_range: f32,
}

impl Default for TargetFindingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_search_radius: 3,
            max_search_range: 0.0,
        }
    }
}

pub struct TargetingPlugin;

impl Plugin for TargetingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                acquire_targets.run_if(targeting_due),
                validate_targets,
            )
                .chain()
                .in_set(SimSet::Targeting),
        );
    }
}
