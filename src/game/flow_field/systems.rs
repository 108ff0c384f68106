use bevy::prelude::*;
use skirmish_macros::profile;

use crate::game::simulation::SimTick;
use crate::game::unit::{Faction, FlagForCleanup, Health, Unit};

use super::cost::{congestion_weights, rasterize_obstacles, CostSolve};
use super::direction::build_directions;
use super::settings::{FlowFieldObstacle, FlowFieldSettings};
use super::snapshot::{FlowFieldSnapshot, FlowFields};

/// Positions of live units, split by faction.
#[derive(Default)]
struct FactionPositions {
    friendly: Vec<Vec3>,
    hostile: Vec<Vec3>,
}

impl FactionPositions {
    fn of(&self, faction: Faction) -> &[Vec3] {
        match faction {
            Faction::Friendly => &self.friendly,
            Faction::Hostile => &self.hostile,
        }
    }

    fn push(&mut self, faction: Faction, position: Vec3) {
        match faction {
            Faction::Friendly => self.friendly.push(position),
            Faction::Hostile => self.hostile.push(position),
        }
    }
}

/// Build a complete snapshot for one faction from live positions.
pub fn solve_faction(
    settings: &FlowFieldSettings,
    faction: Faction,
    same_faction: &[Vec3],
    enemies: &[Vec3],
    obstacle_circles: &[(Vec3, f32)],
) -> FlowFieldSnapshot {
    let geometry = settings.geometry();
    let obstacles = rasterize_obstacles(&geometry, obstacle_circles);
    let weights = congestion_weights(&geometry, same_faction, settings.neighbor_cost_multiplier);

    let mut costs = CostSolve {
        geometry: &geometry,
        obstacles: &obstacles,
        weights: &weights,
        targets: enemies,
        max_cost: settings.max_cost,
        max_cost_change: settings.max_cost_change_per_update,
    }
    .run();

    let directions = build_directions(&geometry, &mut costs, &obstacles, settings.max_cost);
    FlowFieldSnapshot::new(faction, geometry, directions, costs, obstacles, settings.max_cost)
}

/// Recompute and publish both factions' fields.
///
/// Dead and flagged units neither seed targets nor add congestion. The
/// whole phase is skipped while no usable settings are installed.
#[profile(4)]
pub fn update_flow_fields(
    settings: Option<Res<FlowFieldSettings>>,
    mut fields: ResMut<FlowFields>,
    units: Query<(&Unit, &Transform, &Health), Without<FlagForCleanup>>,
    obstacles: Query<(&Transform, &FlowFieldObstacle)>,
    tick: Res<SimTick>,
) {
    let Some(settings) = settings else {
        return;
    };
    if !settings.is_usable() {
        bevy::log::warn_once!("Flow field settings are unusable ({:?}), skipping solve", settings.grid_size);
        return;
    }

    let mut positions = FactionPositions::default();
    for (unit, transform, health) in units.iter() {
        if health.is_alive() {
            positions.push(unit.faction, transform.translation);
        }
    }

    let circles: Vec<(Vec3, f32)> = obstacles
        .iter()
        .map(|(transform, obstacle)| (transform.translation, obstacle.radius))
        .collect();

    for faction in Faction::ALL {
        let snapshot = solve_faction(
            &settings,
            faction,
            positions.of(faction),
            positions.of(faction.opponent()),
            &circles,
        );
        let stats = snapshot.stats();
        let generation = fields.publish(snapshot);

        if settings.enable_visualization && faction == settings.visualized_faction {
            debug!(
                "Flow field {:?} gen {}: {}x{} cells, {} reached, {} targets, {} blocked, max cost {:.1}",
                faction,
                generation,
                settings.grid_size.x,
                settings.grid_size.y,
                stats.reached_cells,
                stats.target_cells,
                stats.obstacle_cells,
                stats.max_reached_cost,
            );
        }
    }

    crate::profile_log!(
        tick,
        "[FLOW] tick {}: {} friendly, {} hostile, generation {}",
        tick.0,
        positions.friendly.len(),
        positions.hostile.len(),
        fields.generation()
    );
}
