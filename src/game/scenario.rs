//! Opening armies and grid auto-fit.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::config::{apply_initial_config, InitialConfig, UnitArchetype};
use crate::game::flow_field::FlowFieldSettings;
use crate::game::math::{heading_rotation, planar};
use crate::game::unit::{unit_bundle, Faction};

/// One army's opening formation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmyConfig {
    pub center: Vec3,
    pub count: usize,
    pub spacing: f32,
}

impl Default for ArmyConfig {
    fn default() -> Self {
        Self { center: Vec3::ZERO, count: 40, spacing: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seed of the formation jitter.
    pub seed: u64,
    pub friendly: ArmyConfig,
    pub hostile: ArmyConfig,
    /// Resize the flow-field grid around both armies at spawn time.
    pub auto_fit_grid: bool,
    /// Extra world units added to the armies' extent before fitting.
    pub grid_padding: f32,
    /// Cells along the longer side of the fitted grid.
    pub grid_target_cells: u32,
    /// Headless runs stop after this many ticks. Zero means no limit.
    pub max_ticks: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            friendly: ArmyConfig { center: Vec3::new(-30.0, 0.0, 0.0), ..default() },
            hostile: ArmyConfig { center: Vec3::new(30.0, 0.0, 0.0), ..default() },
            auto_fit_grid: true,
            grid_padding: 20.0,
            grid_target_cells: 100,
            max_ticks: 18_000,
        }
    }
}

/// Centre unit plus concentric rings of `6 * ring` units.
///
/// Rings are `0.8 * spacing` apart. Each ring starts at a random angle and
/// every unit's radius is jittered by up to 30% of `spacing`, which breaks
/// up the grid look of a perfect hex packing.
pub fn organic_formation(center: Vec3, count: usize, spacing: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(count);
    if count == 0 {
        return positions;
    }
    positions.push(center);

    let spacing = spacing.max(0.0);
    let base_radius = spacing * 0.8;
    let jitter = spacing * 0.3;
    let mut ring = 0usize;

    while positions.len() < count {
        ring += 1;
        let ring_radius = base_radius * ring as f32;
        let in_ring = (6 * ring).min(count - positions.len());
        let angle_offset = rng.random_range(0.0..TAU);

        for i in 0..in_ring {
            let angle = TAU * i as f32 / in_ring as f32 + angle_offset;
            let variation = if jitter > 0.0 { rng.random_range(-jitter..jitter) } else { 0.0 };
            let radius = ring_radius + variation;
            positions.push(center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius));
        }
    }

    positions
}

/// Grid placement covering a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFit {
    pub grid_size: IVec2,
    pub cell_size: f32,
    pub origin: Vec3,
}

impl GridFit {
    pub fn apply(&self, settings: &mut FlowFieldSettings) {
        settings.grid_size = self.grid_size;
        settings.cell_size = self.cell_size;
        settings.grid_origin = self.origin;
    }
}

/// Size a grid to the bounds of `positions`.
///
/// The padded extent is split into `target_cell_count` cells along its
/// longer side, with cells at least 1 unit wide and the grid at least 10x10.
/// The grid is centred on the bounds, at height 0.
pub fn fit_grid_to_positions(positions: &[Vec3], padding: f32, target_cell_count: u32) -> Option<GridFit> {
    let first = planar(*positions.first()?);
    let (min, max) = positions
        .iter()
        .map(|&p| planar(p))
        .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

    let padded = (max - min) + Vec2::splat(padding.max(0.0));
    let cell_size = (padded.max_element() / target_cell_count.max(1) as f32).max(1.0);
    let grid_size = IVec2::new(
        ((padded.x / cell_size).ceil() as i32).max(10),
        ((padded.y / cell_size).ceil() as i32).max(10),
    );
    let center = (min + max) * 0.5;
    let half_extent = grid_size.as_vec2() * cell_size * 0.5;

    Some(GridFit {
        grid_size,
        cell_size,
        origin: Vec3::new(center.x - half_extent.x, 0.0, center.y - half_extent.y),
    })
}

/// Spawn both armies described by the loaded config.
pub fn spawn_scenario(
    mut commands: Commands,
    config: Option<Res<InitialConfig>>,
    settings: Option<ResMut<FlowFieldSettings>>,
) {
    let Some(config) = config else {
        warn!("No initial config, skipping scenario spawn");
        return;
    };
    let scenario = &config.scenario;
    let mut rng = StdRng::seed_from_u64(scenario.seed);

    let friendly = organic_formation(
        scenario.friendly.center,
        scenario.friendly.count,
        scenario.friendly.spacing,
        &mut rng,
    );
    let hostile = organic_formation(
        scenario.hostile.center,
        scenario.hostile.count,
        scenario.hostile.spacing,
        &mut rng,
    );

    let mut next_id = 0u32;
    for (faction, positions, facing) in [
        (Faction::Friendly, &friendly, scenario.hostile.center),
        (Faction::Hostile, &hostile, scenario.friendly.center),
    ] {
        for &position in positions {
            spawn_unit(&mut commands, &config.unit, faction, next_id, position, facing);
            next_id += 1;
        }
    }

    if scenario.auto_fit_grid {
        let all: Vec<Vec3> = friendly.iter().chain(hostile.iter()).copied().collect();
        match (settings, fit_grid_to_positions(&all, scenario.grid_padding, scenario.grid_target_cells)) {
            (Some(mut settings), Some(fit)) => {
                fit.apply(&mut settings);
                info!(
                    "Flow field grid fitted to armies: {}x{} cells of {:.2}, origin {:?}",
                    fit.grid_size.x, fit.grid_size.y, fit.cell_size, fit.origin
                );
            }
            (None, _) => warn!("Grid auto-fit requested but no flow field settings are installed"),
            (_, None) => {}
        }
    }

    info!("Spawned {} friendly and {} hostile units", friendly.len(), hostile.len());
}

fn spawn_unit(
    commands: &mut Commands,
    archetype: &UnitArchetype,
    faction: Faction,
    id: u32,
    position: Vec3,
    facing: Vec3,
) {
    let (attack, timer) = archetype.melee.components();
    let mut entity = commands.spawn((
        unit_bundle(faction, id, position, archetype.max_health, archetype.mover),
        attack,
        timer,
    ));
    if let Some(rotation) = heading_rotation(planar(facing - position)) {
        entity.insert(Transform::from_translation(position).with_rotation(rotation));
    }
}

pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_scenario.after(apply_initial_config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formation_places_center_then_rings() {
        let mut rng = StdRng::seed_from_u64(1);
        let center = Vec3::new(10.0, 0.0, -4.0);
        let positions = organic_formation(center, 1 + 6 + 12 + 3, 2.0, &mut rng);

        assert_eq!(positions.len(), 22);
        assert_eq!(positions[0], center);
        for (i, p) in positions.iter().enumerate().skip(1) {
            let ring = if i <= 6 { 1.0 } else if i <= 18 { 2.0 } else { 3.0 };
            let r = planar(*p - center).length();
            let expected = 1.6 * ring;
            assert!((r - expected).abs() <= 0.6 + 1.0e-4, "unit {i} at radius {r}, ring {ring}");
            assert_eq!(p.y, center.y);
        }
    }

    #[test]
    fn formation_is_reproducible_from_seed() {
        let a = organic_formation(Vec3::ZERO, 30, 1.5, &mut StdRng::seed_from_u64(42));
        let b = organic_formation(Vec3::ZERO, 30, 1.5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn formation_handles_zero_spacing_and_count() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(organic_formation(Vec3::ZERO, 0, 2.0, &mut rng).is_empty());
        let stacked = organic_formation(Vec3::ONE, 5, 0.0, &mut rng);
        assert!(stacked.iter().all(|p| *p == Vec3::ONE));
    }

    #[test]
    fn grid_fit_covers_positions() {
        let positions = [Vec3::new(-40.0, 0.0, -5.0), Vec3::new(40.0, 3.0, 5.0)];
        let fit = fit_grid_to_positions(&positions, 20.0, 100).unwrap();

        assert_eq!(fit.cell_size, 1.0);
        assert_eq!(fit.grid_size, IVec2::new(100, 30));
        assert_eq!(fit.origin, Vec3::new(-50.0, 0.0, -15.0));

        let mut settings = FlowFieldSettings::default();
        fit.apply(&mut settings);
        let geometry = settings.geometry();
        for p in positions {
            assert!(geometry.index_of_world(p).is_some(), "{p:?} is outside the fitted grid");
        }
    }

    #[test]
    fn grid_fit_enforces_minimum_size() {
        let fit = fit_grid_to_positions(&[Vec3::new(5.0, 0.0, 5.0)], 0.0, 100).unwrap();
        assert_eq!(fit.grid_size, IVec2::new(10, 10));
        assert_eq!(fit.cell_size, 1.0);
        assert!(fit_grid_to_positions(&[], 20.0, 100).is_none());
    }

    #[test]
    fn large_extent_grows_cells() {
        let positions = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(380.0, 0.0, 0.0)];
        let fit = fit_grid_to_positions(&positions, 20.0, 100).unwrap();
        assert_eq!(fit.cell_size, 4.0);
        assert_eq!(fit.grid_size, IVec2::new(100, 10));
    }
}
