use std::sync::Arc;

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use crate::game::unit::Faction;

use super::grid::GridGeometry;

/// Summary numbers of a published field, used for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowFieldStats {
    /// Open cells with a cost below the ceiling.
    pub reached_cells: usize,
    pub target_cells: usize,
    pub obstacle_cells: usize,
    /// Highest cost among reached cells.
    pub max_reached_cost: f32,
}

/// Immutable per-faction field.
///
/// The three buffers are parallel and indexed `y * width + x`. A snapshot is
/// only ever shared through an `Arc`, so a reader holding one keeps seeing a
/// consistent grid even after a newer snapshot is published.
#[derive(Debug)]
pub struct FlowFieldSnapshot {
    pub faction: Faction,
    pub geometry: GridGeometry,
    directions: Vec<Vec2>,
    costs: Vec<f32>,
    obstacles: FixedBitSet,
    max_cost: f32,
    generation: u64,
    stats: FlowFieldStats,
}

impl FlowFieldSnapshot {
    pub fn new(
        faction: Faction,
        geometry: GridGeometry,
        directions: Vec<Vec2>,
        costs: Vec<f32>,
        obstacles: FixedBitSet,
        max_cost: f32,
    ) -> Self {
        let cell_count = geometry.cell_count();
        debug_assert_eq!(directions.len(), cell_count, "direction buffer does not match grid");
        debug_assert_eq!(costs.len(), cell_count, "cost buffer does not match grid");
        debug_assert_eq!(obstacles.len(), cell_count, "obstacle buffer does not match grid");

        let mut stats = FlowFieldStats::default();
        for (index, &cost) in costs.iter().enumerate() {
            if obstacles.contains(index) {
                stats.obstacle_cells += 1;
            } else if cost < max_cost {
                stats.reached_cells += 1;
                stats.max_reached_cost = stats.max_reached_cost.max(cost);
                if cost == 0.0 {
                    stats.target_cells += 1;
                }
            }
        }

        Self {
            faction,
            geometry,
            directions,
            costs,
            obstacles,
            max_cost,
            generation: 0,
            stats,
        }
    }

    pub fn directions(&self) -> &[Vec2] {
        &self.directions
    }

    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    pub fn obstacles(&self) -> &FixedBitSet {
        &self.obstacles
    }

    pub fn max_cost(&self) -> f32 {
        self.max_cost
    }

    /// Publish order of this snapshot; 0 until published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> FlowFieldStats {
        self.stats
    }

    pub fn direction_at(&self, cell: IVec2) -> Option<Vec2> {
        self.geometry
            .contains(cell)
            .then(|| self.directions[self.geometry.index(cell)])
    }

    pub fn cost_at(&self, cell: IVec2) -> Option<f32> {
        self.geometry
            .contains(cell)
            .then(|| self.costs[self.geometry.index(cell)])
    }

    pub fn is_obstacle(&self, cell: IVec2) -> bool {
        self.geometry.contains(cell) && self.obstacles.contains(self.geometry.index(cell))
    }

    pub fn is_target(&self, cell: IVec2) -> bool {
        self.cost_at(cell) == Some(0.0)
    }

    /// Bilinearly interpolated direction at a world position.
    ///
    /// Sample points sit at cell centres, so sampling exactly at a centre
    /// returns that cell's direction. Corners outside the grid read the
    /// nearest in-bounds cell; if all four are outside the result is zero.
    /// The blend is not renormalised.
    pub fn sample_bilinear(&self, world: Vec3) -> Vec2 {
        let geometry = &self.geometry;
        if geometry.cell_count() == 0 || geometry.cell_size <= 0.0 {
            return Vec2::ZERO;
        }

        let local = world - geometry.origin;
        let gx = local.x / geometry.cell_size - 0.5;
        let gy = local.z / geometry.cell_size - 0.5;
        const LIMIT: f32 = (i32::MAX / 2) as f32;
        if !(gx.abs() < LIMIT && gy.abs() < LIMIT) {
            return Vec2::ZERO;
        }

        let x0 = gx.floor();
        let y0 = gy.floor();
        let fx = gx - x0;
        let fy = gy - y0;
        let base = IVec2::new(x0 as i32, y0 as i32);

        let corners = [
            base,
            base + IVec2::X,
            base + IVec2::Y,
            base + IVec2::ONE,
        ];
        if corners.iter().all(|&c| !geometry.contains(c)) {
            return Vec2::ZERO;
        }

        let read = |cell: IVec2| self.directions[geometry.index(geometry.clamp_cell(cell))];
        let bottom = read(corners[0]).lerp(read(corners[1]), fx);
        let top = read(corners[2]).lerp(read(corners[3]), fx);
        bottom.lerp(top, fy)
    }
}

/// Published fields, one per faction.
///
/// Written only by the flow-field phase; every other phase reads it. A
/// reader that needs the field across a publish clones the `Arc`.
#[derive(Resource, Debug, Default)]
pub struct FlowFields {
    snapshots: Vec<Arc<FlowFieldSnapshot>>,
    generation: u64,
}

impl FlowFields {
    /// Replace the faction's snapshot, or add it if the faction has none yet.
    ///
    /// The previous snapshot is dropped here unless a reader still holds a
    /// handle to it. Returns the generation assigned to the new snapshot.
    pub fn publish(&mut self, mut snapshot: FlowFieldSnapshot) -> u64 {
        self.generation += 1;
        snapshot.generation = self.generation;
        let faction = snapshot.faction;
        let snapshot = Arc::new(snapshot);

        match self.snapshots.iter_mut().find(|s| s.faction == faction) {
            Some(slot) => *slot = snapshot,
            None => self.snapshots.push(snapshot),
        }
        self.generation
    }

    pub fn get(&self, faction: Faction) -> Option<&Arc<FlowFieldSnapshot>> {
        self.snapshots.iter().find(|s| s.faction == faction)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Generation of the most recent publish across all factions.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
