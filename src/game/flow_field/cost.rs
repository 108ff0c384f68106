//! Wavefront cost propagation.

use std::collections::VecDeque;

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use super::grid::GridGeometry;

/// Per-cell traversal multiplier from same-faction crowding.
///
/// Every cell starts at 1.0. Each unit adds `multiplier` to its own cell and
/// the 8 cells around it, so overlapping neighbourhoods stack. A negative
/// or non-finite multiplier counts as zero.
pub fn congestion_weights(
    geometry: &GridGeometry,
    same_faction: &[Vec3],
    multiplier: f32,
) -> Vec<f32> {
    let multiplier = if multiplier.is_finite() { multiplier.max(0.0) } else { 0.0 };
    let mut weights = vec![1.0; geometry.cell_count()];
    for &position in same_faction {
        let center = geometry.world_to_cell(position);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = center + IVec2::new(dx, dy);
                if geometry.contains(cell) {
                    weights[geometry.index(cell)] += multiplier;
                }
            }
        }
    }
    weights
}

/// Inputs of one faction's cost solve.
pub struct CostSolve<'a> {
    pub geometry: &'a GridGeometry,
    pub obstacles: &'a FixedBitSet,
    pub weights: &'a [f32],
    /// Positions of the units this faction is heading toward.
    pub targets: &'a [Vec3],
    pub max_cost: f32,
    pub max_cost_change: f32,
}

impl CostSolve<'_> {
    /// Relax costs outward from every target cell.
    ///
    /// Cells start at `max_cost`; target cells are seeded at zero. The queue
    /// is FIFO and a neighbour is re-enqueued whenever its cost strictly
    /// improves, so the pass converges even though it is not a priority
    /// queue. Each step is capped at `max_cost_change` above the dequeued
    /// cell's cost. Obstacle cells are never seeded or relaxed and keep
    /// `max_cost`.
    pub fn run(&self) -> Vec<f32> {
        let geometry = self.geometry;
        let cell_count = geometry.cell_count();
        debug_assert_eq!(self.weights.len(), cell_count, "congestion weights do not match grid");
        debug_assert_eq!(self.obstacles.len(), cell_count, "obstacle mask does not match grid");

        let mut costs = vec![self.max_cost; cell_count];
        let mut queue = VecDeque::with_capacity(self.targets.len());

        for &position in self.targets {
            let cell = geometry.world_to_cell(position);
            if !geometry.contains(cell) {
                continue;
            }
            let index = geometry.index(cell);
            if self.obstacles.contains(index) || costs[index] == 0.0 {
                continue;
            }
            costs[index] = 0.0;
            queue.push_back(cell);
        }

        while let Some(current) = queue.pop_front() {
            let current_cost = costs[geometry.index(current)];

            for (neighbor, edge) in geometry.neighbors(current) {
                let n_idx = geometry.index(neighbor);
                if self.obstacles.contains(n_idx) {
                    continue;
                }

                let calculated = current_cost + edge * self.weights[n_idx];
                let limited = if calculated >= current_cost {
                    calculated.min(current_cost + self.max_cost_change)
                } else {
                    calculated.max(current_cost - self.max_cost_change)
                };

                if limited < costs[n_idx] {
                    costs[n_idx] = limited;
                    queue.push_back(neighbor);
                }
            }
        }

        costs
    }
}

/// Rasterise circular blockers into an obstacle mask.
///
/// A cell is blocked when its centre lies inside a circle.
pub fn rasterize_obstacles(geometry: &GridGeometry, circles: &[(Vec3, f32)]) -> FixedBitSet {
    let mut mask = FixedBitSet::with_capacity(geometry.cell_count());
    if geometry.cell_count() == 0 || geometry.cell_size <= 0.0 {
        return mask;
    }

    for &(center, radius) in circles {
        if radius <= 0.0 {
            continue;
        }
        let reach = Vec3::new(radius, 0.0, radius);
        let min = geometry.clamp_cell(geometry.world_to_cell(center - reach));
        let max = geometry.clamp_cell(geometry.world_to_cell(center + reach));
        let radius_sq = radius * radius;

        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let cell = IVec2::new(x, y);
                let cell_center = geometry.cell_center(cell);
                let dx = cell_center.x - center.x;
                let dz = cell_center.z - center.z;
                if dx * dx + dz * dz <= radius_sq {
                    mask.insert(geometry.index(cell));
                }
            }
        }
    }
    mask
}
