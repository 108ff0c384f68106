use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use super::grid::GridGeometry;

/// Steepest-descent direction for every cell of a solved cost field.
///
/// Each open, non-target cell points at its strictly cheapest 8-neighbour
/// (first found wins on ties, scanning rows bottom-up). Obstacle cells,
/// target cells (cost 0) and local minima get a zero vector. Obstacle costs
/// are forced to `max_cost`.
pub fn build_directions(
    geometry: &GridGeometry,
    costs: &mut [f32],
    obstacles: &FixedBitSet,
    max_cost: f32,
) -> Vec<Vec2> {
    debug_assert_eq!(costs.len(), geometry.cell_count(), "cost field does not match grid");

    let mut directions = vec![Vec2::ZERO; geometry.cell_count()];

    for y in 0..geometry.size.y {
        for x in 0..geometry.size.x {
            let cell = IVec2::new(x, y);
            let index = geometry.index(cell);

            if obstacles.contains(index) {
                costs[index] = max_cost;
                continue;
            }

            let current = costs[index];
            if current == 0.0 {
                continue;
            }

            let mut lowest = current;
            let mut best = IVec2::ZERO;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let neighbor = cell + IVec2::new(dx, dy);
                    if !geometry.contains(neighbor) {
                        continue;
                    }
                    let cost = costs[geometry.index(neighbor)];
                    if cost < lowest {
                        lowest = cost;
                        best = IVec2::new(dx, dy);
                    }
                }
            }

            if best != IVec2::ZERO {
                directions[index] = best.as_vec2().normalize();
            }
        }
    }

    directions
}
