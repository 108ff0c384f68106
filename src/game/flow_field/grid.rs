use bevy::prelude::*;

/// 8-connected neighbour offsets with their base edge weights, clockwise
/// from north (+Y in grid space, +Z in world space).
pub const NEIGHBORS: [(IVec2, f32); 8] = [
    (IVec2::new(0, 1), 1.0),
    (IVec2::new(1, 1), std::f32::consts::SQRT_2),
    (IVec2::new(1, 0), 1.0),
    (IVec2::new(1, -1), std::f32::consts::SQRT_2),
    (IVec2::new(0, -1), 1.0),
    (IVec2::new(-1, -1), std::f32::consts::SQRT_2),
    (IVec2::new(-1, 0), 1.0),
    (IVec2::new(-1, 1), std::f32::consts::SQRT_2),
];

/// Placement of a dense grid on the XZ plane.
///
/// Cell `(x, y)` covers world X in `[origin.x + x*cell, origin.x + (x+1)*cell)`
/// and world Z likewise for `y`. Cells are stored row-major, `y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub size: IVec2,
    pub cell_size: f32,
    pub origin: Vec3,
}

impl GridGeometry {
    pub fn new(size: IVec2, cell_size: f32, origin: Vec3) -> Self {
        Self { size: size.max(IVec2::ZERO), cell_size, origin }
    }

    pub fn width(&self) -> usize {
        self.size.x as usize
    }

    pub fn height(&self) -> usize {
        self.size.y as usize
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.size.x && cell.y < self.size.y
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    pub fn index(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width() + cell.x as usize
    }

    pub fn cell_of_index(&self, index: usize) -> IVec2 {
        let width = self.width().max(1);
        IVec2::new((index % width) as i32, (index / width) as i32)
    }

    /// Cell containing a world position. May be out of bounds.
    pub fn world_to_cell(&self, world: Vec3) -> IVec2 {
        let local = world - self.origin;
        IVec2::new(
            (local.x / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        )
    }

    /// Index of the cell containing `world`, or `None` outside the grid.
    pub fn index_of_world(&self, world: Vec3) -> Option<usize> {
        let cell = self.world_to_cell(world);
        self.contains(cell).then(|| self.index(cell))
    }

    /// World position of a cell's centre, at the grid's height.
    pub fn cell_center(&self, cell: IVec2) -> Vec3 {
        self.origin
            + Vec3::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                0.0,
                (cell.y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Nearest in-bounds cell.
    pub fn clamp_cell(&self, cell: IVec2) -> IVec2 {
        cell.clamp(IVec2::ZERO, (self.size - IVec2::ONE).max(IVec2::ZERO))
    }

    /// In-bounds neighbours of `cell` with their base edge weights.
    pub fn neighbors(&self, cell: IVec2) -> impl Iterator<Item = (IVec2, f32)> + '_ {
        NEIGHBORS
            .iter()
            .map(move |&(offset, weight)| (cell + offset, weight))
            .filter(|(n, _)| self.contains(*n))
    }
}
