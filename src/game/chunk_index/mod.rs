use bevy::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::game::simulation::SimSet;
use crate::game::unit::Faction;

pub mod systems;
#[cfg(test)]
mod tests;

pub use systems::{rebuild_chunk_index, update_chunk_coords};

/// Default chunk edge length in world units.
pub const DEFAULT_CHUNK_SIZE: f32 = 20.0;

/// One unit as recorded in the index at rebuild time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkOccupant {
    pub entity: Entity,
    pub faction: Faction,
    /// World position when the index was rebuilt.
    pub position: Vec3,
}

type Bucket = SmallVec<[ChunkOccupant; 8]>;

/// Coarse multi-map from chunk coordinate to the units inside it.
///
/// A chunk is `chunk_size` world units square on the XZ plane, keyed by
/// `floor(position.xz / chunk_size)`. The index has no removal API: it is
/// cleared and refilled from live units every tick, so it is never stale
/// by more than one tick.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use skirmish::game::chunk_index::{ChunkIndex, ChunkOccupant};
/// use skirmish::game::unit::Faction;
///
/// let mut index = ChunkIndex::new(10.0);
/// let position = Vec3::new(25.0, 0.0, -3.0);
/// index.insert(ChunkOccupant { entity: Entity::PLACEHOLDER, faction: Faction::Hostile, position });
///
/// assert_eq!(index.chunk_of(position), IVec2::new(2, -1));
/// assert_eq!(index.occupants(IVec2::new(2, -1)).len(), 1);
/// assert!(index.occupants(IVec2::new(0, 0)).is_empty());
/// ```
#[derive(Resource, Debug)]
pub struct ChunkIndex {
    chunk_size: f32,
    chunks: FxHashMap<IVec2, Bucket>,
    total: usize,
}

impl Default for ChunkIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkIndex {
    pub fn new(chunk_size: f32) -> Self {
        Self {
            chunk_size: sanitize_chunk_size(chunk_size),
            chunks: FxHashMap::default(),
            total: 0,
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Clear and switch to a new chunk size.
    pub fn reset(&mut self, chunk_size: f32) {
        self.chunk_size = sanitize_chunk_size(chunk_size);
        self.clear();
    }

    /// Remove every occupant.
    ///
    /// Buckets that held occupants keep their allocation for the next fill;
    /// buckets already empty are dropped so the map only tracks chunks
    /// touched in the last two rebuilds.
    pub fn clear(&mut self) {
        self.chunks.retain(|_, bucket| {
            let occupied = !bucket.is_empty();
            bucket.clear();
            occupied
        });
        self.total = 0;
    }

    pub fn chunk_of(&self, position: Vec3) -> IVec2 {
        chunk_coord(position, self.chunk_size)
    }

    pub fn insert(&mut self, occupant: ChunkOccupant) {
        let chunk = self.chunk_of(occupant.position);
        self.chunks.entry(chunk).or_default().push(occupant);
        self.total += 1;
    }

    /// Occupants of a chunk in insertion order. Empty for unknown chunks.
    pub fn occupants(&self, chunk: IVec2) -> &[ChunkOccupant] {
        self.chunks.get(&chunk).map(|bucket| bucket.as_slice()).unwrap_or(&[])
    }

    /// Visit every occupant whose planar distance to `center` is at most
    /// `radius`, scanning only the chunks the circle overlaps.
    pub fn for_each_within(&self, center: Vec3, radius: f32, mut f: impl FnMut(&ChunkOccupant)) {
        if radius < 0.0 || !radius.is_finite() {
            return;
        }
        let reach = Vec3::new(radius, 0.0, radius);
        let min = self.chunk_of(center - reach);
        let max = self.chunk_of(center + reach);
        let radius_sq = radius * radius;

        for y in min.y..=max.y {
            for x in min.x..=max.x {
                for occupant in self.occupants(IVec2::new(x, y)) {
                    let dx = occupant.position.x - center.x;
                    let dz = occupant.position.z - center.z;
                    if dx * dx + dz * dz <= radius_sq {
                        f(occupant);
                    }
                }
            }
        }
    }

    pub fn total_entries(&self) -> usize {
        self.total
    }

    pub fn non_empty_chunks(&self) -> usize {
        self.chunks.values().filter(|b| !b.is_empty()).count()
    }
}

/// `floor(position.xz / chunk_size)`.
pub fn chunk_coord(position: Vec3, chunk_size: f32) -> IVec2 {
    IVec2::new(
        (position.x / chunk_size).floor() as i32,
        (position.z / chunk_size).floor() as i32,
    )
}

fn sanitize_chunk_size(chunk_size: f32) -> f32 {
    if chunk_size.is_finite() && chunk_size > 0.0 {
        chunk_size
    } else {
        DEFAULT_CHUNK_SIZE
    }
}

pub struct ChunkIndexPlugin;

impl Plugin for ChunkIndexPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChunkIndex>();
        app.add_systems(
            FixedUpdate,
            (update_chunk_coords, rebuild_chunk_index)
                .chain()
                .in_set(SimSet::Spatial),
        );
    }
}
