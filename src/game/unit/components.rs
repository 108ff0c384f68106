use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The two sides of the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Faction {
    #[default]
    Friendly,
    Hostile,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Friendly, Faction::Hostile];

    pub fn opponent(self) -> Faction {
        match self {
            Faction::Friendly => Faction::Hostile,
            Faction::Hostile => Faction::Friendly,
        }
    }
}

/// Marks an entity as a combat unit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Unit {
    pub faction: Faction,
    /// Faction this unit hunts. Normally `faction.opponent()`.
    pub target_faction: Faction,
    pub id: u32,
}

impl Unit {
    pub fn new(faction: Faction, id: u32) -> Self {
        Self {
            faction,
            target_faction: faction.opponent(),
            id,
        }
    }
}

/// Hit points of a unit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub is_dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max, is_dead: false }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0 && !self.is_dead
    }
}

/// Set on units that died this tick. Flagged units are ignored by every
/// phase and despawned during cleanup.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FlagForCleanup;

/// Coarse chunk the unit occupies, used by target acquisition.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkCoord {
    pub current: IVec2,
    /// Value from the previous tick, kept for change detection.
    pub previous: IVec2,
}

/// Result of target acquisition for one unit.
///
/// `target` is a weak reference: the entity may have been despawned since the
/// last acquisition cycle, so readers must check it still exists.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TargetData {
    pub target: Option<Entity>,
    /// Position of the target when it was last acquired.
    pub target_position: Vec3,
    pub has_target: bool,
    pub in_range: bool,
}

impl TargetData {
    pub fn acquire(&mut self, target: Entity, position: Vec3) {
        self.target = Some(target);
        self.target_position = position;
        self.has_target = true;
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.has_target = false;
        self.in_range = false;
    }
}

/// Movement tunables of a unit.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitMover {
    pub move_speed: f32,
    /// Turn rate fed to the orientation slerp, per second.
    pub rotation_speed: f32,
    /// Distance at which the unit stops and engages.
    pub min_distance_to_target: f32,
    pub acceleration: f32,
    pub deceleration: f32,
}

impl Default for UnitMover {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 8.0,
            min_distance_to_target: 1.5,
            acceleration: 20.0,
            deceleration: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoverMode {
    /// No target, the unit is left alone.
    #[default]
    Idle,
    /// Following the flow field toward the nearest enemy.
    Seeking,
    /// Within engagement distance, braking.
    Arrived,
}

/// Per-unit integration state written by the movement phase.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MoverState {
    /// Planar velocity (x = world X, y = world Z).
    pub velocity: Vec2,
    pub mode: MoverMode,
}
