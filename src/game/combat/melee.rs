use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_macros::profile;

use crate::game::chunk_index::ChunkIndex;
use crate::game::simulation::SimClock;
use crate::game::unit::{FlagForCleanup, Health, Unit};

/// Close-range strike against the nearest enemy around an attack point.
#[derive(Component, Debug, Clone, Copy)]
pub struct MeleeAttack {
    pub damage: f32,
    pub attack_radius: f32,
    /// Offset from the unit in its local space (+Z is forward).
    pub attack_point: Vec3,
}

/// When the unit last struck, in simulated seconds.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttackTimer {
    pub last_attack_time: f64,
    pub attack_cooldown: f32,
}

impl AttackTimer {
    pub fn new(attack_cooldown: f32) -> Self {
        Self { last_attack_time: 0.0, attack_cooldown }
    }

    pub fn is_ready(&self, now: f64) -> bool {
        now - self.last_attack_time >= self.attack_cooldown as f64
    }
}

/// Melee tunables of a unit archetype, as written in config files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeProfile {
    pub damage: f32,
    pub attack_radius: f32,
    pub attack_interval: f32,
    pub attack_point: Vec3,
}

impl Default for MeleeProfile {
    fn default() -> Self {
        Self {
            damage: 25.0,
            attack_radius: 2.0,
            attack_interval: 1.5,
            attack_point: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

impl MeleeProfile {
    pub fn components(&self) -> (MeleeAttack, AttackTimer) {
        (
            MeleeAttack {
                damage: self.damage,
                attack_radius: self.attack_radius,
                attack_point: self.attack_point,
            },
            AttackTimer::new(self.attack_interval),
        )
    }
}

/// Resolve melee strikes for every attacker whose cooldown has elapsed.
///
/// Candidates come from the chunk index, so positions are those at the
/// start of the tick. One hit per attacker per cooldown; the victim is
/// flagged for cleanup when its health reaches zero. Units killed earlier
/// in the same pass neither strike nor get struck again.
#[profile(2)]
pub fn melee_attacks(
    mut commands: Commands,
    clock: Res<SimClock>,
    index: Res<ChunkIndex>,
    mut attackers: Query<
        (Entity, &Unit, &Transform, &MeleeAttack, &mut AttackTimer),
        Without<FlagForCleanup>,
    >,
    mut healths: Query<&mut Health, (With<Unit>, Without<FlagForCleanup>)>,
) {
    let now = clock.elapsed;

    for (entity, unit, transform, attack, mut timer) in attackers.iter_mut() {
        if !timer.is_ready(now) {
            continue;
        }
        if !healths.get(entity).is_ok_and(|health| health.is_alive()) {
            continue;
        }

        let attack_point = transform.translation + transform.rotation * attack.attack_point;
        let mut victim: Option<(f32, Entity)> = None;
        index.for_each_within(attack_point, attack.attack_radius, |other| {
            if other.faction != unit.target_faction {
                return;
            }
            let dist_sq = attack_point.distance_squared(other.position);
            if victim.map_or(true, |(closest, _)| dist_sq < closest)
                && healths.get(other.entity).is_ok_and(|health| health.is_alive())
            {
                victim = Some((dist_sq, other.entity));
            }
        });

        let Some((_, victim)) = victim else {
            continue;
        };
        let Ok(mut health) = healths.get_mut(victim) else {
            continue;
        };

        health.current -= attack.damage;
        timer.last_attack_time = now;

        if health.current <= 0.0 {
            health.current = 0.0;
            health.is_dead = true;
            commands.entity(victim).insert(FlagForCleanup);
            debug!("Unit {:?} killed by {:?}", victim, entity);
        }
    }
}
