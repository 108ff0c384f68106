use bevy::prelude::*;
use skirmish_macros::profile;

use crate::game::chunk_index::ChunkIndex;
use crate::game::flow_field::{FlowFieldSettings, FlowFields};
use crate::game::math::{lift, planar};
use crate::game::simulation::SimClock;
use crate::game::unit::{FlagForCleanup, MoverMode, MoverState, TargetData, Unit, UnitMover};

use super::steering::{base_direction, blend_avoidance, brake, separation_term, steer, turn_toward};

/// Advance every unit with a target by one tick.
///
/// Seeking units follow their faction's published field (or head straight
/// for the target where the field has nothing), push away from nearby
/// allies and accelerate toward the result. Units within engagement
/// distance brake while turning to face the target. Units without a target
/// are not moved.
///
/// Separation applies to seeking units only. Arrived units hold the spot
/// they reached and are not pushed apart by allies engaging the same
/// target.
#[profile(2)]
pub fn move_units(
    clock: Res<SimClock>,
    settings: Option<Res<FlowFieldSettings>>,
    fields: Res<FlowFields>,
    index: Res<ChunkIndex>,
    mut units: Query<
        (Entity, &Unit, &UnitMover, &TargetData, &mut Transform, &mut MoverState),
        Without<FlagForCleanup>,
    >,
) {
    let Some(settings) = settings else {
        return;
    };
    let dt = clock.delta;
    if dt <= 0.0 {
        return;
    }
    let avoidance_radius = settings.unit_avoidance_radius;
    let avoidance_strength = settings.unit_avoidance_strength;
    let fields = &*fields;
    let index = &*index;

    units
        .par_iter_mut()
        .for_each(|(entity, unit, mover, target, mut transform, mut state)| {
            if !target.has_target {
                if state.mode != MoverMode::Idle {
                    state.mode = MoverMode::Idle;
                    state.velocity = Vec2::ZERO;
                }
                return;
            }

            let position = transform.translation;
            let to_target = planar(target.target_position - position);
            let distance = position.distance(target.target_position);

            let heading = if distance <= mover.min_distance_to_target {
                state.mode = MoverMode::Arrived;
                state.velocity = brake(state.velocity, mover.deceleration * dt);
                to_target
            } else {
                state.mode = MoverMode::Seeking;

                let sample = fields
                    .get(unit.faction)
                    .map_or(Vec2::ZERO, |field| field.sample_bilinear(position));
                let mut direction = base_direction(sample, to_target);

                if avoidance_radius > 0.0 && avoidance_strength > 0.0 {
                    let here = planar(position);
                    let mut push = Vec2::ZERO;
                    index.for_each_within(position, avoidance_radius, |other| {
                        if other.entity != entity && other.faction == unit.faction {
                            push += separation_term(here, planar(other.position), avoidance_radius);
                        }
                    });
                    direction = blend_avoidance(direction, push, avoidance_strength);
                }

                let desired = direction * mover.move_speed;
                state.velocity = steer(state.velocity, desired, mover.acceleration * dt)
                    .clamp_length_max(mover.move_speed);
                if state.velocity == Vec2::ZERO { direction } else { state.velocity }
            };

            if state.velocity != Vec2::ZERO {
                transform.translation += lift(state.velocity * dt, 0.0);
            }
            transform.rotation = turn_toward(transform.rotation, heading, mover.rotation_speed, dt);
        });
}
