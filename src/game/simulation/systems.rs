/// Clock systems and phase run conditions.

use bevy::prelude::*;

use super::resources::*;

// ============================================================================
// Tick Management
// ============================================================================

/// Increment the global simulation tick counter.
///
/// Runs first in `FixedUpdate` so every later phase sees the current tick
/// for conditional logging.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

/// Advance simulated time and decide which throttled phases run this tick.
pub fn advance_clock(
    mut clock: ResMut<SimClock>,
    mut cadences: ResMut<PhaseCadences>,
    fixed_time: Option<Res<Time<Fixed>>>,
) {
    if let Some(fixed_time) = fixed_time {
        let step = fixed_time.timestep().as_secs_f32();
        if step > 0.0 {
            clock.delta = step;
        }
    }
    let dt = clock.delta;
    clock.elapsed += dt as f64;

    cadences.targeting.advance(dt);
    cadences.flow_field.advance(dt);
    cadences.faction_health.advance(dt);
}

// ============================================================================
// Run Conditions
// ============================================================================

pub fn targeting_due(cadences: Res<PhaseCadences>) -> bool {
    cadences.targeting.is_due()
}

pub fn flow_field_due(cadences: Res<PhaseCadences>) -> bool {
    cadences.flow_field.is_due()
}

pub fn faction_health_due(cadences: Res<PhaseCadences>) -> bool {
    cadences.faction_health.is_due()
}
