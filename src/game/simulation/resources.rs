/// Resource definitions for the simulation clock and phase scheduling.

use bevy::prelude::*;

// ============================================================================
// Clock
// ============================================================================

/// Number of fixed ticks simulated so far.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Simulated time, advanced once per fixed tick.
///
/// Systems read `delta` instead of `Time` so that driving `FixedUpdate`
/// manually (tests, benchmarks) behaves exactly like the real loop.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    pub delta: f32,
    pub elapsed: f64,
}

impl SimClock {
    pub fn from_hz(hz: f64) -> Self {
        Self { delta: (1.0 / hz) as f32, elapsed: 0.0 }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_hz(30.0)
    }
}

// ============================================================================
// Phase Cadences
// ============================================================================

/// Fixed-interval trigger for phases that should not run every tick.
///
/// A cadence fires on the first tick it sees, then whenever `interval`
/// seconds of simulated time have accumulated. An interval of zero fires
/// every tick.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    pub interval: f32,
    elapsed: f32,
    due: bool,
    primed: bool,
}

impl Cadence {
    const SLACK: f32 = 1.0e-5;

    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            elapsed: 0.0,
            due: false,
            primed: false,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.primed {
            self.primed = true;
            self.due = true;
            return;
        }

        self.elapsed += dt;
        self.due = self.elapsed + Self::SLACK >= self.interval;
        if self.due {
            self.elapsed -= self.interval;
            // A long stall should not turn into a burst of catch-up runs.
            if self.elapsed > self.interval {
                self.elapsed = 0.0;
            }
        }
    }

    pub fn is_due(&self) -> bool {
        self.due
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(0.0);
    }
}

/// Cadences of the throttled phases.
///
/// Target acquisition runs faster than the flow-field solve, which is the
/// most expensive phase; movement always runs every tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct PhaseCadences {
    pub targeting: Cadence,
    pub flow_field: Cadence,
    pub faction_health: Cadence,
}

impl PhaseCadences {
    /// Every phase every tick. Handy in tests.
    pub fn every_tick() -> Self {
        Self {
            targeting: Cadence::new(0.0),
            flow_field: Cadence::new(0.0),
            faction_health: Cadence::new(0.0),
        }
    }
}

impl Default for PhaseCadences {
    fn default() -> Self {
        Self {
            targeting: Cadence::new(0.1),
            flow_field: Cadence::new(0.2),
            faction_health: Cadence::new(0.1),
        }
    }
}
