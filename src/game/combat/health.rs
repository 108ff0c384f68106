use bevy::prelude::*;

use crate::game::unit::{Faction, FlagForCleanup, Health, Unit};

/// Health sums of one faction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactionTotals {
    pub current: f32,
    /// Captured on the first refresh that sees any units.
    pub max: f32,
    pub units: usize,
}

impl FactionTotals {
    /// Remaining health as a fraction of the starting total, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BattleOutcome {
    #[default]
    Ongoing,
    Victory(Faction),
    /// Both sides were wiped out in the same refresh.
    Stalemate,
}

/// Per-faction health totals over live units.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionHealth {
    pub friendly: FactionTotals,
    pub hostile: FactionTotals,
    initialized: bool,
    outcome: BattleOutcome,
}

impl FactionHealth {
    pub fn totals(&self, faction: Faction) -> &FactionTotals {
        match faction {
            Faction::Friendly => &self.friendly,
            Faction::Hostile => &self.hostile,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    fn decide(&self) -> BattleOutcome {
        if !self.initialized {
            return BattleOutcome::Ongoing;
        }
        match (self.friendly.units, self.hostile.units) {
            (0, 0) => BattleOutcome::Stalemate,
            (_, 0) => BattleOutcome::Victory(Faction::Friendly),
            (0, _) => BattleOutcome::Victory(Faction::Hostile),
            _ => BattleOutcome::Ongoing,
        }
    }
}

/// Recompute the per-faction sums and the battle outcome.
pub fn update_faction_health(
    mut faction_health: ResMut<FactionHealth>,
    units: Query<(&Unit, &Health), Without<FlagForCleanup>>,
) {
    let mut friendly = FactionTotals::default();
    let mut hostile = FactionTotals::default();

    for (unit, health) in units.iter() {
        if !health.is_alive() {
            continue;
        }
        let totals = match unit.faction {
            Faction::Friendly => &mut friendly,
            Faction::Hostile => &mut hostile,
        };
        totals.current += health.current;
        totals.max += health.max;
        totals.units += 1;
    }

    if faction_health.initialized {
        friendly.max = faction_health.friendly.max;
        hostile.max = faction_health.hostile.max;
    } else if friendly.units + hostile.units > 0 {
        faction_health.initialized = true;
        info!(
            "Battle started: {} friendly ({:.0} hp) vs {} hostile ({:.0} hp)",
            friendly.units, friendly.max, hostile.units, hostile.max
        );
    }

    faction_health.friendly = friendly;
    faction_health.hostile = hostile;

    let outcome = faction_health.decide();
    if outcome != faction_health.outcome {
        match outcome {
            BattleOutcome::Victory(faction) => info!(
                "{:?} victory with {} units left ({:.0}% health)",
                faction,
                faction_health.totals(faction).units,
                faction_health.totals(faction).fraction() * 100.0
            ),
            BattleOutcome::Stalemate => info!("Both factions eliminated"),
            BattleOutcome::Ongoing => {}
        }
        faction_health.outcome = outcome;
    }
}
