//! Tick-time measurements at increasing army sizes.
//!
//! Ignored by default; run in release:
//! ```text
//! cargo test --release --test performance_scaling -- --ignored --nocapture
//! ```

use std::time::{Duration, Instant};

use bevy::prelude::*;
use skirmish::game::combat::{AttackTimer, MeleeAttack};
use skirmish::game::flow_field::FlowFieldSettings;
use skirmish::game::simulation::PhaseCadences;
use skirmish::game::targeting::TargetFindingConfig;
use skirmish::game::unit::{unit_bundle, Faction, UnitMover};
use skirmish::game::SimulationCorePlugin;

const WARMUP_TICKS: usize = 10;
const MEASURED_TICKS: usize = 100;

struct Scale {
    units_per_side: usize,
    /// Average tick budget at 30 Hz with headroom for rendering.
    budget: Duration,
}

fn scaled_app(units_per_side: usize, rng: &mut fastrand::Rng) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationCorePlugin);
    app.insert_resource(TargetFindingConfig::default());
    // Worst case: every throttled phase runs every tick.
    app.insert_resource(PhaseCadences::every_tick());

    let half_extent = ((units_per_side as f32).sqrt() * 2.0).max(20.0);
    app.insert_resource(FlowFieldSettings {
        grid_size: IVec2::splat(100),
        cell_size: half_extent * 4.0 / 100.0,
        grid_origin: Vec3::new(-half_extent * 2.0, 0.0, -half_extent * 2.0),
        ..default()
    });

    for (faction, center_x) in [(Faction::Friendly, -half_extent), (Faction::Hostile, half_extent)] {
        for id in 0..units_per_side {
            let position = Vec3::new(
                center_x + rng.f32() * half_extent - half_extent * 0.5,
                0.0,
                rng.f32() * half_extent * 2.0 - half_extent,
            );
            app.world_mut().spawn((
                unit_bundle(faction, id as u32, position, 100.0, UnitMover::default()),
                MeleeAttack { damage: 10.0, attack_radius: 2.0, attack_point: Vec3::Z },
                AttackTimer::new(1.0),
            ));
        }
    }
    app
}

fn measure(scale: &Scale) -> Duration {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut app = scaled_app(scale.units_per_side, &mut rng);

    for _ in 0..WARMUP_TICKS {
        app.world_mut().run_schedule(FixedUpdate);
    }

    let start = Instant::now();
    for _ in 0..MEASURED_TICKS {
        app.world_mut().run_schedule(FixedUpdate);
    }
    start.elapsed() / MEASURED_TICKS as u32
}

#[test]
#[ignore]
fn tick_time_scales_with_army_size() {
    let scales = [
        Scale { units_per_side: 100, budget: Duration::from_millis(2) },
        Scale { units_per_side: 1_000, budget: Duration::from_millis(8) },
        Scale { units_per_side: 5_000, budget: Duration::from_millis(25) },
    ];

    println!("\n{:>10} | {:>12} | {:>10}", "units", "avg tick", "budget");
    println!("{:-<10}-+-{:-<12}-+-{:-<10}", "", "", "");

    let mut failures = Vec::new();
    for scale in &scales {
        let avg = measure(scale);
        println!(
            "{:>10} | {:>9.3} ms | {:>7} ms",
            scale.units_per_side * 2,
            avg.as_secs_f64() * 1000.0,
            scale.budget.as_millis()
        );
        if avg > scale.budget {
            failures.push(scale.units_per_side * 2);
        }
    }

    assert!(failures.is_empty(), "over budget at unit counts {failures:?}");
}
