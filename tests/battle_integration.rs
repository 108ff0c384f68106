use bevy::prelude::*;
use skirmish::game::combat::{AttackTimer, BattleOutcome, FactionHealth, MeleeAttack};
use skirmish::game::config::InitialConfig;
use skirmish::game::flow_field::{FlowFieldSettings, FlowFields};
use skirmish::game::scenario::ScenarioPlugin;
use skirmish::game::simulation::SimTick;
use skirmish::game::targeting::TargetFindingConfig;
use skirmish::game::unit::{unit_bundle, Faction, Health, Unit, UnitMover};
use skirmish::game::SimulationCorePlugin;

/// 30 Hz for two simulated minutes
const MAX_TICKS: usize = 30 * 120;

fn battle_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationCorePlugin);
    app.insert_resource(TargetFindingConfig::default());
    app.insert_resource(FlowFieldSettings {
        grid_size: IVec2::new(30, 30),
        cell_size: 1.0,
        grid_origin: Vec3::new(-15.0, 0.0, -15.0),
        ..default()
    });
    app
}

fn spawn_line(app: &mut App, faction: Faction, x: f32, count: usize, health: f32) -> Vec<Entity> {
    let facing = if x < 0.0 { Vec2::X } else { Vec2::NEG_X };
    (0..count)
        .map(|i| {
            let position = Vec3::new(x, 0.0, i as f32 * 2.0 - count as f32);
            let rotation = Quat::from_rotation_y(facing.x.atan2(facing.y));
            app.world_mut()
                .spawn((
                    unit_bundle(faction, i as u32, position, health, UnitMover::default()),
                    MeleeAttack { damage: 25.0, attack_radius: 2.0, attack_point: Vec3::Z },
                    AttackTimer::new(0.5),
                ))
                .insert(Transform::from_translation(position).with_rotation(rotation))
                .id()
        })
        .collect()
}

/// Step until the battle is decided. Returns the number of ticks taken.
fn run_until_decided(app: &mut App) -> Option<usize> {
    for tick in 0..MAX_TICKS {
        app.world_mut().run_schedule(FixedUpdate);
        if app.world().resource::<FactionHealth>().outcome() != BattleOutcome::Ongoing {
            return Some(tick + 1);
        }
    }
    None
}

fn alive_units(app: &mut App, faction: Faction) -> usize {
    let mut query = app.world_mut().query::<(&Unit, &Health)>();
    query
        .iter(app.world())
        .filter(|(unit, health)| unit.faction == faction && health.is_alive())
        .count()
}

#[test]
fn stronger_army_wins_and_losers_are_despawned() {
    let mut app = battle_app();
    spawn_line(&mut app, Faction::Friendly, -5.0, 3, 400.0);
    let hostiles = spawn_line(&mut app, Faction::Hostile, 5.0, 3, 50.0);

    let ticks = run_until_decided(&mut app).expect("battle should be decided");
    // One more tick lets cleanup catch any kill from the deciding tick.
    app.world_mut().run_schedule(FixedUpdate);

    assert_eq!(
        app.world().resource::<FactionHealth>().outcome(),
        BattleOutcome::Victory(Faction::Friendly),
        "decided after {ticks} ticks"
    );
    for entity in hostiles {
        assert!(app.world().get_entity(entity).is_err(), "dead hostile {entity:?} still exists");
    }
    assert_eq!(alive_units(&mut app, Faction::Friendly), 3);
    assert_eq!(alive_units(&mut app, Faction::Hostile), 0);

    let totals = *app.world().resource::<FactionHealth>().totals(Faction::Friendly);
    assert_eq!(totals.units, 3);
    assert_eq!(totals.max, 1200.0);
    assert!(totals.fraction() > 0.5 && totals.fraction() <= 1.0);
}

#[test]
fn armies_close_the_gap_through_the_flow_field() {
    let mut app = battle_app();
    let friendly = spawn_line(&mut app, Faction::Friendly, -10.0, 2, 100.0);
    spawn_line(&mut app, Faction::Hostile, 10.0, 2, 100.0);

    for _ in 0..15 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    let fields = app.world().resource::<FlowFields>();
    assert!(fields.get(Faction::Friendly).is_some());
    assert!(fields.get(Faction::Hostile).is_some());

    for entity in friendly {
        let x = app.world().get::<Transform>(entity).unwrap().translation.x;
        assert!(x > -10.0 + 0.5, "friendly unit should have advanced, x = {x}");
    }
}

#[test]
fn identical_battles_end_identically() {
    fn run() -> (usize, Vec<(u32, Faction, Vec3, f32)>) {
        let mut app = battle_app();
        spawn_line(&mut app, Faction::Friendly, -6.0, 4, 150.0);
        spawn_line(&mut app, Faction::Hostile, 6.0, 4, 100.0);
        let ticks = run_until_decided(&mut app).unwrap_or(MAX_TICKS);

        let mut query = app.world_mut().query::<(&Unit, &Transform, &Health)>();
        let mut survivors: Vec<_> = query
            .iter(app.world())
            .map(|(unit, transform, health)| (unit.id, unit.faction, transform.translation, health.current))
            .collect();
        survivors.sort_by_key(|(id, faction, _, _)| (*faction as u8, *id));
        (ticks, survivors)
    }

    let (ticks_a, survivors_a) = run();
    let (ticks_b, survivors_b) = run();

    assert_eq!(ticks_a, ticks_b);
    assert_eq!(survivors_a, survivors_b);
}

#[test]
fn nothing_moves_without_flow_field_settings() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationCorePlugin);
    let friendly = spawn_line(&mut app, Faction::Friendly, -5.0, 1, 100.0)[0];
    spawn_line(&mut app, Faction::Hostile, 5.0, 1, 100.0);

    for _ in 0..30 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    assert_eq!(app.world().resource::<SimTick>().0, 30);
    assert!(app.world().resource::<FlowFields>().is_empty());
    let position = app.world().get::<Transform>(friendly).unwrap().translation;
    assert_eq!(position.x, -5.0);
}

#[test]
fn scenario_spawns_configured_armies() {
    let mut app = battle_app();
    let mut config = InitialConfig::default();
    config.scenario.friendly.count = 7;
    config.scenario.hostile.count = 12;
    app.insert_resource(config);
    app.add_plugins(ScenarioPlugin);

    // Startup only; the first update has no fixed time to consume.
    app.update();

    assert_eq!(alive_units(&mut app, Faction::Friendly), 7);
    assert_eq!(alive_units(&mut app, Faction::Hostile), 12);

    let settings = app.world().resource::<FlowFieldSettings>();
    let geometry = settings.geometry();
    let mut query = app.world_mut().query_filtered::<&Transform, With<Unit>>();
    for transform in query.iter(app.world()) {
        let cell = geometry.world_to_cell(transform.translation);
        assert!(geometry.contains(cell), "unit at {:?} outside fitted grid", transform.translation);
    }
}
