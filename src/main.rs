use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish::game::combat::{BattleOutcome, FactionHealth};
use skirmish::game::config::InitialConfig;
use skirmish::game::simulation::{SimSet, SimTick};
use skirmish::game::unit::Faction;
use skirmish::game::GamePlugin;

const LOG_PREFIX: &str = "skirmish";
const KEEP_LOGS: usize = 25;

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {e}");
    }

    // Clean up old log files, keeping only the most recent ones
    cleanup_old_logs(&log_dir, KEEP_LOGS);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,bevy_asset=warn,skirmish=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    // Leave room for the file this run is about to create
    let keep = keep_count.saturating_sub(1);
    if log_files.len() > keep {
        for file in log_files.iter().take(log_files.len() - keep) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// Stop once a side is wiped out or the configured tick budget is spent.
fn exit_when_battle_ends(
    health: Res<FactionHealth>,
    tick: Res<SimTick>,
    config: Option<Res<InitialConfig>>,
    mut exit: MessageWriter<AppExit>,
) {
    let max_ticks = config.map_or(0, |c| c.scenario.max_ticks);
    let outcome = health.outcome();
    let out_of_time = max_ticks > 0 && tick.0 >= max_ticks;

    if outcome == BattleOutcome::Ongoing && !out_of_time {
        return;
    }

    match outcome {
        BattleOutcome::Victory(faction) => info!("Battle over after {} ticks: {:?} wins", tick.0, faction),
        BattleOutcome::Stalemate => info!("Battle over after {} ticks: no survivors", tick.0),
        BattleOutcome::Ongoing => info!("Tick limit {} reached with the battle undecided", max_ticks),
    }
    for faction in Faction::ALL {
        let totals = health.totals(faction);
        info!(
            "  {:?}: {} units, {:.0}/{:.0} hp ({:.0}%)",
            faction,
            totals.units,
            totals.current,
            totals.max,
            totals.fraction() * 100.0
        );
    }

    exit.write(AppExit::Success);
}

fn main() {
    let log_file = setup_file_logging();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Skirmish - headless battle, logging to file             ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<46}║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
        )
        .add_plugins(AssetPlugin::default())
        .add_plugins(GamePlugin)
        .add_systems(FixedUpdate, exit_when_battle_ends.after(SimSet::Cleanup))
        .run();
}
