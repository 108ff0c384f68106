use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::combat::MeleeProfile;
use crate::game::flow_field::FlowFieldSettings;
use crate::game::scenario::ScenarioConfig;
use crate::game::simulation::{PhaseCadences, SimClock};
use crate::game::targeting::TargetFindingConfig;
use crate::game::unit::{Faction, UnitMover};

pub const DEFAULT_INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";
pub const FLOW_FIELD_TUNING_ASSET: &str = "flow_field.tuning.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Stats shared by every spawned unit.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct UnitArchetype {
    pub max_health: f32,
    pub mover: UnitMover,
    pub melee: MeleeProfile,
}

impl Default for UnitArchetype {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            mover: UnitMover::default(),
            melee: MeleeProfile::default(),
        }
    }
}

/// Static configuration loaded once at startup.
///
/// Fields missing from the file keep their defaults, so a config only needs
/// to list what it changes.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    pub tick_rate: f64,
    // Phase cadences in simulated seconds
    pub targeting_interval: f32,
    pub flow_field_interval: f32,
    pub faction_health_interval: f32,

    pub target_finding: TargetFindingConfig,
    pub flow_field: FlowFieldSettings,
    pub unit: UnitArchetype,
    pub scenario: ScenarioConfig,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            targeting_interval: 0.1,
            flow_field_interval: 0.2,
            faction_health_interval: 0.1,
            target_finding: TargetFindingConfig::default(),
            flow_field: FlowFieldSettings::default(),
            unit: UnitArchetype::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

impl InitialConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::Invalid(format!("tick_rate must be positive, got {}", self.tick_rate)));
        }
        for (name, interval) in [
            ("targeting_interval", self.targeting_interval),
            ("flow_field_interval", self.flow_field_interval),
            ("faction_health_interval", self.faction_health_interval),
        ] {
            if !(interval.is_finite() && interval >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be zero or positive, got {interval}")));
            }
        }
        if !(self.target_finding.chunk_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "target_finding.chunk_size must be positive, got {}",
                self.target_finding.chunk_size
            )));
        }
        if self.target_finding.max_chunk_search_radius < 0 {
            return Err(ConfigError::Invalid("target_finding.max_chunk_search_radius must not be negative".into()));
        }
        let multiplier = self.flow_field.neighbor_cost_multiplier;
        if !(multiplier.is_finite() && multiplier >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "flow_field.neighbor_cost_multiplier must be zero or positive, got {multiplier}"
            )));
        }
        if !self.flow_field.is_usable() {
            return Err(ConfigError::Invalid(format!(
                "flow_field grid {:?} with cell size {} and max cost {} cannot be solved",
                self.flow_field.grid_size, self.flow_field.cell_size, self.flow_field.max_cost
            )));
        }
        if !(self.unit.max_health > 0.0) {
            return Err(ConfigError::Invalid("unit.max_health must be positive".into()));
        }
        let mover = &self.unit.mover;
        if mover.move_speed < 0.0 || mover.acceleration < 0.0 || mover.deceleration < 0.0 {
            return Err(ConfigError::Invalid("unit.mover speeds must not be negative".into()));
        }
        Ok(())
    }
}

/// Flow-field tunables that can be edited while the simulation runs.
///
/// Grid geometry is not part of it: resizing the grid mid-battle would
/// invalidate every published field.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct FlowFieldTuning {
    pub neighbor_cost_multiplier: f32,
    pub max_cost_change_per_update: f32,
    pub unit_avoidance_radius: f32,
    pub unit_avoidance_strength: f32,
    pub enable_visualization: bool,
    pub visualized_faction: Faction,
}

impl FlowFieldTuning {
    pub fn apply(&self, settings: &mut FlowFieldSettings) {
        if self.neighbor_cost_multiplier.is_finite() {
            settings.neighbor_cost_multiplier = self.neighbor_cost_multiplier.max(0.0);
        }
        if self.max_cost_change_per_update > 0.0 {
            settings.max_cost_change_per_update = self.max_cost_change_per_update;
        }
        settings.unit_avoidance_radius = self.unit_avoidance_radius.max(0.0);
        settings.unit_avoidance_strength = self.unit_avoidance_strength.max(0.0);
        settings.enable_visualization = self.enable_visualization;
        settings.visualized_faction = self.visualized_faction;
    }
}

#[derive(Resource)]
pub struct FlowFieldTuningHandle(pub Handle<FlowFieldTuning>);

#[derive(Resource, Clone, Debug)]
pub struct InitialConfigPath(pub PathBuf);

/// Loads [`InitialConfig`] at startup and installs the resources derived
/// from it. With `hot_reload` set, the flow-field tuning asset is watched
/// too; that needs `AssetPlugin`.
pub struct ConfigPlugin {
    pub initial_config_path: PathBuf,
    pub hot_reload: bool,
}

impl Default for ConfigPlugin {
    fn default() -> Self {
        Self {
            initial_config_path: PathBuf::from(DEFAULT_INITIAL_CONFIG_PATH),
            hot_reload: true,
        }
    }
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(InitialConfigPath(self.initial_config_path.clone()))
            .add_systems(Startup, (load_initial_config, apply_initial_config).chain());

        if self.hot_reload {
            app.add_plugins(RonAssetPlugin::<FlowFieldTuning>::new(&["tuning.ron"]))
                .add_systems(Startup, setup_flow_field_tuning)
                .add_systems(Update, apply_flow_field_tuning);
        }
    }
}

/// Load static initial configuration synchronously at startup.
///
/// A config inserted before startup (tests, embedders) wins over the file.
/// Any load error is logged and the defaults are used instead.
pub fn load_initial_config(
    mut commands: Commands,
    path: Res<InitialConfigPath>,
    existing: Option<Res<InitialConfig>>,
) {
    if existing.is_some() {
        info!("Using preinstalled initial config");
        return;
    }

    match InitialConfig::load(&path.0) {
        Ok(config) => {
            info!("Loaded initial config from {}", path.0.display());
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("{}", e);
            error!("Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

/// Install the resources every phase reads from the loaded config.
pub fn apply_initial_config(
    mut commands: Commands,
    config: Res<InitialConfig>,
    mut fixed_time: ResMut<Time<Fixed>>,
    mut clock: ResMut<SimClock>,
    mut cadences: ResMut<PhaseCadences>,
) {
    fixed_time.set_timestep_hz(config.tick_rate);
    *clock = SimClock::from_hz(config.tick_rate);
    cadences.targeting.set_interval(config.targeting_interval);
    cadences.flow_field.set_interval(config.flow_field_interval);
    cadences.faction_health.set_interval(config.faction_health_interval);

    commands.insert_resource(config.target_finding);
    commands.insert_resource(config.flow_field.clone());

    info!(
        "Simulation at {} Hz; targeting every {}s, flow field every {}s, grid {}x{} @ {}",
        config.tick_rate,
        config.targeting_interval,
        config.flow_field_interval,
        config.flow_field.grid_size.x,
        config.flow_field.grid_size.y,
        config.flow_field.cell_size,
    );
}

fn setup_flow_field_tuning(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load(FLOW_FIELD_TUNING_ASSET);
    commands.insert_resource(FlowFieldTuningHandle(handle));
}

/// Patch [`FlowFieldSettings`] whenever the tuning asset loads or changes.
/// The next solve cycle picks the new values up.
pub fn apply_flow_field_tuning(
    handle: Option<Res<FlowFieldTuningHandle>>,
    tunings: Res<Assets<FlowFieldTuning>>,
    mut events: MessageReader<AssetEvent<FlowFieldTuning>>,
    settings: Option<ResMut<FlowFieldSettings>>,
) {
    let (Some(handle), Some(mut settings)) = (handle, settings) else {
        events.clear();
        return;
    };

    for event in events.read() {
        if !(event.is_modified(handle.0.id()) || event.is_loaded_with_dependencies(handle.0.id())) {
            continue;
        }
        if let Some(tuning) = tunings.get(&handle.0) {
            tuning.apply(&mut settings);
            info!(
                "Flow field tuning applied: congestion {}, max change {}, avoidance {} x {}",
                settings.neighbor_cost_multiplier,
                settings.max_cost_change_per_update,
                settings.unit_avoidance_radius,
                settings.unit_avoidance_strength,
            );
        }
    }
}
