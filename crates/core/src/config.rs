//! Simulation configuration
//!
//! A flat, serde-deserializable record read once when a simulation is built
//! and treated as immutable for the rest of the run. Field names serialize in
//! `camelCase` so preset and override documents stay compact.
//!
//! Configuration is resolved in three layers: [`SimulationConfig::default`],
//! an optional named preset, then JSON overrides. Each layer is merged as a
//! JSON object so a layer only needs to name the fields it changes.

use crate::core_types::{BurnIndexThresholds, PerVegetation, TerrainType, Vegetation};
use crate::error::{Result, SimError};
use crate::grid::Zone;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Parameters of the yearly succession step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuccessionConfig {
    /// Age (years) a stage must exceed before it can mature
    pub min_age: PerVegetation<u32>,
    /// Chance a mature cell advances in one year
    pub base_probability: f64,
    /// Chance when a neighbour already holds the next stage or a later one
    pub boosted_probability: f64,
    /// Two fires within this many years arrest deciduous to coniferous...
    pub double_burn_window: f64,
    /// ...for this many years after the later fire
    pub double_burn_lockout: f64,
    /// Three fires within this many years arrest shrub to deciduous...
    pub triple_burn_window: f64,
    /// ...for this many years after the latest fire
    pub triple_burn_lockout: f64,
    /// Years a burnt cell waits after a low or medium intensity fire
    pub low_intensity_recovery_years: u32,
    /// Chance the recovered cell restarts as grass, by vegetation before the fire
    pub low_intensity_grass_probability: PerVegetation<f64>,
    /// Years a burnt cell waits after a high intensity fire
    pub high_intensity_recovery_years: u32,
    /// Chance the recovered cell restarts as grass after a high intensity fire
    pub high_intensity_grass_probability: f64,
    /// Carbon gained per year while unburnt (kg/m²)
    pub carbon_accumulation_rate: PerVegetation<f64>,
    /// Maximum stored carbon (kg/m²)
    pub carbon_cap: PerVegetation<f64>,
}

impl Default for SuccessionConfig {
    fn default() -> Self {
        Self {
            min_age: PerVegetation::new(3, 3, 40, 0),
            base_probability: 0.1,
            boosted_probability: 0.3,
            double_burn_window: 30.0,
            double_burn_lockout: 150.0,
            triple_burn_window: 30.0,
            triple_burn_lockout: 30.0,
            low_intensity_recovery_years: 1,
            low_intensity_grass_probability: PerVegetation::new(1.0, 0.5, 0.3, 0.2),
            high_intensity_recovery_years: 3,
            high_intensity_grass_probability: 0.8,
            carbon_accumulation_rate: PerVegetation::new(0.068, 0.09, 0.09, 0.021),
            carbon_cap: PerVegetation::new(0.068, 0.8, 6.9, 8.1),
        }
    }
}

/// Complete configuration of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Model extent east-west (ft)
    pub model_width: f64,
    /// Model extent north-south (ft)
    pub model_height: f64,
    /// Number of cell columns; cell size and row count are derived
    pub grid_width: usize,

    /// Sparks queued when terrain is loaded, in model feet
    pub sparks: Vec<[f64; 2]>,
    /// Sparks allowed per fire event
    pub max_sparks: usize,

    /// Initial wind speed (mph)
    pub wind_speed: f64,
    /// Initial wind direction (degrees, 0 = northern wind)
    pub wind_direction: f64,
    /// Band of speeds (mph) a new fire event draws its wind from
    pub fire_event_wind_speed: [f64; 2],
    /// Change the wind once the active fire has lasted this many days
    pub change_wind_on_day: Option<u32>,
    /// Direction after the change; random when unset
    pub new_wind_direction: Option<f64>,
    /// Speed after the change; random up to 20 mph when unset
    pub new_wind_speed: Option<f64>,
    /// Multiplier applied to mid-fire wind change speeds
    pub wind_scale_factor: f64,

    pub zones: Vec<Zone>,
    /// Zone index matrix, upsampled to the grid (nearest)
    pub zone_index: Option<Vec<Vec<usize>>>,
    /// Elevation matrix in feet, upsampled to the grid (bilinear)
    pub elevation: Option<Vec<Vec<f64>>>,
    /// River mask matrix (non-zero = river), upsampled to the grid (nearest)
    pub river_data: Option<Vec<Vec<u8>>>,
    /// Unburnt island ids (0 = none), upsampled to the grid (nearest)
    pub unburnt_islands: Option<Vec<Vec<u32>>>,
    /// Chance each distinct island id is active for the run
    pub unburnt_island_probability: f64,
    /// Flatten and block the outermost cell rings
    pub fill_terrain_edges: bool,

    /// Shortest time (minutes) a cell burns after ignition delay
    pub min_cell_burn_time: f64,
    /// Burn time (minutes) before spread shortens it
    pub max_cell_burn_time: f64,
    /// Fire neighbour search radius (cells)
    pub neighbors_dist: f64,
    /// Chance a low intensity cell survives its fire
    pub fire_survival_probability: f64,
    pub burn_index_thresholds: PerVegetation<BurnIndexThresholds>,

    /// Real seconds one simulated day lasts while fire is active
    pub model_day_in_seconds: f64,
    /// Largest single fire tick (minutes)
    pub max_time_step: f64,
    /// Fixed fire engine step (minutes)
    pub fire_time_step: f64,
    /// Real seconds the full regrowth run should take
    pub regrowth_run_in_seconds: f64,
    pub simulation_end_year: u32,
    /// Drought ramp `[start, end]` applied to every zone over the run
    pub climate_change: Option<[f64; 2]>,

    /// Take a regrowth snapshot every N simulated years
    pub snapshot_interval: u32,
    /// Yearly statistics closer than this are treated as identical; negative
    /// values turn buffer sharing off
    pub snapshot_stats_tolerance: f64,

    /// Time (minutes) a fire line needs to be built while fire is active
    pub fire_line_build_minutes: f64,
    /// Radius (ft) covered by one helitack drop
    pub helitack_drop_radius: f64,

    pub succession: SuccessionConfig,

    /// Seed for the shared random source; OS entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            model_width: 120_000.0,
            model_height: 80_000.0,
            grid_width: 240,
            sparks: Vec::new(),
            max_sparks: 20,
            wind_speed: 0.0,
            wind_direction: 0.0,
            fire_event_wind_speed: [0.0, 20.0],
            change_wind_on_day: None,
            new_wind_direction: None,
            new_wind_speed: None,
            wind_scale_factor: 1.0,
            zones: vec![
                Zone {
                    vegetation: Vegetation::Grass,
                    terrain_type: TerrainType::Plains,
                    drought_level: 1.0,
                },
                Zone {
                    vegetation: Vegetation::Shrub,
                    terrain_type: TerrainType::Foothills,
                    drought_level: 1.0,
                },
            ],
            zone_index: Some(vec![vec![0, 1]]),
            elevation: None,
            river_data: None,
            unburnt_islands: None,
            unburnt_island_probability: 0.5,
            fill_terrain_edges: true,
            min_cell_burn_time: 200.0,
            max_cell_burn_time: 500.0,
            neighbors_dist: 2.5,
            fire_survival_probability: 0.3,
            burn_index_thresholds: PerVegetation::new(
                BurnIndexThresholds::new(10.0, 50.0),
                BurnIndexThresholds::new(10.0, 50.0),
                BurnIndexThresholds::new(5.0, 25.0),
                BurnIndexThresholds::new(5.0, 25.0),
            ),
            model_day_in_seconds: 8.0,
            max_time_step: 180.0,
            fire_time_step: 60.0,
            regrowth_run_in_seconds: 60.0,
            simulation_end_year: 200,
            climate_change: None,
            snapshot_interval: 1,
            snapshot_stats_tolerance: 1e-9,
            fire_line_build_minutes: 480.0,
            helitack_drop_radius: 2_640.0,
            succession: SuccessionConfig::default(),
            rng_seed: None,
        }
    }
}

/// Names accepted by [`SimulationConfig::preset`]
pub const PRESET_NAMES: [&str; 8] = [
    "basic",
    "basicWithWind",
    "slope45deg",
    "basicWithSlopeAndWind",
    "default",
    "mildDrought",
    "severeDrought",
    "grass",
];

fn preset_overrides(name: &str) -> Option<Value> {
    let flat_test_terrain = json!({
        "modelWidth": 100000.0,
        "modelHeight": 100000.0,
        "gridWidth": 100,
        "sparks": [[50000.0, 50000.0]],
        "zoneIndex": [[0, 1]],
        "elevation": [[0.0]],
        "riverData": null,
        "fillTerrainEdges": false,
    });
    let two_zones = |vegetation: &str| {
        json!({
            "zones": [
                { "terrainType": "foothills", "vegetation": vegetation },
                { "terrainType": "foothills", "vegetation": vegetation },
            ],
        })
    };

    let value = match name {
        "basic" => flat_test_terrain,
        "basicWithWind" => merged(
            flat_test_terrain,
            json!({ "windSpeed": 1.0, "windDirection": 0.0 }),
        ),
        "slope45deg" => merged(
            flat_test_terrain,
            json!({ "elevation": [[100000.0, 0.0], [100000.0, 0.0]] }),
        ),
        "basicWithSlopeAndWind" => merged(
            flat_test_terrain,
            json!({
                "windSpeed": 1.0,
                "windDirection": 0.0,
                "elevation": [[10000.0, 0.0], [10000.0, 0.0]],
            }),
        ),
        "default" => two_zones("coniferousForest"),
        "mildDrought" => merged(
            two_zones("coniferousForest"),
            json!({ "climateChange": [1.0, 3.0] }),
        ),
        "severeDrought" => merged(
            two_zones("coniferousForest"),
            json!({ "climateChange": [3.0, 3.0] }),
        ),
        "grass" => two_zones("grass"),
        _ => return None,
    };
    Some(value)
}

/// Recursively merge `overlay` into `base`; objects merge key by key, any
/// other value replaces
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn merged(mut base: Value, overlay: Value) -> Value {
    merge_json(&mut base, overlay);
    base
}

fn check_probability(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("{value} is not a probability")))
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("{value} must be positive")))
    }
}

fn check_drought(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=crate::core_types::MAX_DROUGHT_LEVEL).contains(&value) {
        Ok(())
    } else {
        Err(SimError::invalid(field, format!("drought level {value} outside 0..=3")))
    }
}

impl SimulationConfig {
    /// Default configuration with a named preset applied
    ///
    /// # Errors
    /// Returns [`SimError::UnknownPreset`] for names not in [`PRESET_NAMES`].
    pub fn preset(name: &str) -> Result<Self> {
        let overrides =
            preset_overrides(name).ok_or_else(|| SimError::UnknownPreset(name.to_string()))?;
        Self::default().merged_with(overrides)
    }

    /// Apply a JSON object of overrides on top of this configuration
    ///
    /// # Errors
    /// Returns [`SimError::ConfigParse`] when the document is not valid JSON
    /// or a field has the wrong type.
    pub fn with_overrides(&self, overrides_json: &str) -> Result<Self> {
        let overlay: Value = serde_json::from_str(overrides_json)?;
        self.merged_with(overlay)
    }

    fn merged_with(&self, overlay: Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, overlay);
        Ok(serde_json::from_value(base)?)
    }

    /// Cell edge length (ft)
    pub fn cell_size(&self) -> f64 {
        self.model_width / self.grid_width as f64
    }

    /// Number of cell rows
    pub fn grid_height(&self) -> usize {
        (self.model_height / self.cell_size()).ceil() as usize
    }

    /// Check every field the simulation depends on
    ///
    /// # Errors
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_positive("modelWidth", self.model_width)?;
        check_positive("modelHeight", self.model_height)?;
        if self.grid_width == 0 {
            return Err(SimError::invalid("gridWidth", "must be at least 1"));
        }
        if self.zones.is_empty() {
            return Err(SimError::invalid("zones", "at least one zone is required"));
        }
        for zone in &self.zones {
            check_drought("zones", zone.drought_level)?;
        }
        if self.sparks.len() > self.max_sparks {
            return Err(SimError::invalid(
                "sparks",
                format!("{} sparks exceed maxSparks {}", self.sparks.len(), self.max_sparks),
            ));
        }
        let [low, high] = self.fire_event_wind_speed;
        if low < 0.0 || high < low {
            return Err(SimError::invalid(
                "fireEventWindSpeed",
                format!("[{low}, {high}] is not an ascending non-negative range"),
            ));
        }
        check_positive("windScaleFactor", self.wind_scale_factor)?;
        check_probability("unburntIslandProbability", self.unburnt_island_probability)?;
        if self.min_cell_burn_time < 0.0 || self.min_cell_burn_time > self.max_cell_burn_time {
            return Err(SimError::invalid(
                "minCellBurnTime",
                "must be non-negative and not exceed maxCellBurnTime",
            ));
        }
        check_positive("neighborsDist", self.neighbors_dist)?;
        check_probability("fireSurvivalProbability", self.fire_survival_probability)?;
        for vegetation in Vegetation::ALL {
            let thresholds = self.burn_index_thresholds.get(vegetation);
            if thresholds.medium > thresholds.high {
                return Err(SimError::invalid(
                    "burnIndexThresholds",
                    format!("{vegetation:?} medium threshold exceeds high threshold"),
                ));
            }
        }
        check_positive("modelDayInSeconds", self.model_day_in_seconds)?;
        check_positive("maxTimeStep", self.max_time_step)?;
        check_positive("fireTimeStep", self.fire_time_step)?;
        check_positive("regrowthRunInSeconds", self.regrowth_run_in_seconds)?;
        if self.simulation_end_year == 0 {
            return Err(SimError::invalid("simulationEndYear", "must be at least 1"));
        }
        if let Some([start, end]) = self.climate_change {
            check_drought("climateChange", start)?;
            check_drought("climateChange", end)?;
        }
        if self.snapshot_interval == 0 {
            return Err(SimError::invalid("snapshotInterval", "must be at least 1"));
        }
        if self.fire_line_build_minutes < 0.0 {
            return Err(SimError::invalid("fireLineBuildMinutes", "must be non-negative"));
        }
        check_positive("helitackDropRadius", self.helitack_drop_radius)?;

        let succession = &self.succession;
        check_probability("succession.baseProbability", succession.base_probability)?;
        check_probability("succession.boostedProbability", succession.boosted_probability)?;
        check_probability(
            "succession.highIntensityGrassProbability",
            succession.high_intensity_grass_probability,
        )?;
        for vegetation in Vegetation::ALL {
            check_probability(
                "succession.lowIntensityGrassProbability",
                *succession.low_intensity_grass_probability.get(vegetation),
            )?;
            if *succession.carbon_cap.get(vegetation) < 0.0
                || *succession.carbon_accumulation_rate.get(vegetation) < 0.0
            {
                return Err(SimError::invalid(
                    "succession.carbonCap",
                    "carbon values must be non-negative",
                ));
            }
        }
        Ok(())
    }
}
