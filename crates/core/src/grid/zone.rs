//! Zone descriptors shared by many cells

use crate::core_types::{DroughtLevel, TerrainType, Vegetation};
use serde::{Deserialize, Serialize};

/// Read-mostly descriptor referenced by index from every cell in the zone
///
/// Only `drought_level` changes during a run (climate ramps); the zone set is
/// replaced wholesale on terrain reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Zone {
    pub vegetation: Vegetation,
    pub terrain_type: TerrainType,
    /// Continuous drought level in `0.0..=3.0`
    pub drought_level: f64,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            vegetation: Vegetation::Grass,
            terrain_type: TerrainType::Plains,
            drought_level: DroughtLevel::MildDrought.value(),
        }
    }
}

impl Zone {
    pub fn new(vegetation: Vegetation, terrain_type: TerrainType, drought: DroughtLevel) -> Self {
        Self {
            vegetation,
            terrain_type,
            drought_level: drought.value(),
        }
    }
}
