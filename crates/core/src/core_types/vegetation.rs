//! Closed enumerations describing cells and zones

use serde::{Deserialize, Serialize};

/// Vegetation stages in succession order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Vegetation {
    #[default]
    Grass,
    Shrub,
    DeciduousForest,
    ConiferousForest,
}

impl Vegetation {
    pub const ALL: [Vegetation; 4] = [
        Vegetation::Grass,
        Vegetation::Shrub,
        Vegetation::DeciduousForest,
        Vegetation::ConiferousForest,
    ];

    /// Position in the succession chain
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage this vegetation matures into, if any
    pub fn next_stage(self) -> Option<Vegetation> {
        match self {
            Vegetation::Grass => Some(Vegetation::Shrub),
            Vegetation::Shrub => Some(Vegetation::DeciduousForest),
            Vegetation::DeciduousForest => Some(Vegetation::ConiferousForest),
            Vegetation::ConiferousForest => None,
        }
    }
}

/// Coarse landform of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerrainType {
    #[default]
    Plains,
    Foothills,
    Mountains,
}

/// Named drought levels. Zones store drought as a continuous value in
/// `0.0..=MAX_DROUGHT_LEVEL` so climate ramps can interpolate between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DroughtLevel {
    NoDrought,
    MildDrought,
    MediumDrought,
    SevereDrought,
}

/// Highest drought level the moisture table covers
pub const MAX_DROUGHT_LEVEL: f64 = 3.0;

impl DroughtLevel {
    pub fn value(self) -> f64 {
        match self {
            DroughtLevel::NoDrought => 0.0,
            DroughtLevel::MildDrought => 1.0,
            DroughtLevel::MediumDrought => 2.0,
            DroughtLevel::SevereDrought => 3.0,
        }
    }
}

/// Fire state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FireState {
    #[default]
    Unburnt,
    Burning,
    Burnt,
    Survived,
}

/// Fire intensity class derived from spread rate and vegetation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BurnIndex {
    Low,
    Medium,
    High,
}

/// Spread-rate limits (ft/min) separating the burn index classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnIndexThresholds {
    /// Rates below this are `Low`
    pub medium: f64,
    /// Rates at or above this are `High`
    pub high: f64,
}

impl BurnIndexThresholds {
    pub const fn new(medium: f64, high: f64) -> Self {
        Self { medium, high }
    }

    pub fn classify(&self, spread_rate: f64) -> BurnIndex {
        if spread_rate < self.medium {
            BurnIndex::Low
        } else if spread_rate < self.high {
            BurnIndex::Medium
        } else {
            BurnIndex::High
        }
    }
}

/// One value per vegetation type
///
/// Used for every per-vegetation table so configuration files name the
/// stage explicitly instead of relying on array order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerVegetation<T> {
    pub grass: T,
    pub shrub: T,
    pub deciduous_forest: T,
    pub coniferous_forest: T,
}

impl<T> PerVegetation<T> {
    pub const fn new(grass: T, shrub: T, deciduous_forest: T, coniferous_forest: T) -> Self {
        Self {
            grass,
            shrub,
            deciduous_forest,
            coniferous_forest,
        }
    }

    #[inline]
    pub fn get(&self, vegetation: Vegetation) -> &T {
        match vegetation {
            Vegetation::Grass => &self.grass,
            Vegetation::Shrub => &self.shrub,
            Vegetation::DeciduousForest => &self.deciduous_forest,
            Vegetation::ConiferousForest => &self.coniferous_forest,
        }
    }
}

impl<T: Copy> PerVegetation<T> {
    pub const fn splat(value: T) -> Self {
        Self::new(value, value, value, value)
    }
}
