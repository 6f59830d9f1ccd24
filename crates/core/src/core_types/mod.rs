//! Core types and utilities

pub mod rng;
pub mod time;
pub mod vegetation;
pub mod wind;

pub use rng::SimRng;
pub use time::{DAY_IN_MINUTES, HOUR_IN_MINUTES, YEAR_IN_MINUTES};
pub use vegetation::{
    BurnIndex, BurnIndexThresholds, DroughtLevel, FireState, PerVegetation, TerrainType,
    Vegetation, MAX_DROUGHT_LEVEL,
};
pub use wind::Wind;
