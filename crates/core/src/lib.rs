//! Wildfire Succession Simulation Core Library
//!
//! Simulates multi-decade wildfire ignition, anisotropic spread and
//! post-fire vegetation succession on a square-cell terrain grid, driven by
//! user-placed sparks.
//!
//! - [`grid`]: cells, zones, terrain input and barrier-aware neighbour topology
//! - [`physics`]: Rothermel (1972) surface fire spread rate and fuel moisture
//! - [`engine`]: the cellular-automaton fire engine and the yearly succession engine
//! - [`simulation`]: the phase state machine, statistics and snapshot timeline
//! - [`session`]: one run with its timeline and observers
//!
//! Distances are in feet, time in minutes, wind speed in mph.

pub mod config;
pub mod core_types;
pub mod engine;
pub mod error;
pub mod grid;
pub mod physics;
pub mod session;
pub mod simulation;

pub use config::{SimulationConfig, SuccessionConfig, PRESET_NAMES};
pub use core_types::{
    BurnIndex, DroughtLevel, FireState, PerVegetation, SimRng, TerrainType, Vegetation, Wind,
};
pub use engine::{FireEngine, SuccessionEngine};
pub use error::{Result, SimError};
pub use grid::{Cell, Grid, TerrainInput, Zone};
pub use session::Session;
pub use simulation::{
    Phase, Simulation, SimulationEvent, SimulationObserver, Snapshot, SnapshotManager, YearlyStats,
};
