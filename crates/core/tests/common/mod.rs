//! Shared fixtures for the integration tests

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use wildfire_core::core_types::{DroughtLevel, TerrainType, Vegetation, DAY_IN_MINUTES};
use wildfire_core::{Phase, Session, SimulationConfig, TerrainInput, Zone};

/// Log to the test harness; `RUST_LOG=wildfire_core=debug` shows engine steps
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 20 x 20 cells of 100 ft, one grass zone, seeded
pub fn grass_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        model_width: 2_000.0,
        model_height: 2_000.0,
        grid_width: 20,
        zones: vec![Zone::new(
            Vegetation::Grass,
            TerrainType::Plains,
            DroughtLevel::MildDrought,
        )],
        zone_index: None,
        fill_terrain_edges: false,
        simulation_end_year: 12,
        rng_seed: Some(seed),
        ..SimulationConfig::default()
    }
}

pub fn loaded_session(config: SimulationConfig) -> Session {
    let mut session = Session::new(config).expect("valid config");
    session.load_terrain(&TerrainInput::flat());
    session
}

/// Tick one day at a time until the fire is over
pub fn burn_out(session: &mut Session) {
    for _ in 0..120 {
        if session.simulation().phase() != Phase::FireActive {
            return;
        }
        session.tick(DAY_IN_MINUTES);
    }
    panic!("fire still active after 120 days");
}
