//! Snapshot timeline: capture, scrubbing and resuming

mod common;

use common::{burn_out, grass_config, loaded_session};
use wildfire_core::core_types::{FireState, YEAR_IN_MINUTES};
use wildfire_core::simulation::{SnapshotKind, Spark};
use wildfire_core::{Grid, Phase, Session, SimulationConfig, SuccessionConfig, Wind};

/// Every snapshot keeps its own cell buffer
fn exact_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        snapshot_stats_tolerance: -1.0,
        ..grass_config(seed)
    }
}

fn burning_cells(grid: &Grid) -> usize {
    grid.cells()
        .iter()
        .filter(|c| c.fire_state == FireState::Burning)
        .count()
}

/// Light a fire in the middle of the grid and stop it six hours in
fn stopped_mid_fire(seed: u64) -> Session {
    let mut session = loaded_session(exact_config(seed));
    assert!(session.add_spark(1_050.0, 1_050.0));
    session.start();
    session.tick(360.0);
    assert_eq!(session.simulation().phase(), Phase::FireActive);
    session.stop();
    assert!(burning_cells(session.simulation().grid().unwrap()) > 0);
    session
}

#[test]
fn test_restore_year_reproduces_grid() {
    let mut session = loaded_session(exact_config(11));
    session.add_spark(1_050.0, 1_050.0);
    session.start();
    burn_out(&mut session);
    assert_eq!(session.simulation().phase(), Phase::Regrowth);

    // Finish year 3 exactly, then keep going.
    session.tick(3.0 * YEAR_IN_MINUTES - session.simulation().time());
    let year_three = session.simulation().grid().unwrap().clone();
    session.tick(3.0 * YEAR_IN_MINUTES);
    session.stop();
    assert_ne!(session.simulation().grid().unwrap(), &year_three);

    assert!(session.restore_year(3.0));
    assert_eq!(session.simulation().time(), 3.0 * YEAR_IN_MINUTES);
    assert_eq!(session.simulation().grid().unwrap(), &year_three);
    assert!(!session.simulation().is_running());
    assert_eq!(session.simulation().yearly_stats().last().unwrap().year, 3);
}

#[test]
fn test_restore_picks_snapshot_at_or_before() {
    let mut session = loaded_session(grass_config(3));
    session.start();
    session.tick(4.0 * YEAR_IN_MINUTES);
    session.stop();

    assert!(session.restore_year(2.6));
    assert_eq!(session.simulation().time(), 2.0 * YEAR_IN_MINUTES);
    assert!(session.restore_year(-1.0));
    assert_eq!(session.simulation().time(), 0.0);
}

#[test]
fn test_resume_after_scrub_continues_from_latest() {
    let mut session = loaded_session(exact_config(21));
    session.start();
    session.tick(5.0 * YEAR_IN_MINUTES);
    session.stop();
    let latest = session.simulation().grid().unwrap().clone();

    session.restore_year(2.0);
    assert_eq!(session.simulation().time(), 2.0 * YEAR_IN_MINUTES);

    session.start();
    assert!(session.simulation().is_running());
    assert_eq!(session.simulation().time(), 5.0 * YEAR_IN_MINUTES);
    assert_eq!(session.simulation().grid().unwrap(), &latest);
    assert!(session.snapshots().snapshots().iter().all(|s| !s.provisional));
}

#[test]
fn test_mid_year_stop_snapshot_is_dropped_on_resume() {
    let mut session = loaded_session(grass_config(4));
    session.start();
    session.tick(1.5 * YEAR_IN_MINUTES);
    session.stop();
    let last = session.snapshots().snapshots().last().unwrap();
    assert_eq!(last.kind, SnapshotKind::Stop);
    assert!(last.provisional);

    session.start();
    assert!(session
        .snapshots()
        .snapshots()
        .iter()
        .all(|s| s.kind != SnapshotKind::Stop));
}

#[test]
fn test_identical_years_share_one_buffer() {
    let config = SimulationConfig {
        succession: SuccessionConfig {
            base_probability: 0.0,
            boosted_probability: 0.0,
            ..SuccessionConfig::default()
        },
        ..grass_config(8)
    };
    let mut session = loaded_session(config);
    session.start();
    session.tick(4.0 * YEAR_IN_MINUTES);

    let snapshots = session.snapshots().snapshots();
    assert_eq!(snapshots.len(), 5);
    // Start has its own buffer; years 1 to 4 store one between them.
    assert_eq!(session.snapshots().buffer_count(), 2);
    assert!(snapshots[1..].iter().all(|s| s.buffer() == snapshots[1].buffer()));
}

#[test]
fn test_fire_event_end_snapshot_keeps_sparks() {
    let mut session = loaded_session(grass_config(9));
    session.start();
    session.tick(YEAR_IN_MINUTES);
    session.stop();

    assert!(session.add_fire_event());
    assert!(session.add_spark(550.0, 550.0));
    session.start();
    burn_out(&mut session);

    let ended = session
        .snapshots()
        .snapshots()
        .iter()
        .find(|s| s.kind == SnapshotKind::FireEventEnded)
        .expect("fire end snapshot");
    assert_eq!(ended.sparks.len(), 1);
    let grid = session.simulation().grid().unwrap();
    assert!(grid.cells().iter().any(|c| c.fire_state != FireState::Unburnt));
}

#[test]
fn test_new_fire_event_after_scrub_truncates_timeline() {
    let mut session = loaded_session(grass_config(13));
    session.start();
    session.tick(6.0 * YEAR_IN_MINUTES);
    session.stop();

    session.restore_year(2.0);
    assert!(session.add_fire_event());
    assert_eq!(session.snapshots().max_year(), 2.0);
    assert_eq!(session.simulation().phase(), Phase::FireEventSetup);
}

#[test]
fn test_mid_fire_resume_leaves_no_snapshot_at_stop_time() {
    let mut session = stopped_mid_fire(31);
    let last = session.snapshots().snapshots().last().unwrap();
    assert_eq!(last.kind, SnapshotKind::Stop);
    assert!(last.provisional);
    assert_eq!(last.time, 360.0);

    session.start();
    assert!(session.simulation().is_running());
    assert!(session
        .snapshots()
        .snapshots()
        .iter()
        .all(|s| s.time != 360.0));

    burn_out(&mut session);
    assert!(session
        .snapshots()
        .snapshots()
        .iter()
        .all(|s| burning_cells_in(&session, s.time) == 0));
}

/// Burning cells held by the snapshot taken at `time`
fn burning_cells_in(session: &Session, time: f64) -> usize {
    let snapshots = session.snapshots();
    let snapshot = snapshots
        .snapshots()
        .iter()
        .find(|s| s.time == time)
        .expect("snapshot at time");
    snapshots
        .cells(snapshot)
        .iter()
        .filter(|c| c.fire_state == FireState::Burning)
        .count()
}

#[test]
fn test_fire_after_scrubbing_past_a_stopped_fire_ends() {
    let mut session = stopped_mid_fire(37);
    session.start();
    burn_out(&mut session);
    session.tick(3.0 * YEAR_IN_MINUTES);
    session.stop();

    assert!(session.restore_year(360.0 / YEAR_IN_MINUTES));
    assert_eq!(session.simulation().phase(), Phase::Regrowth);
    assert_eq!(burning_cells(session.simulation().grid().unwrap()), 0);

    assert!(session.add_fire_event());
    assert!(session.add_spark(150.0, 150.0));
    session.start();
    assert_eq!(session.simulation().phase(), Phase::FireActive);
    burn_out(&mut session);
    assert_eq!(session.simulation().phase(), Phase::Regrowth);
    assert_eq!(burning_cells(session.simulation().grid().unwrap()), 0);
}

#[test]
fn test_restoring_a_mid_fire_stop_keeps_burning() {
    let mut session = stopped_mid_fire(41);
    let at_stop = session.simulation().grid().unwrap().clone();

    assert!(session.restore_year(0.0));
    assert_eq!(session.simulation().time(), 0.0);
    assert!(session.restore_latest());
    assert_eq!(session.simulation().time(), 360.0);
    assert_eq!(session.simulation().phase(), Phase::FireActive);
    assert!(session.simulation().fire_engine().is_some());
    assert_eq!(session.simulation().grid().unwrap(), &at_stop);

    session.start();
    burn_out(&mut session);
    assert_eq!(session.simulation().phase(), Phase::Regrowth);
    assert_eq!(burning_cells(session.simulation().grid().unwrap()), 0);
    assert!(session
        .snapshots()
        .snapshots()
        .iter()
        .any(|s| s.kind == SnapshotKind::FireEventEnded));
}

#[test]
fn test_restore_brings_back_wind_drought_and_sparks() {
    let mut session = loaded_session(SimulationConfig {
        climate_change: Some([0.0, 3.0]),
        ..exact_config(43)
    });
    session.start();
    session.tick(3.0 * YEAR_IN_MINUTES);
    session.stop();

    assert!(session.add_fire_event());
    session.set_wind(Wind::new(7.0, 120.0));
    assert!(session.add_spark(300.0, 300.0));
    assert!(session.add_spark(500.0, 500.0));
    assert!(session.set_spark(1, 700.0, 700.0));
    session.start();
    assert_eq!(session.simulation().phase(), Phase::FireActive);
    let grid = session.simulation().grid().unwrap().clone();
    let sparks = session.simulation().sparks().to_vec();
    assert_eq!(session.simulation().drought_levels(), vec![0.75]);

    burn_out(&mut session);
    session.tick(2.0 * YEAR_IN_MINUTES);
    session.stop();
    session.set_wind(Wind::new(1.0, 10.0));
    assert!(session.simulation().sparks().is_empty());
    assert_ne!(session.simulation().drought_levels(), vec![0.75]);

    assert!(session.restore_year(3.0));
    let simulation = session.simulation();
    assert_eq!(simulation.time(), 3.0 * YEAR_IN_MINUTES);
    assert_eq!(simulation.wind(), Wind::new(7.0, 120.0));
    assert_eq!(simulation.drought_levels(), vec![0.75]);
    assert_eq!(simulation.sparks(), sparks.as_slice());
    assert_eq!(
        sparks.iter().map(|s: &Spark| (s.position.x, s.position.y)).collect::<Vec<_>>(),
        vec![(300.0, 300.0), (700.0, 700.0)]
    );
    assert_eq!(simulation.grid().unwrap(), &grid);
    assert!(simulation.yearly_stats().iter().all(|s| s.year <= 3));
}
