//! Rothermel spread rates against hand-worked reference values
//!
//! Every case uses moisture 0.06 and a 0.1 rad uphill slope from the source
//! to the target, which lies directly south of it.

mod common;

use approx::assert_abs_diff_eq;
use wildfire_core::core_types::{Vegetation, Wind};
use wildfire_core::physics::{fire_spread_rate, FuelSite};

const CELL_SIZE: f64 = 1.0;

fn sites(vegetation: Vegetation) -> (FuelSite, FuelSite) {
    let source = FuelSite {
        x: 10.0,
        y: 11.0,
        elevation: 0.0,
        vegetation,
        moisture: 0.06,
    };
    let target = FuelSite {
        y: 10.0,
        elevation: 0.1_f64.tan() * CELL_SIZE,
        ..source
    };
    (source, target)
}

fn rate(vegetation: Vegetation, speed: f64, direction: f64) -> f64 {
    let (source, target) = sites(vegetation);
    fire_spread_rate(&source, &target, &Wind::new(speed, direction), CELL_SIZE)
}

fn assert_northern_wind_rates(vegetation: Vegetation, expected: [f64; 3]) {
    for (speed, want) in [1.0, 2.0, 20.0].into_iter().zip(expected) {
        let got = rate(vegetation, speed, 0.0);
        assert_abs_diff_eq!(got, want, epsilon = 1e-3);
    }
}

#[test]
fn test_grass_reference_rates() {
    assert_northern_wind_rates(Vegetation::Grass, [19.40563588, 33.46252017, 802.7428356]);
}

#[test]
fn test_shrub_reference_rates() {
    assert_northern_wind_rates(Vegetation::Shrub, [14.143734476, 27.64726088, 541.68779579]);
}

#[test]
fn test_deciduous_reference_rates() {
    assert_northern_wind_rates(
        Vegetation::DeciduousForest,
        [1.275686811, 2.831591284, 64.40222588],
    );
}

#[test]
fn test_coniferous_reference_rates() {
    assert_northern_wind_rates(
        Vegetation::ConiferousForest,
        [6.268576733, 12.42085772, 212.927632],
    );
}

#[test]
fn test_crosswind_and_headwind() {
    let aligned = rate(Vegetation::Shrub, 2.0, 0.0);
    let east = rate(Vegetation::Shrub, 2.0, 90.0);
    let west = rate(Vegetation::Shrub, 2.0, -90.0);
    let against = rate(Vegetation::Shrub, 2.0, 180.0);

    assert_abs_diff_eq!(aligned, 27.64726088, epsilon = 1e-3);
    assert_abs_diff_eq!(east, 7.0274244, epsilon = 1e-3);
    assert_abs_diff_eq!(west, 7.0274244, epsilon = 1e-3);
    assert_abs_diff_eq!(against, 3.86127, epsilon = 1e-3);
}
