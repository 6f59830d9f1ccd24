//! Fuel moisture lookup by vegetation and drought level
//!
//! Moisture content is a dead-fuel fraction (0-1) tabulated for the four
//! named drought levels and linearly interpolated for the continuous values
//! produced by climate ramps and suppression drops.

use crate::core_types::{PerVegetation, Vegetation, MAX_DROUGHT_LEVEL};

/// Moisture fraction per drought level (no, mild, medium, severe)
pub const MOISTURE_CONTENT_LOOKUP: PerVegetation<[f64; 4]> = PerVegetation::new(
    [0.1275, 0.09, 0.0525, 0.015],
    [0.255, 0.18, 0.105, 0.03],
    [0.2125, 0.1, 0.017, 0.005],
    [0.085, 0.06, 0.035, 0.01],
);

/// Moisture content for `vegetation` at a (possibly fractional) drought level
///
/// # Panics
/// Panics when `drought_level` is outside `0.0..=3.0`. Callers clamp drought
/// levels when they derive them, so an out-of-range value is a logic error.
#[track_caller]
pub fn moisture_content(vegetation: Vegetation, drought_level: f64) -> f64 {
    assert!(
        (0.0..=MAX_DROUGHT_LEVEL).contains(&drought_level),
        "drought level {drought_level} outside moisture table range 0..={MAX_DROUGHT_LEVEL}"
    );
    let row = MOISTURE_CONTENT_LOOKUP.get(vegetation);
    let lower = drought_level.floor() as usize;
    let upper = drought_level.ceil() as usize;
    let t = drought_level - drought_level.floor();
    row[lower] + (row[upper] - row[lower]) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_named_levels_hit_table() {
        assert_eq!(moisture_content(Vegetation::Grass, 1.0), 0.09);
        assert_eq!(moisture_content(Vegetation::Shrub, 3.0), 0.03);
        assert_eq!(moisture_content(Vegetation::DeciduousForest, 0.0), 0.2125);
    }

    #[test]
    fn test_fractional_level_interpolates() {
        assert_abs_diff_eq!(
            moisture_content(Vegetation::ConiferousForest, 1.5),
            0.0475,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_drier_is_never_wetter() {
        for veg in Vegetation::ALL {
            let mut last = f64::INFINITY;
            for step in 0..=30 {
                let m = moisture_content(veg, f64::from(step) * 0.1);
                assert!(m <= last);
                last = m;
            }
        }
    }

    #[test]
    #[should_panic(expected = "outside moisture table range")]
    fn test_out_of_range_level_panics() {
        let _ = moisture_content(Vegetation::Grass, 3.5);
    }

    #[test]
    #[should_panic(expected = "outside moisture table range")]
    fn test_negative_level_panics() {
        let _ = moisture_content(Vegetation::Grass, -0.1);
    }
}
