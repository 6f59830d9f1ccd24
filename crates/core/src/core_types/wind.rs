//! Wind description used by the spread-rate model

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Uniform wind over the whole grid
///
/// `direction` is the compass bearing the wind blows *from*, in degrees
/// (0 = northern wind, 90 = eastern wind). Speed is in miles per hour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub direction: f64,
}

impl Wind {
    pub fn new(speed: f64, direction: f64) -> Self {
        Self { speed, direction }
    }

    pub fn calm() -> Self {
        Self::default()
    }

    /// Unit vector the wind pushes fire toward, in grid space (+x east, +y north)
    #[inline]
    pub fn heading(&self) -> Vector2<f64> {
        let rad = self.direction.to_radians();
        Vector2::new(-rad.sin(), -rad.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_northern_wind_pushes_toward_negative_y() {
        let heading = Wind::new(10.0, 0.0).heading();
        assert_abs_diff_eq!(heading.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(heading.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_is_unit_length() {
        for deg in [0.0, 45.0, 90.0, 200.0, 359.0] {
            assert_abs_diff_eq!(Wind::new(3.0, deg).heading().norm(), 1.0, epsilon = 1e-12);
        }
    }
}
