//! Rothermel Surface Fire Spread Model (1972)
//!
//! Directional rate of spread between two neighbouring cells, in feet per
//! minute. Wind and slope effects are combined as vectors (Rothermel 1983
//! vector procedure) and the rate toward a particular neighbour is scaled by
//! an elliptical fire-shape factor.
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire spread in wildland fuels."
//!   USDA Forest Service Research Paper INT-115.
//! - Albini, F.A. (1976). "Estimating wildfire behavior and effects." USDA Forest Service
//!   General Technical Report INT-30.
//! - Anderson, H.E. (1983). "Predicting wind-driven wild land fire size and shape."
//!   USDA Forest Service Research Paper INT-305.

use crate::core_types::{Vegetation, Wind};
use nalgebra::Vector2;

/// Low heat content of dry fuel (BTU/lb)
const HEAT_CONTENT: f64 = 8000.0;

/// Effective (silica-free) mineral content fraction
const EFFECTIVE_MINERAL_CONTENT: f64 = 0.01;

/// Oven-dry particle density (lb/ft³)
const PARTICLE_DENSITY: f64 = 32.0;

/// Conversion from mph to ft/min
const FT_PER_MIN_PER_MPH: f64 = 88.0;

/// Fuel bed description for one vegetation type (imperial units)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModel {
    /// Surface-area-to-volume ratio σ (1/ft)
    pub sav: f64,
    /// Packing ratio β of the fine fuel particles
    pub packing_ratio: f64,
    /// Net fuel load w₀ (lb/ft²)
    pub net_fuel_load: f64,
    /// Moisture of extinction Mx (fraction)
    pub moisture_of_extinction: f64,
    /// Fuel bed depth δ (ft)
    pub fuel_bed_depth: f64,
}

const GRASS: FuelModel = FuelModel {
    sav: 2100.0,
    packing_ratio: 0.00306,
    net_fuel_load: 1.882217255,
    moisture_of_extinction: 0.15,
    fuel_bed_depth: 2.837879288,
};

const SHRUB: FuelModel = FuelModel {
    sav: 1672.0,
    packing_ratio: 0.01171597178,
    net_fuel_load: 0.1717073023,
    moisture_of_extinction: 0.3,
    fuel_bed_depth: 1.136840423,
};

const DECIDUOUS_FOREST: FuelModel = FuelModel {
    sav: 1716.0,
    packing_ratio: 0.0135,
    net_fuel_load: 0.001675644689,
    moisture_of_extinction: 0.25,
    fuel_bed_depth: 0.0673022249,
};

const CONIFEROUS_FOREST: FuelModel = FuelModel {
    sav: 1500.0,
    packing_ratio: 0.0178,
    net_fuel_load: 0.05593972657,
    moisture_of_extinction: 0.15,
    fuel_bed_depth: 0.5228417584,
};

impl FuelModel {
    pub fn for_vegetation(vegetation: Vegetation) -> &'static FuelModel {
        match vegetation {
            Vegetation::Grass => &GRASS,
            Vegetation::Shrub => &SHRUB,
            Vegetation::DeciduousForest => &DECIDUOUS_FOREST,
            Vegetation::ConiferousForest => &CONIFEROUS_FOREST,
        }
    }

    /// Optimum packing ratio `β_op = 3.348 σ^-0.8189`
    #[inline]
    fn optimum_packing_ratio(&self) -> f64 {
        3.348 * self.sav.powf(-0.8189)
    }

    /// Oven-dry bulk density `ρ_b = w₀ / δ` (lb/ft³)
    #[inline]
    fn bulk_density(&self) -> f64 {
        self.net_fuel_load / self.fuel_bed_depth
    }

    /// Reaction intensity `I_R = Γ' w₀ h η_M η_s` (BTU/ft²/min)
    fn reaction_intensity(&self, moisture: f64) -> f64 {
        let sigma = self.sav;
        let sigma_15 = sigma.powf(1.5);
        let gamma_max = sigma_15 / (495.0 + 0.0594 * sigma_15);
        let a = 133.0 * sigma.powf(-0.7913);
        let relative_packing = self.packing_ratio / self.optimum_packing_ratio();
        let gamma = gamma_max * relative_packing.powf(a) * (a * (1.0 - relative_packing)).exp();

        let moisture_damping = moisture_damping(moisture, self.moisture_of_extinction);
        let mineral_damping = 0.174 * EFFECTIVE_MINERAL_CONTENT.powf(-0.19);

        gamma * self.net_fuel_load * HEAT_CONTENT * moisture_damping * mineral_damping
    }

    /// Propagating flux ratio ξ
    fn propagating_flux_ratio(&self) -> f64 {
        let sigma = self.sav;
        ((0.792 + 0.681 * sigma.sqrt()) * (self.packing_ratio + 0.1)).exp()
            / (192.0 + 0.2595 * sigma)
    }

    /// Rate of spread with no wind and no slope, R₀ (ft/min)
    pub fn base_spread_rate(&self, moisture: f64) -> f64 {
        let reaction_intensity = self.reaction_intensity(moisture);
        if reaction_intensity <= 0.0 {
            return 0.0;
        }
        let effective_heating = (-138.0 / self.sav).exp();
        let heat_of_preignition = 250.0 + 1116.0 * moisture;
        reaction_intensity * self.propagating_flux_ratio()
            / (self.bulk_density() * effective_heating * heat_of_preignition)
    }

    /// Wind coefficient `C (β_bed/β_op)^-E`, shared by `φ_w` and the inverse
    /// effective-wind calculation
    ///
    /// The bed packing ratio comes from bulk density, not from the fine-fuel
    /// `packing_ratio` used by the reaction terms.
    fn wind_coefficient(&self) -> f64 {
        let c = 7.47 * (-0.133 * self.sav.powf(0.55)).exp();
        let e = 0.715 * (-3.59e-4 * self.sav).exp();
        let bed_packing_ratio = self.bulk_density() / PARTICLE_DENSITY;
        c * (bed_packing_ratio / self.optimum_packing_ratio()).powf(-e)
    }

    #[inline]
    fn wind_exponent(&self) -> f64 {
        0.02526 * self.sav.powf(0.54)
    }

    /// Wind factor `φ_w` for a wind speed in mph
    pub fn wind_factor(&self, wind_speed_mph: f64) -> f64 {
        if wind_speed_mph <= 0.0 {
            return 0.0;
        }
        self.wind_coefficient() * (wind_speed_mph * FT_PER_MIN_PER_MPH).powf(self.wind_exponent())
    }

    /// Slope factor `φ_s = 5.275 β^-0.3 tan²θ`, with θ approximated by its angle
    pub fn slope_factor(&self, slope_angle: f64) -> f64 {
        5.275 * self.packing_ratio.powf(-0.3) * slope_angle * slope_angle
    }

    /// Wind speed (ft/min) that alone would produce the combined factor `φ_E`
    pub fn effective_wind_speed(&self, combined_factor: f64) -> f64 {
        (combined_factor / self.wind_coefficient()).powf(1.0 / self.wind_exponent())
    }
}

/// Moisture damping coefficient `η_M`, zero at or above extinction
fn moisture_damping(moisture: f64, moisture_of_extinction: f64) -> f64 {
    let ratio = moisture / moisture_of_extinction;
    if ratio.is_nan() || ratio >= 1.0 {
        return 0.0;
    }
    (1.0 - 2.59 * ratio + 5.11 * ratio.powi(2) - 3.52 * ratio.powi(3)).clamp(0.0, 1.0)
}

/// Elliptical fire-shape factor
///
/// `angle` is measured from the direction of maximum spread (radians);
/// `effective_wind_speed` is in ft/min. Returns 1.0 along the major axis.
pub fn direction_factor(angle: f64, effective_wind_speed: f64) -> f64 {
    let length_to_width = 1.0 + 0.25 * effective_wind_speed / FT_PER_MIN_PER_MPH;
    let eccentricity = (length_to_width * length_to_width - 1.0).sqrt() / length_to_width;
    (1.0 - eccentricity) / (1.0 - eccentricity * angle.cos())
}

/// Everything the spread model needs to know about one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelSite {
    /// Grid column
    pub x: f64,
    /// Grid row
    pub y: f64,
    /// Effective elevation (ft)
    pub elevation: f64,
    pub vegetation: Vegetation,
    /// Moisture fraction; infinite for nonburnable cells
    pub moisture: f64,
}

/// Rate of spread (ft/min) from `source` toward `target`
///
/// Fuel and moisture are taken from the target, which is the cell being
/// ignited.
pub fn fire_spread_rate(source: &FuelSite, target: &FuelSite, wind: &Wind, cell_size: f64) -> f64 {
    let fuel = FuelModel::for_vegetation(target.vegetation);
    let base = fuel.base_spread_rate(target.moisture);
    if base <= 0.0 {
        return 0.0;
    }

    let offset = Vector2::new(target.x - source.x, target.y - source.y);
    let distance = offset.norm();
    if distance == 0.0 {
        return base;
    }
    let bearing = offset / distance;

    let slope_angle = ((target.elevation - source.elevation) / (distance * cell_size)).atan();
    let slope_factor = fuel.slope_factor(slope_angle).copysign(slope_angle);
    let wind_factor = fuel.wind_factor(wind.speed);

    let combined = wind.heading() * wind_factor + bearing * slope_factor;
    let combined_factor = combined.norm();
    if combined_factor == 0.0 {
        return base;
    }

    let max_spread_direction = combined.y.atan2(combined.x);
    let effective_wind = fuel.effective_wind_speed(combined_factor);
    let angle = offset.y.atan2(offset.x) - max_spread_direction;

    base * (1.0 + combined_factor) * direction_factor(angle, effective_wind)
}
