//! Frame-to-model time step sizing
//!
//! Hosts report real elapsed seconds per frame. During an active fire one
//! simulated day lasts `model_day_in_seconds` real seconds and a frame never
//! advances more than `max_time_step` or four ideal 60 fps frames. During
//! regrowth the whole run to the end year lasts `regrowth_run_in_seconds`,
//! with no per-frame cap.

use crate::config::SimulationConfig;
use crate::core_types::{DAY_IN_MINUTES, YEAR_IN_MINUTES};

/// Real seconds of one frame at 60 fps
pub const OPTIMAL_FRAME_SECONDS: f64 = 1.0 / 60.0;

/// Model minutes advanced by the first frame, before frame timing is known
pub const FIRST_FRAME_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSizer {
    /// Model minutes per real second while fire is active
    fire_ratio: f64,
    max_time_step: f64,
    /// Model minutes per real second during regrowth
    regrowth_ratio: f64,
}

impl StepSizer {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            fire_ratio: DAY_IN_MINUTES / config.model_day_in_seconds,
            max_time_step: config.max_time_step,
            regrowth_ratio: f64::from(config.simulation_end_year) * YEAR_IN_MINUTES
                / config.regrowth_run_in_seconds,
        }
    }

    /// Fire step for a frame; `None` real time means the first frame
    pub fn fire_step(&self, real_dt: Option<f64>) -> f64 {
        match real_dt {
            Some(dt) => {
                let optimal = self.fire_ratio * OPTIMAL_FRAME_SECONDS;
                self.max_time_step.min(optimal * 4.0).min(self.fire_ratio * dt)
            }
            None => FIRST_FRAME_STEP,
        }
    }

    pub fn regrowth_step(&self, real_dt: Option<f64>) -> f64 {
        match real_dt {
            Some(dt) => self.regrowth_ratio * dt,
            None => FIRST_FRAME_STEP,
        }
    }
}
