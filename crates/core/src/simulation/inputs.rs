//! User inputs placed on the simulation: sparks and fire events

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// An ignition point in model feet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub position: Vector2<f64>,
    /// Simulation time the spark was placed (minutes)
    pub time: f64,
    /// Already handed to the fire engine
    pub consumed: bool,
}

impl Spark {
    pub fn new(x: f64, y: f64, time: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            time,
            consumed: false,
        }
    }
}

/// A period in which the user placed sparks and the resulting fire burned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireEvent {
    pub start_time: f64,
    /// Set once the fire stops
    pub end_time: Option<f64>,
    pub sparks: Vec<Spark>,
}

impl FireEvent {
    pub fn new(start_time: f64) -> Self {
        Self {
            start_time,
            end_time: None,
            sparks: Vec::new(),
        }
    }

    /// Still open for sparks or burning
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
