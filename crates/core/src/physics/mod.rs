//! Fire behaviour physics
//!
//! Fuel moisture lookup and the Rothermel surface spread model.

pub mod fuel_moisture;
pub mod spread_rate;

pub use fuel_moisture::{moisture_content, MOISTURE_CONTENT_LOOKUP};
pub use spread_rate::{direction_factor, fire_spread_rate, FuelModel, FuelSite};
