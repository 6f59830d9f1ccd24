//! Fire and succession engines operating on a [`crate::grid::Grid`]

pub mod fire;
pub mod succession;

pub use fire::{Fire, FireEngine, FireEngineConfig};
pub use succession::{SuccessionEngine, SuccessionReport};
