//! Error types for simulation construction and configuration

use std::error::Error;
use std::fmt;

/// Errors raised while building a simulation or resolving its configuration
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A configuration field holds a value the simulation cannot run with
    InvalidConfig {
        /// Name of the offending field (`camelCase`, as in JSON)
        field: &'static str,
        /// Human readable reason
        reason: String,
    },
    /// No preset with this name exists
    UnknownPreset(String),
    /// Configuration overrides could not be parsed or merged
    ConfigParse(String),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration value for '{field}': {reason}")
            }
            SimError::UnknownPreset(name) => write!(f, "Unknown preset: {name}"),
            SimError::ConfigParse(msg) => write!(f, "Failed to parse configuration: {msg}"),
        }
    }
}

impl Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::ConfigParse(err.to_string())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let err = SimError::invalid("cellSize", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'cellSize': must be positive"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SimError = json_err.into();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }
}
