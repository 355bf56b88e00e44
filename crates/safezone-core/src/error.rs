//! Error types.
//!
//! The simulation itself never fails: degenerate vectors, NaN angles and
//! skipped collisions all degrade to "no change this tick". The only fallible
//! surface is loading and validating a [`SimulationConfig`](crate::config::SimulationConfig).

use thiserror::Error;

/// Errors produced while parsing or validating a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the config schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid configuration field `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

impl ConfigError {
    /// Builds an [`ConfigError::Invalid`] for `field`.
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
