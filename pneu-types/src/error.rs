//! Error types for the suspension engine.

use thiserror::Error;

/// Errors that can occur while configuring or stepping the engine.
///
/// Only [`SuspensionError::Configuration`] is fatal; it blocks a world from
/// being created or a parameter update from being applied. Everything else
/// is a per-tick condition that the simulation loop degrades around.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SuspensionError {
    /// A geometric or pneumatic invariant was violated at setup time.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Description of the violated invariant.
        reason: String,
    },

    /// A kinematic input exceeds the physical limits of the mechanism.
    #[error("{quantity} = {value} is outside the reachable range (limit {limit})")]
    OutOfRange {
        /// Name of the offending quantity.
        quantity: String,
        /// The offending value.
        value: f64,
        /// The physical limit that was exceeded.
        limit: f64,
    },

    /// The frame integrator produced a non-finite state even after the
    /// half-step retry.
    #[error("integration failed at t = {time} s (dt = {timestep} s)")]
    IntegrationFailure {
        /// Simulation time of the failed step.
        time: f64,
        /// Timestep that was attempted.
        timestep: f64,
    },

    /// The worker's command or snapshot channel was disconnected.
    #[error("simulation channel closed")]
    ChannelClosed,
}

impl SuspensionError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an out-of-range error.
    #[must_use]
    pub fn out_of_range(quantity: impl Into<String>, value: f64, limit: f64) -> Self {
        Self::OutOfRange {
            quantity: quantity.into(),
            value,
            limit,
        }
    }

    /// Check if this is a (fatal) configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this is a recoverable out-of-range input.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Check if this is an integration failure.
    #[must_use]
    pub fn is_integration_failure(&self) -> bool {
        matches!(self, Self::IntegrationFailure { .. })
    }
}
