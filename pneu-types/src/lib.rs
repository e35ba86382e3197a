//! Core types for the pneumatic lever-suspension simulation.
//!
//! This crate defines the shared vocabulary of the engine: corner and frame
//! state, configuration, commands, snapshots, and errors. It contains no
//! simulation logic; the engine lives in `pneu-core` and the threaded
//! runtime in `pneu-runtime`.
//!
//! All quantities are SI: meters, radians, seconds, pascals, kilograms.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

mod command;
mod config;
mod corner;
mod error;
mod frame;
mod snapshot;

pub use command::{Axle, Command, ConstraintMode, ControlCommand, ParameterKey, ParameterUpdate};
pub use config::{
    CylinderSpec, EngineConfig, FrameConfig, GeometricBounds, IntegrationMethod, PneumaticConfig,
    SimulationConfig, SuspensionGeometry,
};
pub use corner::{
    CornerId, CornerState, CylinderState, GasChamberState, InterferenceResult, LeverState,
};
pub use error::SuspensionError;
pub use frame::FrameState;
pub use snapshot::{SimulationSnapshot, StepWarnings};

/// Result alias for suspension operations.
pub type Result<T> = std::result::Result<T, SuspensionError>;
