//! Simulation engine for the four-corner pneumatic lever suspension.
//!
//! The engine is organized as a per-tick pipeline over a
//! [`SuspensionWorld`]:
//!
//! - [`lever`] and [`cylinder`] solve the closed-form corner kinematics
//! - [`pneumatics`] advances the gas chambers
//! - [`dynamics`] turns pressures into frame accelerations
//! - [`integrators`] advances the three frame modes
//! - [`interference`] reports lever/cylinder clearance
//! - [`constraint`] guards every coupled-parameter edit
//! - [`stepper`] ties the pipeline together into one tick
//!
//! # Example
//!
//! ```
//! use pneu_core::{Stepper, SuspensionWorld};
//! use pneu_types::EngineConfig;
//!
//! let mut world = SuspensionWorld::new(EngineConfig::default())?;
//! let mut stepper = Stepper::new();
//! let result = stepper.step(&mut world)?;
//! assert_eq!(result.snapshot.tick, 1);
//! # Ok::<(), pneu_types::SuspensionError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

pub mod constraint;
pub mod cylinder;
pub mod dynamics;
pub mod geometry;
pub mod integrators;
pub mod interference;
pub mod lever;
pub mod pneumatics;
pub mod stepper;
pub mod world;

pub use stepper::{StepResult, Stepper, StepperConfig};
pub use world::SuspensionWorld;
