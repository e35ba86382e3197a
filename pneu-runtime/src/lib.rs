//! Threaded runtime for the lever-suspension engine.
//!
//! Wraps a [`pneu_core::SuspensionWorld`] in a dedicated worker thread with
//! a command channel in and a snapshot bus out. The worker paces itself to
//! the configured timestep (or free-runs for batch use) and keeps stepping
//! through degraded ticks; only `Stop` or a corrupted world ends it.
//!
//! # Example
//!
//! ```no_run
//! use pneu_runtime::{RuntimeConfig, SimulationWorker};
//! use pneu_types::{ControlCommand, EngineConfig};
//!
//! let worker = SimulationWorker::spawn(EngineConfig::default(), RuntimeConfig::default())?;
//! worker.send(ControlCommand::Start)?;
//! let snapshot = worker.snapshots().recv().expect("worker is running");
//! println!("t = {:.3} s", snapshot.time);
//! worker.join()?;
//! # Ok::<(), pneu_types::SuspensionError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

mod bus;
mod worker;

pub use bus::SnapshotBus;
pub use worker::{RuntimeConfig, SimulationWorker};
