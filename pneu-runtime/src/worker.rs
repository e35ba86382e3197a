//! Simulation worker thread.
//!
//! The worker owns the world and stepper outright; clients talk to it only
//! through a bounded command channel and read results from the snapshot
//! bus. Commands are drained between ticks, with repeated updates to the
//! same parameter coalesced so only the most recent one is applied.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use pneu_core::{Stepper, SuspensionWorld};
use pneu_types::{
    Command, ControlCommand, EngineConfig, ParameterUpdate, Result, SimulationSnapshot,
    SuspensionError,
};

use crate::bus::SnapshotBus;

/// Channel sizing and pacing for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Snapshots buffered per subscriber before the oldest is dropped.
    pub snapshot_capacity: usize,
    /// Commands buffered before senders block.
    pub command_capacity: usize,
    /// Whether to pace ticks to wall-clock time. Off, the worker steps as
    /// fast as it can (useful for batch runs and tests).
    pub paced: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: 16,
            command_capacity: 64,
            paced: true,
        }
    }
}

impl RuntimeConfig {
    /// Configuration for batch use: no wall-clock pacing.
    #[must_use]
    pub fn unpaced() -> Self {
        Self {
            paced: false,
            ..Default::default()
        }
    }
}

/// Lifecycle state of the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    /// Built but not started, or reset; waiting for `Start`.
    Idle,
    /// Stepping.
    Running,
    /// Suspended; state retained, waiting for `Resume`.
    Paused,
}

/// Handle to a running simulation worker.
///
/// Dropping the handle asks the worker to stop; [`SimulationWorker::join`]
/// does the same but surfaces the worker's exit result.
#[derive(Debug)]
pub struct SimulationWorker {
    commands: Sender<Command>,
    snapshots: Receiver<SimulationSnapshot>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl SimulationWorker {
    /// Validate the configuration and spawn the worker thread.
    ///
    /// The worker starts idle; send [`ControlCommand::Start`] to begin
    /// stepping.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionError::Configuration`] for an invalid engine
    /// configuration, or if the thread cannot be spawned.
    pub fn spawn(config: EngineConfig, runtime: RuntimeConfig) -> Result<Self> {
        let world = SuspensionWorld::new(config)?;
        let (commands, command_rx) = bounded(runtime.command_capacity.max(1));
        let mut bus = SnapshotBus::new(runtime.snapshot_capacity);
        let snapshots = bus.subscribe();

        let handle = thread::Builder::new()
            .name("pneu-worker".into())
            .spawn(move || run_loop(world, runtime, &command_rx, &mut bus))
            .map_err(|e| {
                SuspensionError::configuration(format!("failed to spawn worker thread: {e}"))
            })?;

        Ok(Self {
            commands,
            snapshots,
            handle: Some(handle),
        })
    }

    /// Send a command to the worker.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionError::ChannelClosed`] if the worker has exited.
    pub fn send(&self, command: impl Into<Command>) -> Result<()> {
        self.commands
            .send(command.into())
            .map_err(|_| SuspensionError::ChannelClosed)
    }

    /// Receiver for published snapshots.
    #[must_use]
    pub fn snapshots(&self) -> &Receiver<SimulationSnapshot> {
        &self.snapshots
    }

    /// Drain the snapshot queue and return the freshest entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<SimulationSnapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.snapshots.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns the worker's own exit error, or
    /// [`SuspensionError::ChannelClosed`] if the thread panicked.
    pub fn join(mut self) -> Result<()> {
        let _ = self.send(ControlCommand::Stop);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| SuspensionError::ChannelClosed)?,
            None => Ok(()),
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        let _ = self.commands.send(ControlCommand::Stop.into());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Split a command batch into controls (in order) and coalesced parameter
/// updates (last writer wins per parameter key).
fn coalesce(batch: Vec<Command>) -> (Vec<ControlCommand>, Vec<ParameterUpdate>) {
    let mut controls = Vec::new();
    let mut updates: Vec<ParameterUpdate> = Vec::new();
    for command in batch {
        match command {
            Command::Control(control) => controls.push(control),
            Command::Parameter(update) => {
                if let Some(existing) = updates.iter_mut().find(|u| u.key() == update.key()) {
                    *existing = update;
                } else {
                    updates.push(update);
                }
            }
        }
    }
    (controls, updates)
}

fn run_loop(
    mut world: SuspensionWorld,
    runtime: RuntimeConfig,
    commands: &Receiver<Command>,
    bus: &mut SnapshotBus,
) -> Result<()> {
    let mut stepper = Stepper::new();
    let mut state = WorkerState::Idle;
    let period = Duration::from_secs_f64(world.timestep());
    let mut next_tick = Instant::now();
    tracing::info!(timestep = world.timestep(), "simulation worker started");

    loop {
        // Gather commands: block while there is nothing to step, drain
        // opportunistically while running.
        let mut batch = Vec::new();
        if state == WorkerState::Running {
            loop {
                match commands.try_recv() {
                    Ok(command) => batch.push(command),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::info!("all clients disconnected, stopping");
                        return Ok(());
                    }
                }
            }
        } else {
            match commands.recv() {
                Ok(command) => {
                    batch.push(command);
                    while let Ok(more) = commands.try_recv() {
                        batch.push(more);
                    }
                }
                Err(_) => {
                    tracing::info!("all clients disconnected, stopping");
                    return Ok(());
                }
            }
        }

        let (controls, updates) = coalesce(batch);
        for control in controls {
            match (control, state) {
                (ControlCommand::Start, WorkerState::Idle)
                | (ControlCommand::Resume, WorkerState::Paused) => {
                    state = WorkerState::Running;
                    next_tick = Instant::now() + period;
                    tracing::info!(tick = world.tick(), "running");
                }
                (ControlCommand::Pause, WorkerState::Running) => {
                    state = WorkerState::Paused;
                    tracing::info!(tick = world.tick(), "paused");
                }
                (ControlCommand::Reset, _) => {
                    world.reset()?;
                    state = WorkerState::Idle;
                    tracing::info!("reset to initial configuration");
                }
                (ControlCommand::Stop, _) => {
                    tracing::info!(tick = world.tick(), "stopping");
                    return Ok(());
                }
                (ignored, _) => {
                    tracing::debug!(command = ?ignored, state = ?state, "control ignored");
                }
            }
        }

        for update in &updates {
            if let Err(err) = world.apply_update(update) {
                // Rejected updates are a client problem, not a worker one.
                tracing::warn!(error = %err, "parameter update rejected");
            }
        }

        if state == WorkerState::Running {
            let result = stepper.step(&mut world)?;
            bus.publish(&result.snapshot);

            if runtime.paced {
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                }
                next_tick += period;
                // Fell behind by more than a period: resynchronize instead
                // of bursting to catch up.
                if next_tick + period < Instant::now() {
                    next_tick = Instant::now() + period;
                }
            }
        }
    }
}
