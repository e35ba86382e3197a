//! Simulation stepping and control flow.
//!
//! The [`Stepper`] drives one fixed-timestep tick: solve kinematics from
//! road and frame, advance the gas chambers, resolve forces, integrate the
//! frame, and assemble an immutable snapshot. Degradations (unreachable
//! kinematics, integrator divergence, chamber starvation) never abort the
//! loop; they are reported in the snapshot's warnings.

use pneu_types::{
    CornerState, CylinderState, FrameState, IntegrationMethod, LeverState, Result,
    SimulationSnapshot, StepWarnings,
};

use crate::cylinder::stroke_jacobian;
use crate::dynamics::{axial_force, corner_vertical_force, frame_acceleration, FrameAcceleration};
use crate::integrators::integrate_with_method;
use crate::interference::check_interference;
use crate::pneumatics::update_chamber;
use crate::world::{SuspensionWorld, HEAD, ROD};

/// Result of a simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Snapshot published after the step.
    pub snapshot: SimulationSnapshot,
}

/// Configuration for the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperConfig {
    /// Whether to run the lever/cylinder clearance check each tick.
    pub enable_interference: bool,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            enable_interference: true,
        }
    }
}

/// The simulation stepper orchestrates the per-tick pipeline.
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    config: StepperConfig,
}

impl Stepper {
    /// Create a stepper with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stepper with custom configuration.
    #[must_use]
    pub fn with_config(config: StepperConfig) -> Self {
        Self { config }
    }

    /// Stepper configuration.
    #[must_use]
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Execute one simulation tick.
    ///
    /// This performs:
    /// 1. Validate the persistent world state
    /// 2. Solve lever and cylinder kinematics from road and frame
    /// 3. Advance the gas chambers at the new volumes
    /// 4. Resolve axial forces into corner vertical forces
    /// 5. Integrate the frame modes (with a half-step retry on divergence)
    /// 6. Check lever/cylinder clearance
    /// 7. Advance time and assemble the snapshot
    ///
    /// An unreachable kinematic input holds the whole previous state for
    /// one tick and flags `kinematics_rejected` instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the persistent world state was already
    /// corrupt before the tick.
    pub fn step(&mut self, world: &mut SuspensionWorld) -> Result<StepResult> {
        // 1. Validate persistent state.
        world.validate()?;

        let dt = world.timestep();
        let method = world.config.simulation.integration;
        let mut warnings = StepWarnings::default();

        // 2. Solve kinematics. The solve is atomic across corners: one
        // unreachable corner rejects the tick and the previous pose is
        // held, so the four corners always describe the same instant.
        let mut poses: [(LeverState, CylinderState); 4] = [(
            world.corners[0].lever,
            world.corners[0].cylinder,
        ); 4];
        let mut rejected = false;
        for corner in pneu_types::CornerId::ALL {
            match world.solve_corner(corner) {
                Ok(pose) => poses[corner.index()] = pose,
                Err(err) => {
                    tracing::warn!(corner = %corner, error = %err, "kinematics rejected");
                    rejected = true;
                    break;
                }
            }
        }

        if rejected {
            warnings.kinematics_rejected = true;
            world.time += dt;
            world.tick += 1;
            for state in &mut world.corners {
                state.starved_head = false;
                state.starved_rod = false;
            }
            return Ok(StepResult {
                snapshot: assemble_snapshot(world, warnings),
            });
        }

        // 3. Advance the gas chambers at this tick's volumes.
        let pneumatic = world.config.pneumatics;
        let mut chambers = [[crate::pneumatics::ChamberUpdate {
            state: world.corners[0].head,
            starved: false,
        }; 2]; 4];
        for corner in pneu_types::CornerId::ALL {
            let i = corner.index();
            let spec = *world.config.cylinder_for(corner.is_front());
            let cylinder = &poses[i].1;
            let head = update_chamber(
                &pneumatic,
                world.masses[i][HEAD],
                cylinder.volume_head,
                spec.dead_volume_head,
                world.valves[i][HEAD],
                dt,
            );
            let rod = update_chamber(
                &pneumatic,
                world.masses[i][ROD],
                cylinder.volume_rod,
                spec.dead_volume_rod,
                world.valves[i][ROD],
                dt,
            );
            world.masses[i] = [head.state.mass, rod.state.mass];
            warnings.starvation_events += u8::from(head.starved) + u8::from(rod.starved);
            if head.starved || rod.starved {
                tracing::debug!(corner = %corner, "chamber starvation clamp");
            }
            chambers[i] = [head, rod];
        }

        // 4. Resolve forces.
        let mut forces = [0.0; 4];
        for corner in pneu_types::CornerId::ALL {
            let i = corner.index();
            let (lever, cylinder) = &poses[i];
            let axial = axial_force(
                &chambers[i][HEAD].state,
                &chambers[i][ROD].state,
                cylinder,
                pneumatic.ambient_pressure,
            );
            forces[i] = corner_vertical_force(axial, stroke_jacobian(lever, cylinder));
        }
        let accel = frame_acceleration(
            &world.config.frame,
            &world.config.geometry,
            world.config.simulation.gravity,
            &forces,
        );

        // 5. Integrate the frame, retrying once at half step on divergence.
        world.frame = integrate_frame(method, world.frame, &accel, dt, world.time, &mut warnings);

        // 6. Clearance check and corner assembly.
        for corner in pneu_types::CornerId::ALL {
            let i = corner.index();
            let (lever, cylinder) = poses[i];
            let spec = world.config.cylinder_for(corner.is_front());
            let interference = if self.config.enable_interference {
                check_interference(&world.config.geometry, spec, &lever, &cylinder)
            } else {
                pneu_types::InterferenceResult::from_clearance(f64::MAX)
            };
            world.corners[i] = CornerState {
                id: corner,
                lever,
                cylinder,
                head: chambers[i][HEAD].state,
                rod: chambers[i][ROD].state,
                interference,
                starved_head: chambers[i][HEAD].starved,
                starved_rod: chambers[i][ROD].starved,
            };
        }

        // 7. Advance time and publish.
        world.time += dt;
        world.tick += 1;

        Ok(StepResult {
            snapshot: assemble_snapshot(world, warnings),
        })
    }

    /// Run for a number of ticks, returning every snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first step error, if any.
    pub fn run(
        &mut self,
        world: &mut SuspensionWorld,
        ticks: u64,
    ) -> Result<Vec<SimulationSnapshot>> {
        #[allow(clippy::cast_possible_truncation)]
        let mut snapshots = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            snapshots.push(self.step(world)?.snapshot);
        }
        Ok(snapshots)
    }
}

/// Integrate the frame one tick, retrying once at half step when the
/// result goes non-finite and holding the previous state when the retry
/// fails too. Both outcomes are recorded in `warnings`.
fn integrate_frame(
    method: IntegrationMethod,
    frame: FrameState,
    accel: &FrameAcceleration,
    dt: f64,
    time: f64,
    warnings: &mut StepWarnings,
) -> FrameState {
    let mut candidate = frame;
    integrate_with_method(method, &mut candidate, accel, dt);
    if !candidate.is_finite() {
        warnings.integration_retried = true;
        tracing::warn!(time, "integration diverged, retrying at half step");
        candidate = frame;
        integrate_with_method(method, &mut candidate, accel, dt / 2.0);
        integrate_with_method(method, &mut candidate, accel, dt / 2.0);
        if !candidate.is_finite() {
            warnings.integration_failed = true;
            tracing::warn!(time, "integration failed, holding frame");
            candidate = frame;
        }
    }
    candidate
}

fn assemble_snapshot(world: &SuspensionWorld, warnings: StepWarnings) -> SimulationSnapshot {
    SimulationSnapshot {
        time: world.time,
        tick: world.tick,
        frame: world.frame,
        corners: world.corners,
        warnings,
    }
}
