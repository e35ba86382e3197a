//! Simulation world state.
//!
//! The world owns everything that persists across ticks: the validated
//! configuration, the frame state, per-chamber gas masses, and the latest
//! valve and road inputs. Corner kinematics are derived state, recomputed
//! every tick by the stepper and cached here for the snapshot.

use pneu_types::{
    CornerId, CornerState, CylinderState, EngineConfig, FrameState, GasChamberState,
    InterferenceResult, LeverState, ParameterUpdate, Result, SuspensionError,
};

use crate::constraint;
use crate::cylinder::solve_cylinder;
use crate::interference::check_interference;
use crate::lever::solve_lever;
use crate::pneumatics;

/// Index of the head chamber in per-corner pairs.
pub(crate) const HEAD: usize = 0;
/// Index of the rod chamber in per-corner pairs.
pub(crate) const ROD: usize = 1;

/// The four-corner suspension world.
#[derive(Debug, Clone)]
pub struct SuspensionWorld {
    /// Active configuration; mutated only through [`Self::apply_update`].
    pub(crate) config: EngineConfig,
    /// Configuration the world was built with, restored on reset.
    initial_config: EngineConfig,
    /// Frame pose and rates.
    pub(crate) frame: FrameState,
    /// Simulation time (s).
    pub(crate) time: f64,
    /// Tick counter.
    pub(crate) tick: u64,
    /// Gas mass per corner, `[head, rod]` (kg).
    pub(crate) masses: [[f64; 2]; 4],
    /// Valve commands per corner, `[head, rod]`, each in [-1, 1].
    pub(crate) valves: [[f64; 2]; 4],
    /// Road input per corner, `[height, rate]` (m, m/s).
    pub(crate) road: [[f64; 2]; 4],
    /// Last fully-solved corner states.
    pub(crate) corners: [CornerState; 4],
}

impl SuspensionWorld {
    /// Build a world from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionError::Configuration`] when the configuration
    /// violates a geometric or pneumatic invariant, and
    /// [`SuspensionError::OutOfRange`] if the initial pose is unreachable.
    pub fn new(config: EngineConfig) -> Result<Self> {
        constraint::validate_config(&config)?;

        let frame = FrameState::at_rest();
        let road = [[0.0; 2]; 4];
        let mut masses = [[0.0; 2]; 4];
        let mut corners = [init_corner(CornerId::FrontLeft); 4];

        for corner in CornerId::ALL {
            let (lever, cylinder) = solve_corner_pose(&config, &frame, &road, corner)?;
            let pneumatic = &config.pneumatics;
            masses[corner.index()] = [
                pneumatics::fill_mass(pneumatic, pneumatic.fill_pressure_head, cylinder.volume_head),
                pneumatics::fill_mass(pneumatic, pneumatic.fill_pressure_rod, cylinder.volume_rod),
            ];
            let spec = config.cylinder_for(corner.is_front());
            corners[corner.index()] = CornerState {
                id: corner,
                lever,
                cylinder,
                head: GasChamberState {
                    pressure: pneumatic.fill_pressure_head,
                    mass: masses[corner.index()][HEAD],
                    volume: cylinder.volume_head,
                    temperature: pneumatic.temperature,
                },
                rod: GasChamberState {
                    pressure: pneumatic.fill_pressure_rod,
                    mass: masses[corner.index()][ROD],
                    volume: cylinder.volume_rod,
                    temperature: pneumatic.temperature,
                },
                interference: check_interference(&config.geometry, spec, &lever, &cylinder),
                starved_head: false,
                starved_rod: false,
            };
        }

        Ok(Self {
            initial_config: config.clone(),
            config,
            frame,
            time: 0.0,
            tick: 0,
            masses,
            valves: [[0.0; 2]; 4],
            road,
            corners,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current frame state.
    #[must_use]
    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    /// Current simulation time (s).
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Fixed timestep (s).
    #[must_use]
    pub fn timestep(&self) -> f64 {
        self.config.simulation.timestep
    }

    /// Latest solved state of one corner.
    #[must_use]
    pub fn corner(&self, id: CornerId) -> &CornerState {
        &self.corners[id.index()]
    }

    /// Apply one parameter update.
    ///
    /// Valve and road inputs are stored directly; geometric updates go
    /// through the constraint solver and are rejected as a unit if any
    /// invariant would break. Gas mass is conserved across geometric
    /// changes, so pressures settle at the next tick's volumes.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionError::Configuration`] for a rejected geometric
    /// update.
    pub fn apply_update(&mut self, update: &ParameterUpdate) -> Result<()> {
        match *update {
            ParameterUpdate::ValveCommand { corner, head, rod } => {
                self.valves[corner.index()] = [head.clamp(-1.0, 1.0), rod.clamp(-1.0, 1.0)];
                Ok(())
            }
            ParameterUpdate::RoadExcitation { corner, height, rate } => {
                if !height.is_finite() || !rate.is_finite() {
                    return Err(SuspensionError::configuration(
                        "road excitation must be finite",
                    ));
                }
                self.road[corner.index()] = [height, rate];
                Ok(())
            }
            _ => constraint::apply_update(&mut self.config, update),
        }
    }

    /// Discard all state and return to the initial configuration.
    ///
    /// # Errors
    ///
    /// Never fails in practice: the initial configuration already passed
    /// validation once.
    pub fn reset(&mut self) -> Result<()> {
        *self = Self::new(self.initial_config.clone())?;
        Ok(())
    }

    /// Check that the persistent state is finite.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionError::IntegrationFailure`] when the frame state
    /// has gone non-finite, which only an external mutation can cause
    /// between ticks.
    pub fn validate(&self) -> Result<()> {
        if !self.frame.is_finite() {
            return Err(SuspensionError::IntegrationFailure {
                time: self.time,
                timestep: self.timestep(),
            });
        }
        Ok(())
    }

    /// Solve lever and cylinder kinematics for one corner at the current
    /// frame and road state.
    pub(crate) fn solve_corner(&self, corner: CornerId) -> Result<(LeverState, CylinderState)> {
        solve_corner_pose(&self.config, &self.frame, &self.road, corner)
    }
}

/// Free-standing solve so construction can use it before `self` exists.
fn solve_corner_pose(
    config: &EngineConfig,
    frame: &FrameState,
    road: &[[f64; 2]; 4],
    corner: CornerId,
) -> Result<(LeverState, CylinderState)> {
    let geometry = &config.geometry;
    let [height, rate] = road[corner.index()];
    let free_end_y =
        height - frame.corner_heave(corner, geometry.track, config.frame.wheelbase);
    let free_end_rate =
        rate - frame.corner_heave_rate(corner, geometry.track, config.frame.wheelbase);

    let lever = solve_lever(geometry, free_end_y, free_end_rate)?;
    let cylinder = solve_cylinder(geometry, config.cylinder_for(corner.is_front()), &lever)?;
    Ok((lever, cylinder))
}

/// Placeholder corner used only during array initialization.
fn init_corner(id: CornerId) -> CornerState {
    let zero = nalgebra::Point2::origin();
    CornerState {
        id,
        lever: LeverState {
            pivot: zero,
            attach: zero,
            free_end: zero,
            angle: 0.0,
            angular_velocity: 0.0,
            arm_length: 0.0,
            rod_attach_fraction: 0.0,
        },
        cylinder: CylinderState {
            frame_hinge: zero,
            rod_hinge: zero,
            stroke: 0.0,
            stroke_velocity: 0.0,
            volume_head: 0.0,
            volume_rod: 0.0,
            area_head: 0.0,
            area_rod: 0.0,
            distance: 0.0,
            axis_angle: 0.0,
        },
        head: GasChamberState {
            pressure: 0.0,
            mass: 0.0,
            volume: 0.0,
            temperature: 0.0,
        },
        rod: GasChamberState {
            pressure: 0.0,
            mass: 0.0,
            volume: 0.0,
            temperature: 0.0,
        },
        interference: InterferenceResult::from_clearance(f64::INFINITY),
        starved_head: false,
        starved_rod: false,
    }
}
