//! Engine configuration.
//!
//! Configuration is loaded once at startup and mutated only through
//! parameter-change commands applied between ticks. Every type here
//! validates itself with a [`SuspensionError::Configuration`] before the
//! engine will start.
//!
//! [`SuspensionError::Configuration`]: crate::SuspensionError

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SuspensionError};

/// Designer-facing bounds on the geometric parameters.
///
/// Immutable once loaded; read by the constraint solver when validating
/// parameter-change commands.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometricBounds {
    /// Minimum arm length (m).
    pub arm_length_min: f64,
    /// Maximum arm length (m).
    pub arm_length_max: f64,
    /// Minimum pivot offset from the frame center line (m).
    pub pivot_offset_min: f64,
    /// Maximum pivot offset (m).
    pub pivot_offset_max: f64,
    /// Minimum rod attach fraction.
    pub rod_attach_fraction_min: f64,
    /// Maximum rod attach fraction.
    pub rod_attach_fraction_max: f64,
}

impl Default for GeometricBounds {
    fn default() -> Self {
        Self {
            arm_length_min: 0.1,
            arm_length_max: 1.0,
            pivot_offset_min: 0.05,
            pivot_offset_max: 1.0,
            rod_attach_fraction_min: 0.1,
            rod_attach_fraction_max: 0.9,
        }
    }
}

impl GeometricBounds {
    /// Whether an arm length lies within bounds.
    #[must_use]
    pub fn contains_arm_length(&self, value: f64) -> bool {
        (self.arm_length_min..=self.arm_length_max).contains(&value)
    }

    /// Whether a pivot offset lies within bounds.
    #[must_use]
    pub fn contains_pivot_offset(&self, value: f64) -> bool {
        (self.pivot_offset_min..=self.pivot_offset_max).contains(&value)
    }

    /// Whether a rod attach fraction lies within bounds.
    #[must_use]
    pub fn contains_rod_attach_fraction(&self, value: f64) -> bool {
        (self.rod_attach_fraction_min..=self.rod_attach_fraction_max).contains(&value)
    }

    /// Validate internal consistency of the bounds themselves.
    pub fn validate(&self) -> Result<()> {
        if self.arm_length_min <= 0.0 || self.arm_length_min > self.arm_length_max {
            return Err(SuspensionError::configuration("arm length bounds are empty"));
        }
        if self.pivot_offset_min <= 0.0 || self.pivot_offset_min > self.pivot_offset_max {
            return Err(SuspensionError::configuration(
                "pivot offset bounds are empty",
            ));
        }
        if self.rod_attach_fraction_min < 0.1 || self.rod_attach_fraction_max > 0.9 {
            return Err(SuspensionError::configuration(
                "rod attach fraction bounds must stay within [0.1, 0.9]",
            ));
        }
        Ok(())
    }
}

/// Lever and mounting geometry, shared by all four corners.
///
/// The corner plane has the pivot at the origin with the lever pointing
/// outward along +X. The track invariant `track == 2 * (arm_length +
/// pivot_offset)` is enforced by the constraint solver on every mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuspensionGeometry {
    /// Lever arm length L (m).
    pub arm_length: f64,
    /// Pivot offset from the frame center line (m).
    pub pivot_offset: f64,
    /// Track width (m); always `2 * (arm_length + pivot_offset)`.
    pub track: f64,
    /// Fraction of L at which the cylinder rod attaches.
    pub rod_attach_fraction: f64,
    /// Maximum free-end vertical travel (m); at most `2 * arm_length`.
    pub max_vertical_travel: f64,
    /// Capsule radius used for the lever arm in interference checks (m).
    pub arm_radius: f64,
    /// Capsule radius used for the cylinder body in interference checks (m).
    pub cylinder_radius: f64,
    /// Frame-side cylinder hinge, relative to the pivot (m).
    pub frame_hinge_offset: Vector2<f64>,
    /// Hinge-to-hinge distance at which the piston is centered (m).
    /// `None` uses the distance at zero lever angle.
    pub cylinder_neutral_length: Option<f64>,
}

impl Default for SuspensionGeometry {
    fn default() -> Self {
        Self {
            arm_length: 0.4,
            pivot_offset: 0.3,
            track: 1.4,
            rod_attach_fraction: 0.7,
            max_vertical_travel: 0.6,
            arm_radius: 0.025,
            cylinder_radius: 0.05,
            frame_hinge_offset: Vector2::new(0.28, -0.5),
            cylinder_neutral_length: None,
        }
    }
}

impl SuspensionGeometry {
    /// Validate the geometry against the designer bounds.
    pub fn validate(&self, bounds: &GeometricBounds) -> Result<()> {
        if !bounds.contains_arm_length(self.arm_length) {
            return Err(SuspensionError::configuration(format!(
                "arm length {} m outside bounds [{}, {}]",
                self.arm_length, bounds.arm_length_min, bounds.arm_length_max
            )));
        }
        if !bounds.contains_pivot_offset(self.pivot_offset) {
            return Err(SuspensionError::configuration(format!(
                "pivot offset {} m outside bounds [{}, {}]",
                self.pivot_offset, bounds.pivot_offset_min, bounds.pivot_offset_max
            )));
        }
        if !bounds.contains_rod_attach_fraction(self.rod_attach_fraction) {
            return Err(SuspensionError::configuration(format!(
                "rod attach fraction {} outside bounds [{}, {}]",
                self.rod_attach_fraction,
                bounds.rod_attach_fraction_min,
                bounds.rod_attach_fraction_max
            )));
        }
        let expected_track = 2.0 * (self.arm_length + self.pivot_offset);
        if (self.track - expected_track).abs() > 1e-9 {
            return Err(SuspensionError::configuration(format!(
                "track {} m violates track == 2 * (arm_length + pivot_offset) = {} m",
                self.track, expected_track
            )));
        }
        if self.max_vertical_travel <= 0.0 || self.max_vertical_travel > 2.0 * self.arm_length {
            return Err(SuspensionError::configuration(format!(
                "max vertical travel {} m must be in (0, {}]",
                self.max_vertical_travel,
                2.0 * self.arm_length
            )));
        }
        if self.arm_radius <= 0.0 || self.cylinder_radius <= 0.0 {
            return Err(SuspensionError::configuration(
                "interference radii must be positive",
            ));
        }
        Ok(())
    }
}

/// Bore, stroke, and dead-volume parameters of one cylinder model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CylinderSpec {
    /// Inner bore diameter (m).
    pub bore: f64,
    /// Rod diameter (m).
    pub rod_diameter: f64,
    /// Full piston stroke S_max (m); displacement is clamped to +-S_max/2.
    pub max_stroke: f64,
    /// Head-chamber dead volume at full compression (m^3).
    pub dead_volume_head: f64,
    /// Rod-chamber dead volume at full extension (m^3).
    pub dead_volume_rod: f64,
}

impl Default for CylinderSpec {
    fn default() -> Self {
        Self {
            bore: 0.080,
            rod_diameter: 0.032,
            max_stroke: 0.230,
            dead_volume_head: 50.0e-6,
            dead_volume_rod: 50.0e-6,
        }
    }
}

impl CylinderSpec {
    /// Head-side piston area (m^2).
    #[must_use]
    pub fn area_head(&self) -> f64 {
        std::f64::consts::PI * (self.bore / 2.0).powi(2)
    }

    /// Rod-side annular piston area (m^2).
    #[must_use]
    pub fn area_rod(&self) -> f64 {
        self.area_head() - std::f64::consts::PI * (self.rod_diameter / 2.0).powi(2)
    }

    /// Head-chamber volume at a given stroke (m^3).
    #[must_use]
    pub fn volume_head(&self, stroke: f64) -> f64 {
        self.dead_volume_head + self.area_head() * (self.max_stroke / 2.0 + stroke)
    }

    /// Rod-chamber volume at a given stroke (m^3).
    #[must_use]
    pub fn volume_rod(&self, stroke: f64) -> f64 {
        self.dead_volume_rod + self.area_rod() * (self.max_stroke / 2.0 - stroke)
    }

    /// Validate basic dimensional sanity.
    ///
    /// The dead-volume floor invariant is checked by the constraint solver,
    /// which owns all cross-parameter invariants.
    pub fn validate(&self) -> Result<()> {
        if self.bore <= 0.0 || self.max_stroke <= 0.0 {
            return Err(SuspensionError::configuration(
                "bore and stroke must be positive",
            ));
        }
        if self.rod_diameter <= 0.0 || self.rod_diameter >= self.bore {
            return Err(SuspensionError::configuration(format!(
                "rod diameter {} m must be in (0, bore = {} m)",
                self.rod_diameter, self.bore
            )));
        }
        if self.dead_volume_head <= 0.0 || self.dead_volume_rod <= 0.0 {
            return Err(SuspensionError::configuration(
                "dead volumes must be positive",
            ));
        }
        Ok(())
    }
}

/// Gas and valve constants shared by all chambers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PneumaticConfig {
    /// Specific gas constant R (J/(kg K)).
    pub gas_constant: f64,
    /// Gas temperature (K), held constant (isothermal model).
    pub temperature: f64,
    /// Supply pressure (Pa, absolute).
    pub supply_pressure: f64,
    /// Ambient pressure (Pa, absolute).
    pub ambient_pressure: f64,
    /// Initial head-chamber fill pressure (Pa, absolute).
    pub fill_pressure_head: f64,
    /// Initial rod-chamber fill pressure (Pa, absolute).
    pub fill_pressure_rod: f64,
    /// Effective valve orifice area (m^2).
    pub valve_area: f64,
    /// Valve flow coefficient (kg/(s m^2 Pa)).
    pub flow_coefficient: f64,
    /// Euler sub-steps per tick for the mass-flow integration.
    pub substeps: u32,
}

impl Default for PneumaticConfig {
    fn default() -> Self {
        Self {
            gas_constant: 287.05,
            temperature: 293.15,
            supply_pressure: 800_000.0,
            ambient_pressure: 101_325.0,
            fill_pressure_head: 200_000.0,
            fill_pressure_rod: 400_000.0,
            valve_area: 2.0e-5,
            flow_coefficient: 2.0e-3,
            substeps: 4,
        }
    }
}

impl PneumaticConfig {
    /// Validate the pneumatic constants.
    pub fn validate(&self) -> Result<()> {
        if self.gas_constant <= 0.0 || self.temperature <= 0.0 {
            return Err(SuspensionError::configuration(
                "gas constant and temperature must be positive",
            ));
        }
        if self.ambient_pressure <= 0.0 || self.supply_pressure <= self.ambient_pressure {
            return Err(SuspensionError::configuration(
                "supply pressure must exceed ambient pressure",
            ));
        }
        for (name, p) in [
            ("head fill pressure", self.fill_pressure_head),
            ("rod fill pressure", self.fill_pressure_rod),
        ] {
            if p < self.ambient_pressure || p > self.supply_pressure {
                return Err(SuspensionError::configuration(format!(
                    "{name} {p} Pa must lie between ambient and supply"
                )));
            }
        }
        if self.valve_area <= 0.0 || self.flow_coefficient <= 0.0 {
            return Err(SuspensionError::configuration(
                "valve area and flow coefficient must be positive",
            ));
        }
        if self.substeps == 0 {
            return Err(SuspensionError::configuration(
                "at least one pneumatic substep is required",
            ));
        }
        Ok(())
    }
}

/// Inertial properties of the sprung frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameConfig {
    /// Sprung mass (kg).
    pub sprung_mass: f64,
    /// Roll inertia about the longitudinal axis (kg m^2).
    pub roll_inertia: f64,
    /// Pitch inertia about the lateral axis (kg m^2).
    pub pitch_inertia: f64,
    /// Wheelbase (m).
    pub wheelbase: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            sprung_mass: 250.0,
            roll_inertia: 40.0,
            pitch_inertia: 100.0,
            wheelbase: 2.4,
        }
    }
}

impl FrameConfig {
    /// Validate the inertial properties.
    pub fn validate(&self) -> Result<()> {
        if self.sprung_mass <= 0.0 {
            return Err(SuspensionError::configuration(
                "sprung mass must be positive",
            ));
        }
        if self.roll_inertia <= 0.0 || self.pitch_inertia <= 0.0 {
            return Err(SuspensionError::configuration("inertias must be positive"));
        }
        if self.wheelbase <= 0.0 {
            return Err(SuspensionError::configuration("wheelbase must be positive"));
        }
        Ok(())
    }
}

/// Integration method for the frame dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntegrationMethod {
    /// Explicit Euler (first-order, cheapest, least stable).
    ExplicitEuler,
    /// Semi-implicit Euler (symplectic, default).
    SemiImplicitEuler,
    /// 4th-order Runge-Kutta over the modal state.
    RungeKutta4,
}

impl IntegrationMethod {
    /// Order of accuracy of this method.
    #[must_use]
    pub const fn order(self) -> usize {
        match self {
            Self::ExplicitEuler | Self::SemiImplicitEuler => 1,
            Self::RungeKutta4 => 4,
        }
    }
}

impl std::fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExplicitEuler => write!(f, "Explicit Euler"),
            Self::SemiImplicitEuler => write!(f, "Semi-Implicit Euler"),
            Self::RungeKutta4 => write!(f, "RK4"),
        }
    }
}

/// Stepping configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed timestep (s).
    pub timestep: f64,
    /// Frame integration method.
    pub integration: IntegrationMethod,
    /// Gravitational acceleration (m/s^2), positive down.
    pub gravity: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 240.0,
            integration: IntegrationMethod::SemiImplicitEuler,
            gravity: 9.81,
        }
    }
}

impl SimulationConfig {
    /// Configuration paced for a 60 Hz visual consumer.
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            ..Default::default()
        }
    }

    /// High-fidelity configuration (1 kHz, RK4).
    #[must_use]
    pub fn high_fidelity() -> Self {
        Self {
            timestep: 1.0 / 1000.0,
            integration: IntegrationMethod::RungeKutta4,
            ..Default::default()
        }
    }

    /// Set the integration method.
    #[must_use]
    pub fn integration(mut self, method: IntegrationMethod) -> Self {
        self.integration = method;
        self
    }

    /// Steps per second.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }

    /// Validate the stepping configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(SuspensionError::configuration(format!(
                "timestep {} s must be positive and finite",
                self.timestep
            )));
        }
        if self.timestep > 1.0 {
            return Err(SuspensionError::configuration(
                "timestep > 1 second is likely an error",
            ));
        }
        if self.gravity < 0.0 {
            return Err(SuspensionError::configuration(
                "gravity is a magnitude and cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration.
///
/// Front and rear axles carry separate cylinder specs so that linked
/// parameters (rod diameters) have something to synchronize.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Designer bounds for parameter changes.
    pub bounds: GeometricBounds,
    /// Lever and mounting geometry.
    pub geometry: SuspensionGeometry,
    /// Front-axle cylinder spec.
    pub cylinder_front: CylinderSpec,
    /// Rear-axle cylinder spec.
    pub cylinder_rear: CylinderSpec,
    /// Gas and valve constants.
    pub pneumatics: PneumaticConfig,
    /// Frame inertial properties.
    pub frame: FrameConfig,
    /// Stepping configuration.
    pub simulation: SimulationConfig,
    /// Whether front/rear rod diameters are kept synchronized.
    pub link_rod_diameters: bool,
}

impl EngineConfig {
    /// Validate every section.
    ///
    /// Cross-parameter invariants (dead-volume floor, track identity) are
    /// checked again by the constraint solver before a world starts.
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        self.geometry.validate(&self.bounds)?;
        self.cylinder_front.validate()?;
        self.cylinder_rear.validate()?;
        self.pneumatics.validate()?;
        self.frame.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    /// Cylinder spec for a given axle.
    #[must_use]
    pub fn cylinder_for(&self, front: bool) -> &CylinderSpec {
        if front {
            &self.cylinder_front
        } else {
            &self.cylinder_rear
        }
    }
}
