//! Force resolution and frame accelerations.
//!
//! Gas pressures become an axial cylinder force, the kinematic gain of the
//! linkage turns that into a vertical force at each corner, and the four
//! corner forces drive the three modal accelerations of the frame.

use pneu_types::{CornerId, CylinderState, FrameConfig, GasChamberState, SuspensionGeometry};

/// Accelerations of the three frame modes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameAcceleration {
    /// Heave acceleration (m/s^2), positive up.
    pub heave: f64,
    /// Roll acceleration (rad/s^2).
    pub roll: f64,
    /// Pitch acceleration (rad/s^2).
    pub pitch: f64,
}

impl FrameAcceleration {
    /// Check that all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.heave.is_finite() && self.roll.is_finite() && self.pitch.is_finite()
    }
}

/// Net axial force of one cylinder (N), positive extending.
///
/// Both chamber pressures are absolute, so ambient pressure acting on the
/// exposed rod cross-section is subtracted explicitly.
#[must_use]
pub fn axial_force(
    head: &GasChamberState,
    rod: &GasChamberState,
    cylinder: &CylinderState,
    ambient_pressure: f64,
) -> f64 {
    head.pressure * cylinder.area_head
        - rod.pressure * cylinder.area_rod
        - ambient_pressure * (cylinder.area_head - cylinder.area_rod)
}

/// Vertical force at the wheel from an axial cylinder force.
///
/// `jacobian` is the stroke sensitivity from
/// [`crate::cylinder::stroke_jacobian`]. The sign flip comes from virtual
/// work: the free-end height enters the stroke through the road-minus-frame
/// difference, so a force resisting extension pushes the frame up.
#[must_use]
pub fn corner_vertical_force(axial: f64, jacobian: f64) -> f64 {
    -axial * jacobian
}

/// Modal accelerations from the four corner forces.
///
/// `forces` is indexed by [`CornerId::index`]. Gravity acts on heave only;
/// roll and pitch moments use the half-track and half-wheelbase lever arms.
#[must_use]
pub fn frame_acceleration(
    frame: &FrameConfig,
    geometry: &SuspensionGeometry,
    gravity: f64,
    forces: &[f64; 4],
) -> FrameAcceleration {
    let mut total = 0.0;
    let mut roll_moment = 0.0;
    let mut pitch_moment = 0.0;
    for corner in CornerId::ALL {
        let force = forces[corner.index()];
        total += force;
        roll_moment += corner.lateral_sign() * 0.5 * geometry.track * force;
        pitch_moment += corner.longitudinal_sign() * 0.5 * frame.wheelbase * force;
    }
    FrameAcceleration {
        heave: total / frame.sprung_mass - gravity,
        roll: roll_moment / frame.roll_inertia,
        pitch: pitch_moment / frame.pitch_inertia,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pneu_types::{CylinderSpec, FrameConfig};

    fn gas(pressure: f64, volume: f64) -> GasChamberState {
        GasChamberState {
            pressure,
            mass: 1.0e-3,
            volume,
            temperature: 293.15,
        }
    }

    fn cylinder() -> CylinderState {
        let spec = CylinderSpec::default();
        CylinderState {
            frame_hinge: nalgebra::Point2::new(0.28, -0.5),
            rod_hinge: nalgebra::Point2::new(0.28, 0.0),
            stroke: 0.0,
            stroke_velocity: 0.0,
            volume_head: spec.volume_head(0.0),
            volume_rod: spec.volume_rod(0.0),
            area_head: spec.area_head(),
            area_rod: spec.area_rod(),
            distance: 0.5,
            axis_angle: std::f64::consts::FRAC_PI_2,
        }
    }

    #[test]
    fn test_axial_force_balanced_at_ambient() {
        // Both chambers at ambient: the pressure force on the piston faces
        // cancels the ambient force on the rod area exactly.
        let cyl = cylinder();
        let p = 101_325.0;
        let f = axial_force(&gas(p, cyl.volume_head), &gas(p, cyl.volume_rod), &cyl, p);
        assert_relative_eq!(f, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_axial_force_head_pressure_extends() {
        let cyl = cylinder();
        let f = axial_force(
            &gas(400_000.0, cyl.volume_head),
            &gas(101_325.0, cyl.volume_rod),
            &cyl,
            101_325.0,
        );
        // (p_head - p_amb) * A_head with the rod chamber at ambient.
        assert_relative_eq!(
            f,
            (400_000.0 - 101_325.0) * cyl.area_head,
            epsilon = 1e-6
        );
        assert!(f > 0.0);
    }

    #[test]
    fn test_rod_pressure_resists_extension() {
        let cyl = cylinder();
        let f = axial_force(
            &gas(101_325.0, cyl.volume_head),
            &gas(400_000.0, cyl.volume_rod),
            &cyl,
            101_325.0,
        );
        assert!(f < 0.0);
        // A retracting force through a positive gain lifts the frame.
        assert!(corner_vertical_force(f, 0.7) > 0.0);
    }

    #[test]
    fn test_equilibrium_heave() {
        let frame = FrameConfig::default();
        let geometry = pneu_types::SuspensionGeometry::default();
        let per_corner = frame.sprung_mass * 9.81 / 4.0;
        let accel = frame_acceleration(&frame, &geometry, 9.81, &[per_corner; 4]);
        assert_relative_eq!(accel.heave, 0.0, epsilon = 1e-9);
        assert_relative_eq!(accel.roll, 0.0, epsilon = 1e-9);
        assert_relative_eq!(accel.pitch, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_left_heavy_forces_roll_positive() {
        let frame = FrameConfig::default();
        let geometry = pneu_types::SuspensionGeometry::default();
        // Extra lift on the left corners rolls the frame left-side-up.
        let accel = frame_acceleration(&frame, &geometry, 0.0, &[700.0, 500.0, 700.0, 500.0]);
        assert!(accel.roll > 0.0);
        assert_relative_eq!(accel.pitch, 0.0, epsilon = 1e-9);
        // 2 * 200 N * 0.7 m lever / 40 kg m^2.
        assert_relative_eq!(accel.roll, 400.0 * 0.7 / 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_front_heavy_forces_pitch_positive() {
        let frame = FrameConfig::default();
        let geometry = pneu_types::SuspensionGeometry::default();
        let accel = frame_acceleration(&frame, &geometry, 0.0, &[700.0, 700.0, 500.0, 500.0]);
        assert!(accel.pitch > 0.0);
        assert_relative_eq!(accel.roll, 0.0, epsilon = 1e-9);
    }
}
