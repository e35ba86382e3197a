//! Lever/cylinder clearance check.
//!
//! Both bodies are modeled as capsules in the corner plane: the lever's
//! outer span from the attach point to the free end (the region near the
//! pivot structurally cannot reach the cylinder), and the cylinder barrel
//! from the frame hinge part-way up the axis. The rod itself is excluded,
//! since it legitimately meets the lever at the attach point. The check is
//! advisory; a hit is reported in the snapshot and never stops the
//! simulation.

use pneu_types::{CylinderSpec, CylinderState, InterferenceResult, LeverState, SuspensionGeometry};

use crate::constraint::neutral_length;
use crate::geometry::capsule_clearance;

/// Clearance between the lever capsule and the cylinder barrel capsule.
#[must_use]
pub fn check_interference(
    geometry: &SuspensionGeometry,
    spec: &CylinderSpec,
    lever: &LeverState,
    cylinder: &CylinderState,
) -> InterferenceResult {
    // The barrel is a fixed length of the axis measured from the frame
    // hinge: the neutral length minus the half-stroke, so the rod is never
    // fully swallowed. It cannot reach past the rod hinge.
    let barrel_length = (neutral_length(geometry) - spec.max_stroke / 2.0)
        .clamp(0.0, cylinder.distance);
    let axis = (cylinder.rod_hinge - cylinder.frame_hinge) / cylinder.distance;
    let barrel_end = cylinder.frame_hinge + axis * barrel_length;

    InterferenceResult::from_clearance(capsule_clearance(
        lever.attach,
        lever.free_end,
        geometry.arm_radius,
        cylinder.frame_hinge,
        barrel_end,
        geometry.cylinder_radius,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cylinder::solve_cylinder;
    use crate::lever::solve_lever;
    use approx::assert_relative_eq;

    fn check_at(y: f64) -> InterferenceResult {
        let geometry = SuspensionGeometry::default();
        let spec = CylinderSpec::default();
        let lever = solve_lever(&geometry, y, 0.0).unwrap();
        let cylinder = solve_cylinder(&geometry, &spec, &lever).unwrap();
        check_interference(&geometry, &spec, &lever, &cylinder)
    }

    #[test]
    fn test_clear_at_neutral() {
        let result = check_at(0.0);
        assert!(!result.is_interfering);
        // Barrel top sits 0.115 m below the level lever; radii sum to 0.075.
        assert_relative_eq!(result.clearance, 0.04, epsilon = 1e-9);
        assert_relative_eq!(result.penetration(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_raising_the_lever_opens_clearance() {
        let neutral = check_at(0.0);
        let raised = check_at(0.1);
        assert!(!raised.is_interfering);
        assert!(raised.clearance > neutral.clearance);
    }

    #[test]
    fn test_lowering_the_lever_interferes() {
        let lowered = check_at(-0.1);
        assert!(lowered.is_interfering);
        assert!(lowered.clearance < 0.0);
        assert!(lowered.penetration() > 0.0);
    }

    #[test]
    fn test_thin_capsules_do_not_interfere() {
        let geometry = SuspensionGeometry {
            arm_radius: 0.001,
            cylinder_radius: 0.001,
            ..Default::default()
        };
        let spec = CylinderSpec::default();
        let lever = solve_lever(&geometry, -0.1, 0.0).unwrap();
        let cylinder = solve_cylinder(&geometry, &spec, &lever).unwrap();
        let result = check_interference(&geometry, &spec, &lever, &cylinder);
        assert!(!result.is_interfering);
    }
}
