//! Cylinder kinematics.
//!
//! The cylinder barrel hinges on the frame and its rod hinges on the lever
//! attach point. Piston displacement is the hinge-to-hinge distance minus
//! the neutral length, clamped to the stroke limits; chamber volumes follow
//! from the displacement.

use nalgebra::{Point2, Vector2};
use pneu_types::{CylinderSpec, CylinderState, LeverState, Result, SuspensionError, SuspensionGeometry};

use crate::constraint::neutral_length;

/// Below this hinge-to-hinge distance the axis direction is undefined.
const MIN_CYLINDER_LENGTH: f64 = 1e-9;

/// Angular-rate singularity guard near a vertical lever.
const MIN_COS_ANGLE: f64 = 1e-6;

/// Solve the cylinder state from a solved lever pose.
///
/// # Errors
///
/// Returns [`SuspensionError::OutOfRange`] if the rod hinge has collapsed
/// onto the frame hinge, which leaves the cylinder axis undefined.
pub fn solve_cylinder(
    geometry: &SuspensionGeometry,
    spec: &CylinderSpec,
    lever: &LeverState,
) -> Result<CylinderState> {
    let frame_hinge = Point2::origin() + geometry.frame_hinge_offset;
    let axis = lever.attach - frame_hinge;
    let distance = axis.norm();
    if distance < MIN_CYLINDER_LENGTH {
        return Err(SuspensionError::out_of_range(
            "cylinder length",
            distance,
            MIN_CYLINDER_LENGTH,
        ));
    }
    let unit = axis / distance;

    let half_stroke = spec.max_stroke / 2.0;
    let raw_stroke = distance - neutral_length(geometry);
    let stroke = raw_stroke.clamp(-half_stroke, half_stroke);
    let on_stop = raw_stroke.abs() > half_stroke;

    // Rate of the hinge-to-hinge distance; zero while the piston is held
    // against an end stop.
    let stroke_velocity = if on_stop {
        0.0
    } else {
        unit.dot(&attach_velocity(lever))
    };

    Ok(CylinderState {
        frame_hinge,
        rod_hinge: lever.attach,
        stroke,
        stroke_velocity,
        volume_head: spec.volume_head(stroke),
        volume_rod: spec.volume_rod(stroke),
        area_head: spec.area_head(),
        area_rod: spec.area_rod(),
        distance,
        axis_angle: axis.y.atan2(axis.x),
    })
}

/// Velocity of the lever attach point in the corner plane.
fn attach_velocity(lever: &LeverState) -> Vector2<f64> {
    let radius = lever.rod_attach_fraction * lever.arm_length;
    let (sin, cos) = lever.angle.sin_cos();
    Vector2::new(-sin, cos) * (radius * lever.angular_velocity)
}

/// Sensitivity of the hinge-to-hinge distance to the free-end height.
///
/// This is the kinematic gain through which an axial cylinder force becomes
/// a vertical force at the wheel; it goes to zero near a vertical lever.
#[must_use]
pub fn stroke_jacobian(lever: &LeverState, cylinder: &CylinderState) -> f64 {
    let (sin, cos) = lever.angle.sin_cos();
    if cos < MIN_COS_ANGLE {
        return 0.0;
    }
    let unit = (cylinder.rod_hinge - cylinder.frame_hinge) / cylinder.distance;
    let radius = lever.rod_attach_fraction * lever.arm_length;
    // dD/dtheta projected through dtheta/dy = 1 / (L cos(theta)).
    unit.dot(&(Vector2::new(-sin, cos) * radius)) / (lever.arm_length * cos)
}
