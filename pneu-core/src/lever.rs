//! Lever arm kinematics.
//!
//! The lever rotates about a frame-mounted pivot at the origin of its
//! corner plane. Its free end carries the wheel and is driven vertically by
//! the road input relative to the frame; the angle follows from that height
//! alone, so the solve is closed-form.

use nalgebra::Point2;
use pneu_types::{LeverState, Result, SuspensionError, SuspensionGeometry};

/// Angular-rate singularity guard near a vertical lever.
const MIN_COS_ANGLE: f64 = 1e-6;

/// Solve the lever pose for a free-end height relative to the pivot.
///
/// `free_end_y` and `free_end_rate` are the vertical position and velocity
/// of the free end in the corner plane. The height is limited by the
/// configured vertical travel and by the arm length itself.
///
/// # Errors
///
/// Returns [`SuspensionError::OutOfRange`] when the free end is asked to
/// move beyond the reachable travel.
pub fn solve_lever(
    geometry: &SuspensionGeometry,
    free_end_y: f64,
    free_end_rate: f64,
) -> Result<LeverState> {
    let length = geometry.arm_length;
    let limit = (geometry.max_vertical_travel / 2.0).min(length);
    if !free_end_y.is_finite() || free_end_y.abs() > limit {
        return Err(SuspensionError::out_of_range(
            "free end height",
            free_end_y,
            limit,
        ));
    }

    let sin = free_end_y / length;
    let angle = sin.asin();
    let cos = (1.0 - sin * sin).max(0.0).sqrt();

    // y = L sin(theta), so theta_dot = y_dot / (L cos(theta)).
    let angular_velocity = if cos < MIN_COS_ANGLE {
        0.0
    } else {
        free_end_rate / (length * cos)
    };

    let fraction = geometry.rod_attach_fraction;
    Ok(LeverState {
        pivot: Point2::origin(),
        attach: Point2::new(fraction * length * cos, fraction * length * sin),
        free_end: Point2::new(length * cos, length * sin),
        angle,
        angular_velocity,
        arm_length: length,
        rod_attach_fraction: fraction,
    })
}

/// Forward kinematics: the lever pose at a given angle.
///
/// Trivial trigonometric evaluation with no failure modes; the angle is
/// clamped to the outward-pointing quadrants so `cos(angle) >= 0` always
/// holds.
#[must_use]
pub fn pose_from_angle(
    geometry: &SuspensionGeometry,
    angle: f64,
    angular_velocity: f64,
) -> LeverState {
    let angle = angle.clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
    let (sin, cos) = angle.sin_cos();
    let length = geometry.arm_length;
    let fraction = geometry.rod_attach_fraction;
    LeverState {
        pivot: Point2::origin(),
        attach: Point2::new(fraction * length * cos, fraction * length * sin),
        free_end: Point2::new(length * cos, length * sin),
        angle,
        angular_velocity,
        arm_length: length,
        rod_attach_fraction: fraction,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_lever() {
        let geometry = SuspensionGeometry::default();
        let lever = solve_lever(&geometry, 0.0, 0.0).unwrap();
        assert_relative_eq!(lever.angle, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lever.free_end.x, 0.4, epsilon = 1e-12);
        assert_relative_eq!(lever.attach.x, 0.28, epsilon = 1e-12);
        assert_relative_eq!(lever.attach.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_raised_lever() {
        let geometry = SuspensionGeometry::default();
        let lever = solve_lever(&geometry, 0.1, 0.0).unwrap();
        // sin(theta) = 0.1 / 0.4 = 0.25.
        assert_relative_eq!(lever.angle, 0.25_f64.asin(), epsilon = 1e-12);
        assert_relative_eq!(lever.free_end.y, 0.1, epsilon = 1e-12);
        assert_relative_eq!(lever.attach.y, 0.07, epsilon = 1e-12);
        assert!(lever.angle.cos() > 0.0);
    }

    #[test]
    fn test_lowered_lever_is_symmetric() {
        let geometry = SuspensionGeometry::default();
        let up = solve_lever(&geometry, 0.1, 0.0).unwrap();
        let down = solve_lever(&geometry, -0.1, 0.0).unwrap();
        assert_relative_eq!(up.angle, -down.angle, epsilon = 1e-12);
        assert_relative_eq!(up.free_end.x, down.free_end.x, epsilon = 1e-12);
    }

    #[test]
    fn test_angular_velocity() {
        let geometry = SuspensionGeometry::default();
        let lever = solve_lever(&geometry, 0.0, 0.4).unwrap();
        // theta_dot = y_dot / (L cos 0) = 0.4 / 0.4.
        assert_relative_eq!(lever.angular_velocity, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_travel_limit() {
        let geometry = SuspensionGeometry::default();
        // Default half-travel is 0.3 m.
        let err = solve_lever(&geometry, 0.35, 0.0).unwrap_err();
        assert!(err.is_out_of_range());
        assert!(solve_lever(&geometry, 0.3, 0.0).is_ok());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let geometry = SuspensionGeometry::default();
        assert!(solve_lever(&geometry, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        let geometry = SuspensionGeometry {
            max_vertical_travel: 0.8, // full +-L reach
            ..Default::default()
        };
        for angle in [-1.4, -0.7, -0.1, 0.0, 0.3, 0.9, 1.5] {
            let forward = pose_from_angle(&geometry, angle, 0.0);
            let inverse = solve_lever(&geometry, forward.free_end.y, 0.0).unwrap();
            assert_relative_eq!(inverse.angle, angle, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_vertical_boundary() {
        let geometry = SuspensionGeometry {
            max_vertical_travel: 0.8,
            ..Default::default()
        };
        // Free end at the full arm length: lever straight up, and the
        // singular angular rate is suppressed.
        let lever = solve_lever(&geometry, 0.4, 1.0).unwrap();
        assert_relative_eq!(lever.angle, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(lever.angular_velocity, 0.0, epsilon = 1e-12);
        assert!(solve_lever(&geometry, 0.41, 0.0).is_err());
    }
}
