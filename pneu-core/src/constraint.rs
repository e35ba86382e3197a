//! Geometric constraint solving.
//!
//! All coupled-parameter edits go through this module so that the track
//! identity `track == 2 * (arm_length + pivot_offset)` and the dead-volume
//! floor can never be observed broken. Updates are validated against a
//! candidate copy and committed atomically; a rejected update leaves the
//! configuration untouched.

use pneu_types::{
    Axle, ConstraintMode, CylinderSpec, EngineConfig, ParameterUpdate, Result, SuspensionError,
    SuspensionGeometry,
};

/// Minimum chamber volume as a fraction of the total cylinder volume.
pub const MIN_VOLUME_FRACTION: f64 = 0.005;

/// Recompute the dependent geometric parameter after a track change.
///
/// Returns the new `(arm_length, pivot_offset)` pair. The result always
/// satisfies `track == 2 * (arm_length + pivot_offset)`; bounds checking is
/// the caller's job.
#[must_use]
pub fn enforce_track_invariant(
    track: f64,
    arm_length: f64,
    pivot_offset: f64,
    mode: ConstraintMode,
) -> (f64, f64) {
    match mode {
        ConstraintMode::FixArm => (arm_length, track / 2.0 - arm_length),
        ConstraintMode::FixPivot => (track / 2.0 - pivot_offset, pivot_offset),
    }
}

/// Validate a full configuration, including the cross-parameter invariants
/// that the per-section `validate` methods cannot see.
pub fn validate_config(config: &EngineConfig) -> Result<()> {
    config.validate()?;
    validate_dead_volume_floor(&config.cylinder_front, "front")?;
    validate_dead_volume_floor(&config.cylinder_rear, "rear")?;
    validate_hinge_reach(&config.geometry, &config.cylinder_front)?;
    validate_hinge_reach(&config.geometry, &config.cylinder_rear)?;
    Ok(())
}

/// Check that neither chamber can shrink below [`MIN_VOLUME_FRACTION`] of
/// the total cylinder volume at either stroke limit.
fn validate_dead_volume_floor(spec: &CylinderSpec, axle: &str) -> Result<()> {
    let half = spec.max_stroke / 2.0;
    for stroke in [-half, half] {
        let head = spec.volume_head(stroke);
        let rod = spec.volume_rod(stroke);
        let floor = MIN_VOLUME_FRACTION * (head + rod);
        if head.min(rod) < floor {
            return Err(SuspensionError::configuration(format!(
                "{axle} cylinder chamber volume {:.3e} m^3 at stroke {stroke} m \
                 is below the floor of {:.3e} m^3",
                head.min(rod),
                floor
            )));
        }
    }
    Ok(())
}

/// Check that the neutral cylinder length is reachable from the hinge.
///
/// A neutral length shorter than the piston half-stroke would put the rod
/// hinge inside the barrel at full compression.
fn validate_hinge_reach(geometry: &SuspensionGeometry, spec: &CylinderSpec) -> Result<()> {
    let neutral = neutral_length(geometry);
    if neutral <= spec.max_stroke / 2.0 {
        return Err(SuspensionError::configuration(format!(
            "cylinder neutral length {neutral} m does not clear the half-stroke {} m",
            spec.max_stroke / 2.0
        )));
    }
    Ok(())
}

/// Hinge-to-hinge distance at which the piston sits centered.
///
/// Defaults to the distance at zero lever angle when the configuration does
/// not pin it explicitly.
#[must_use]
pub fn neutral_length(geometry: &SuspensionGeometry) -> f64 {
    geometry.cylinder_neutral_length.unwrap_or_else(|| {
        let attach_x = geometry.rod_attach_fraction * geometry.arm_length;
        let dx = attach_x - geometry.frame_hinge_offset.x;
        let dy = -geometry.frame_hinge_offset.y;
        (dx * dx + dy * dy).sqrt()
    })
}

/// Apply one geometric parameter update to the configuration.
///
/// Valve and road updates are not geometry and are rejected here; the world
/// routes them to its own per-corner state.
pub fn apply_update(config: &mut EngineConfig, update: &ParameterUpdate) -> Result<()> {
    let mut candidate = config.clone();

    match *update {
        ParameterUpdate::ArmLength(value) => {
            candidate.geometry.arm_length = value;
            candidate.geometry.track = 2.0 * (value + candidate.geometry.pivot_offset);
        }
        ParameterUpdate::PivotOffset(value) => {
            candidate.geometry.pivot_offset = value;
            candidate.geometry.track = 2.0 * (candidate.geometry.arm_length + value);
        }
        ParameterUpdate::Track { value, mode } => {
            let (arm, pivot) = enforce_track_invariant(
                value,
                candidate.geometry.arm_length,
                candidate.geometry.pivot_offset,
                mode,
            );
            candidate.geometry.arm_length = arm;
            candidate.geometry.pivot_offset = pivot;
            candidate.geometry.track = value;
        }
        ParameterUpdate::RodAttachFraction(value) => {
            candidate.geometry.rod_attach_fraction = value;
        }
        ParameterUpdate::RodDiameter { axle, value } => {
            if candidate.link_rod_diameters {
                candidate.cylinder_front.rod_diameter = value;
                candidate.cylinder_rear.rod_diameter = value;
            } else {
                match axle {
                    Axle::Front => candidate.cylinder_front.rod_diameter = value,
                    Axle::Rear => candidate.cylinder_rear.rod_diameter = value,
                }
            }
        }
        ParameterUpdate::ValveCommand { .. } | ParameterUpdate::RoadExcitation { .. } => {
            return Err(SuspensionError::configuration(
                "valve and road updates are not geometric parameters",
            ));
        }
    }

    validate_config(&candidate)?;
    *config = candidate;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pneu_types::CornerId;

    #[test]
    fn test_default_config_passes_full_validation() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_track_invariant_fix_arm() {
        let (arm, pivot) = enforce_track_invariant(1.6, 0.4, 0.3, ConstraintMode::FixArm);
        assert_relative_eq!(arm, 0.4, epsilon = 1e-12);
        assert_relative_eq!(pivot, 0.4, epsilon = 1e-12);
        assert_relative_eq!(1.6, 2.0 * (arm + pivot), epsilon = 1e-12);
    }

    #[test]
    fn test_track_invariant_fix_pivot() {
        let (arm, pivot) = enforce_track_invariant(1.6, 0.4, 0.3, ConstraintMode::FixPivot);
        assert_relative_eq!(arm, 0.5, epsilon = 1e-12);
        assert_relative_eq!(pivot, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_arm_length_update_recomputes_track() {
        let mut config = EngineConfig::default();
        apply_update(&mut config, &ParameterUpdate::ArmLength(0.45)).unwrap();
        assert_relative_eq!(config.geometry.arm_length, 0.45, epsilon = 1e-12);
        assert_relative_eq!(config.geometry.track, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rejected_update_leaves_config_untouched() {
        let mut config = EngineConfig::default();
        let before = config.clone();
        // Outside the default arm-length bounds.
        let err = apply_update(&mut config, &ParameterUpdate::ArmLength(5.0)).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(config, before);
    }

    #[test]
    fn test_track_update_fix_arm_can_push_pivot_out_of_bounds() {
        let mut config = EngineConfig::default();
        // track 0.95 -> pivot = 0.475 - 0.4 = 0.075 > 0.05 min, ok.
        apply_update(
            &mut config,
            &ParameterUpdate::Track {
                value: 0.95,
                mode: ConstraintMode::FixArm,
            },
        )
        .unwrap();
        assert_relative_eq!(config.geometry.pivot_offset, 0.075, epsilon = 1e-12);

        // track 0.85 -> pivot = 0.025 < 0.05 min, rejected.
        let err = apply_update(
            &mut config,
            &ParameterUpdate::Track {
                value: 0.85,
                mode: ConstraintMode::FixArm,
            },
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_linked_rod_diameter_updates_both_axles() {
        let mut config = EngineConfig {
            link_rod_diameters: true,
            ..Default::default()
        };
        apply_update(
            &mut config,
            &ParameterUpdate::RodDiameter {
                axle: Axle::Front,
                value: 0.036,
            },
        )
        .unwrap();
        assert_relative_eq!(config.cylinder_front.rod_diameter, 0.036, epsilon = 1e-12);
        assert_relative_eq!(config.cylinder_rear.rod_diameter, 0.036, epsilon = 1e-12);
    }

    #[test]
    fn test_unlinked_rod_diameter_updates_one_axle() {
        let mut config = EngineConfig::default();
        apply_update(
            &mut config,
            &ParameterUpdate::RodDiameter {
                axle: Axle::Rear,
                value: 0.036,
            },
        )
        .unwrap();
        assert_relative_eq!(config.cylinder_front.rod_diameter, 0.032, epsilon = 1e-12);
        assert_relative_eq!(config.cylinder_rear.rod_diameter, 0.036, epsilon = 1e-12);
    }

    #[test]
    fn test_dead_volume_floor_rejects_tiny_dead_volume() {
        let mut config = EngineConfig::default();
        config.cylinder_front.dead_volume_head = 1.0e-6;
        let err = validate_config(&config).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("front"));
    }

    #[test]
    fn test_valve_command_is_not_a_geometric_update() {
        let mut config = EngineConfig::default();
        let update = ParameterUpdate::ValveCommand {
            corner: CornerId::FrontLeft,
            head: 1.0,
            rod: 0.0,
        };
        assert!(apply_update(&mut config, &update).is_err());
    }

    #[test]
    fn test_neutral_length_default_is_zero_angle_distance() {
        let geometry = SuspensionGeometry::default();
        // attach at (0.28, 0), hinge at (0.28, -0.5).
        assert_relative_eq!(neutral_length(&geometry), 0.5, epsilon = 1e-12);

        let pinned = SuspensionGeometry {
            cylinder_neutral_length: Some(0.43),
            ..Default::default()
        };
        assert_relative_eq!(neutral_length(&pinned), 0.43, epsilon = 1e-12);
    }
}
