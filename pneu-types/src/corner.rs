//! Per-corner suspension state.
//!
//! A corner is one of the four lever-and-cylinder assemblies connecting the
//! frame to a wheel. Every type in this module is recomputed from scratch
//! each tick by the engine; nothing here carries integrated memory.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one of the four suspension corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CornerId {
    /// Front-left corner.
    FrontLeft,
    /// Front-right corner.
    FrontRight,
    /// Rear-left corner.
    RearLeft,
    /// Rear-right corner.
    RearRight,
}

impl CornerId {
    /// All four corners, in snapshot index order.
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    /// Index of this corner in snapshot arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::FrontLeft => 0,
            Self::FrontRight => 1,
            Self::RearLeft => 2,
            Self::RearRight => 3,
        }
    }

    /// Whether this corner is on the front axle.
    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    /// Whether this corner is on the left side.
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Self::FrontLeft | Self::RearLeft)
    }

    /// Sign of this corner's lateral offset from the roll axis (+1 left).
    #[must_use]
    pub const fn lateral_sign(self) -> f64 {
        if self.is_left() { 1.0 } else { -1.0 }
    }

    /// Sign of this corner's longitudinal offset from the pitch axis (+1 front).
    #[must_use]
    pub const fn longitudinal_sign(self) -> f64 {
        if self.is_front() { 1.0 } else { -1.0 }
    }
}

impl std::fmt::Display for CornerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FrontLeft => "front-left",
            Self::FrontRight => "front-right",
            Self::RearLeft => "rear-left",
            Self::RearRight => "rear-right",
        };
        write!(f, "{name}")
    }
}

/// Kinematic state of one lever arm.
///
/// The pivot is frame-mounted; the attach point (where the cylinder rod
/// connects) and the free end are derived from the lever angle. Coordinates
/// are in the corner's vertical plane, in meters, with the pivot at a fixed
/// frame-relative position and the lever pointing outward (+X).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeverState {
    /// Frame-mounted pivot point.
    pub pivot: Point2<f64>,
    /// Cylinder rod attachment point on the lever.
    pub attach: Point2<f64>,
    /// Free (wheel-side) end of the lever.
    pub free_end: Point2<f64>,
    /// Lever angle from the +X axis (rad), always in [-pi/2, pi/2].
    pub angle: f64,
    /// Angular rate of the lever (rad/s).
    pub angular_velocity: f64,
    /// Arm length L (m).
    pub arm_length: f64,
    /// Fraction of L at which the rod attaches, in [0.1, 0.9].
    pub rod_attach_fraction: f64,
}

impl LeverState {
    /// Check that all fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pivot.coords.iter().all(|x| x.is_finite())
            && self.attach.coords.iter().all(|x| x.is_finite())
            && self.free_end.coords.iter().all(|x| x.is_finite())
            && self.angle.is_finite()
            && self.angular_velocity.is_finite()
    }
}

/// Kinematic and volumetric state of one pneumatic cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CylinderState {
    /// Frame-side hinge of the cylinder barrel.
    pub frame_hinge: Point2<f64>,
    /// Rod-side hinge (the lever attach point).
    pub rod_hinge: Point2<f64>,
    /// Piston displacement from neutral (m), clamped to +-max_stroke/2.
    pub stroke: f64,
    /// Piston velocity (m/s); zero while the piston sits on an end stop.
    pub stroke_velocity: f64,
    /// Head-chamber volume (m^3), including dead volume.
    pub volume_head: f64,
    /// Rod-chamber volume (m^3), including dead volume.
    pub volume_rod: f64,
    /// Head-side piston area (m^2).
    pub area_head: f64,
    /// Rod-side annular piston area (m^2).
    pub area_rod: f64,
    /// Hinge-to-hinge distance (m).
    pub distance: f64,
    /// Cylinder axis angle from the +X axis (rad).
    pub axis_angle: f64,
}

impl CylinderState {
    /// Total gas volume across both chambers.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.volume_head + self.volume_rod
    }

    /// Smaller of the two chamber volumes.
    #[must_use]
    pub fn min_chamber_volume(&self) -> f64 {
        self.volume_head.min(self.volume_rod)
    }

    /// Check that all fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.frame_hinge.coords.iter().all(|x| x.is_finite())
            && self.rod_hinge.coords.iter().all(|x| x.is_finite())
            && [
                self.stroke,
                self.stroke_velocity,
                self.volume_head,
                self.volume_rod,
                self.distance,
                self.axis_angle,
            ]
            .iter()
            .all(|x| x.is_finite())
    }
}

/// Thermodynamic state of one gas chamber.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GasChamberState {
    /// Absolute pressure (Pa).
    pub pressure: f64,
    /// Gas mass (kg).
    pub mass: f64,
    /// Chamber volume (m^3).
    pub volume: f64,
    /// Gas temperature (K), treated as constant.
    pub temperature: f64,
}

impl GasChamberState {
    /// Gas density (kg/m^3).
    #[must_use]
    pub fn density(&self) -> f64 {
        if self.volume > 0.0 {
            self.mass / self.volume
        } else {
            0.0
        }
    }

    /// Check that all fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.pressure, self.mass, self.volume, self.temperature]
            .iter()
            .all(|x| x.is_finite())
    }
}

/// Result of the lever/cylinder clearance check.
///
/// Advisory only: a negative clearance never stops the simulation, it is
/// surfaced in the snapshot for the consumer to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterferenceResult {
    /// Whether the lever and cylinder capsules overlap.
    pub is_interfering: bool,
    /// Surface-to-surface clearance (m); negative means penetration.
    pub clearance: f64,
}

impl InterferenceResult {
    /// Build a result from a signed clearance.
    #[must_use]
    pub fn from_clearance(clearance: f64) -> Self {
        Self {
            is_interfering: clearance < 0.0,
            clearance,
        }
    }

    /// Penetration depth (m); zero when the bodies are clear.
    #[must_use]
    pub fn penetration(&self) -> f64 {
        (-self.clearance).max(0.0)
    }
}

/// Complete per-tick state of one suspension corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerState {
    /// Which corner this is.
    pub id: CornerId,
    /// Lever kinematics.
    pub lever: LeverState,
    /// Cylinder kinematics and volumes.
    pub cylinder: CylinderState,
    /// Head-chamber gas state.
    pub head: GasChamberState,
    /// Rod-chamber gas state.
    pub rod: GasChamberState,
    /// Lever/cylinder clearance.
    pub interference: InterferenceResult,
    /// Whether the head chamber hit its mass floor this tick.
    pub starved_head: bool,
    /// Whether the rod chamber hit its mass floor this tick.
    pub starved_rod: bool,
}

impl CornerState {
    /// Check that all numeric fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lever.is_finite()
            && self.cylinder.is_finite()
            && self.head.is_finite()
            && self.rod.is_finite()
            && self.interference.clearance.is_finite()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_id_index() {
        for (i, corner) in CornerId::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
        }
    }

    #[test]
    fn test_corner_id_sides() {
        assert!(CornerId::FrontLeft.is_front());
        assert!(CornerId::FrontLeft.is_left());
        assert!(!CornerId::RearRight.is_front());
        assert!(!CornerId::RearRight.is_left());

        assert_eq!(CornerId::FrontLeft.lateral_sign(), 1.0);
        assert_eq!(CornerId::FrontRight.lateral_sign(), -1.0);
        assert_eq!(CornerId::RearLeft.longitudinal_sign(), -1.0);
    }

    #[test]
    fn test_corner_id_display() {
        assert_eq!(CornerId::FrontLeft.to_string(), "front-left");
        assert_eq!(CornerId::RearRight.to_string(), "rear-right");
    }

    #[test]
    fn test_interference_from_clearance() {
        let clear = InterferenceResult::from_clearance(0.01);
        assert!(!clear.is_interfering);
        assert_eq!(clear.penetration(), 0.0);

        let hit = InterferenceResult::from_clearance(-0.002);
        assert!(hit.is_interfering);
        assert!((hit.penetration() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_gas_density() {
        let gas = GasChamberState {
            pressure: 100_000.0,
            mass: 0.002,
            volume: 0.001,
            temperature: 293.15,
        };
        assert!((gas.density() - 2.0).abs() < 1e-12);
        assert!(gas.is_finite());
    }
}
