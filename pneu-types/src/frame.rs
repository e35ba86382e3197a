//! Rigid-body state of the vehicle frame.
//!
//! The frame is modeled with three modal degrees of freedom: heave (vertical
//! translation), roll, and pitch. This is the only state in the engine that
//! carries integrated memory across ticks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CornerId;

/// Pose and velocity of the vehicle frame.
///
/// Heave is positive upward (m); roll is positive when the left side rises
/// (rad); pitch is positive when the nose rises (rad).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameState {
    /// Vertical displacement of the frame center (m).
    pub heave: f64,
    /// Roll angle (rad).
    pub roll: f64,
    /// Pitch angle (rad).
    pub pitch: f64,
    /// Heave rate (m/s).
    pub heave_rate: f64,
    /// Roll rate (rad/s).
    pub roll_rate: f64,
    /// Pitch rate (rad/s).
    pub pitch_rate: f64,
}

impl FrameState {
    /// Frame at rest at its reference height.
    #[must_use]
    pub fn at_rest() -> Self {
        Self::default()
    }

    /// Vertical displacement of the frame above one corner's pivot,
    /// using the small-angle approximation.
    #[must_use]
    pub fn corner_heave(&self, corner: CornerId, track: f64, wheelbase: f64) -> f64 {
        self.heave
            + corner.lateral_sign() * 0.5 * track * self.roll
            + corner.longitudinal_sign() * 0.5 * wheelbase * self.pitch
    }

    /// Vertical velocity of the frame above one corner's pivot.
    #[must_use]
    pub fn corner_heave_rate(&self, corner: CornerId, track: f64, wheelbase: f64) -> f64 {
        self.heave_rate
            + corner.lateral_sign() * 0.5 * track * self.roll_rate
            + corner.longitudinal_sign() * 0.5 * wheelbase * self.pitch_rate
    }

    /// Check that all fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.heave,
            self.roll,
            self.pitch,
            self.heave_rate,
            self.roll_rate,
            self.pitch_rate,
        ]
        .iter()
        .all(|x| x.is_finite())
    }

    /// Linear interpolation between two frame states.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            heave: mix(self.heave, other.heave),
            roll: mix(self.roll, other.roll),
            pitch: mix(self.pitch, other.pitch),
            heave_rate: mix(self.heave_rate, other.heave_rate),
            roll_rate: mix(self.roll_rate, other.roll_rate),
            pitch_rate: mix(self.pitch_rate, other.pitch_rate),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_at_rest() {
        let frame = FrameState::at_rest();
        assert_eq!(frame.heave, 0.0);
        assert!(frame.is_finite());
    }

    #[test]
    fn test_corner_heave_roll() {
        let frame = FrameState {
            roll: 0.1,
            ..Default::default()
        };
        // Left side up, right side down, front/rear symmetric.
        let left = frame.corner_heave(CornerId::FrontLeft, 1.4, 2.4);
        let right = frame.corner_heave(CornerId::FrontRight, 1.4, 2.4);
        assert_relative_eq!(left, 0.07, epsilon = 1e-12);
        assert_relative_eq!(right, -0.07, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_heave_pitch() {
        let frame = FrameState {
            pitch: 0.05,
            ..Default::default()
        };
        let front = frame.corner_heave(CornerId::FrontLeft, 1.4, 2.4);
        let rear = frame.corner_heave(CornerId::RearLeft, 1.4, 2.4);
        assert_relative_eq!(front, 0.06, epsilon = 1e-12);
        assert_relative_eq!(rear, -0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp() {
        let a = FrameState::at_rest();
        let b = FrameState {
            heave: 0.1,
            heave_rate: 1.0,
            ..Default::default()
        };
        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.heave, 0.05, epsilon = 1e-12);
        assert_relative_eq!(mid.heave_rate, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_is_finite_rejects_nan() {
        let frame = FrameState {
            heave: f64::NAN,
            ..Default::default()
        };
        assert!(!frame.is_finite());
    }
}
