//! Published simulation state.
//!
//! A [`SimulationSnapshot`] is the only type the engine exposes to
//! consumers. It is assembled once per tick and never mutated after
//! publication; readers on other threads need no synchronization.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CornerId, CornerState, FrameState};

/// Structured per-tick degradations.
///
/// These are data, not errors: the loop keeps running and consumers decide
/// how to react (highlight a corner, log, ignore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepWarnings {
    /// The integrator diverged once and the step was retried at half size.
    pub integration_retried: bool,
    /// The retry also diverged; the frame state was held at its last
    /// valid value for this tick.
    pub integration_failed: bool,
    /// A kinematic input was out of range; corner states from the previous
    /// tick were retained.
    pub kinematics_rejected: bool,
    /// Number of chamber-starvation clamp events this tick (0..=8).
    pub starvation_events: u8,
}

impl StepWarnings {
    /// Whether any degradation occurred this tick.
    #[must_use]
    pub fn any(&self) -> bool {
        self.integration_retried
            || self.integration_failed
            || self.kinematics_rejected
            || self.starvation_events > 0
    }
}

/// One immutable, fully-computed simulation state.
///
/// All quantities are SI (meters, radians, pascals, kilograms); unit
/// conversion for presentation is the consumer's responsibility.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationSnapshot {
    /// Simulation time (s).
    pub time: f64,
    /// Monotonic tick counter.
    pub tick: u64,
    /// Frame pose and velocity.
    pub frame: FrameState,
    /// Per-corner states, indexed by [`CornerId::index`].
    pub corners: [CornerState; 4],
    /// Degradations recorded during this tick.
    pub warnings: StepWarnings,
}

impl SimulationSnapshot {
    /// State of a specific corner.
    #[must_use]
    pub fn corner(&self, id: CornerId) -> &CornerState {
        &self.corners[id.index()]
    }

    /// Whether any corner reports interference.
    #[must_use]
    pub fn has_interference(&self) -> bool {
        self.corners.iter().any(|c| c.interference.is_interfering)
    }

    /// Check that every numeric field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.frame.is_finite() && self.corners.iter().all(CornerState::is_finite)
    }
}
