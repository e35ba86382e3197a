//! Commands sent to the simulation worker.
//!
//! Commands arrive on a channel and are drained between ticks. Parameter
//! updates coalesce: when several updates to the same parameter are queued,
//! only the most recent one is applied.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CornerId;

/// Lifecycle command for the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlCommand {
    /// Begin stepping from the initial state.
    Start,
    /// Suspend stepping; state is retained.
    Pause,
    /// Resume stepping after a pause.
    Resume,
    /// Terminate the worker.
    Stop,
    /// Discard all state and return to the initial configuration.
    Reset,
}

/// Which dependent variable absorbs a track-width change.
///
/// The track identity `track == 2 * (arm_length + pivot_offset)` always
/// holds; changing the track requires choosing which of the other two
/// parameters moves to keep it true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintMode {
    /// Keep the arm length; recompute the pivot offset.
    #[default]
    FixArm,
    /// Keep the pivot offset; recompute the arm length.
    FixPivot,
}

/// Front or rear axle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axle {
    /// Front axle.
    Front,
    /// Rear axle.
    Rear,
}

impl Axle {
    /// Whether this is the front axle.
    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::Front)
    }

    /// The axle a corner belongs to.
    #[must_use]
    pub const fn of(corner: CornerId) -> Self {
        if corner.is_front() {
            Self::Front
        } else {
            Self::Rear
        }
    }
}

/// A single parameter change, applied between ticks.
///
/// Geometric updates are validated by the constraint solver and rejected
/// wholesale on failure; valve and road updates always apply (valve commands
/// are clamped to [-1, 1] by the engine).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterUpdate {
    /// New lever arm length (m); pivot offset is held, track recomputed.
    ArmLength(f64),
    /// New pivot offset (m); arm length is held, track recomputed.
    PivotOffset(f64),
    /// New track width (m); the mode picks which dependent parameter moves.
    Track {
        /// Requested track width (m).
        value: f64,
        /// Which parameter absorbs the change.
        mode: ConstraintMode,
    },
    /// New rod attach fraction.
    RodAttachFraction(f64),
    /// New rod diameter (m) for one axle. When rod diameters are linked in
    /// the configuration, the other axle follows.
    RodDiameter {
        /// Which axle's cylinders change.
        axle: Axle,
        /// New rod diameter (m).
        value: f64,
    },
    /// Valve openings for one corner, each in [-1, 1]: positive charges
    /// from supply, negative vents to ambient, zero holds.
    ValveCommand {
        /// Target corner.
        corner: CornerId,
        /// Head-chamber valve opening.
        head: f64,
        /// Rod-chamber valve opening.
        rod: f64,
    },
    /// Road input under one corner.
    RoadExcitation {
        /// Target corner.
        corner: CornerId,
        /// Road surface height (m).
        height: f64,
        /// Road surface vertical rate (m/s).
        rate: f64,
    },
}

/// Coalescing key: updates with equal keys overwrite each other in the
/// queue, last writer wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    /// Arm length updates.
    ArmLength,
    /// Pivot offset updates.
    PivotOffset,
    /// Track updates (any mode).
    Track,
    /// Rod attach fraction updates.
    RodAttachFraction,
    /// Rod diameter updates for one axle.
    RodDiameter(Axle),
    /// Valve updates for one corner.
    Valve(CornerId),
    /// Road updates for one corner.
    Road(CornerId),
}

impl ParameterUpdate {
    /// The coalescing key of this update.
    #[must_use]
    pub fn key(&self) -> ParameterKey {
        match self {
            Self::ArmLength(_) => ParameterKey::ArmLength,
            Self::PivotOffset(_) => ParameterKey::PivotOffset,
            Self::Track { .. } => ParameterKey::Track,
            Self::RodAttachFraction(_) => ParameterKey::RodAttachFraction,
            Self::RodDiameter { axle, .. } => ParameterKey::RodDiameter(*axle),
            Self::ValveCommand { corner, .. } => ParameterKey::Valve(*corner),
            Self::RoadExcitation { corner, .. } => ParameterKey::Road(*corner),
        }
    }
}

/// Anything a client can send to the worker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    /// Lifecycle control.
    Control(ControlCommand),
    /// Parameter change.
    Parameter(ParameterUpdate),
}

impl From<ControlCommand> for Command {
    fn from(cmd: ControlCommand) -> Self {
        Self::Control(cmd)
    }
}

impl From<ParameterUpdate> for Command {
    fn from(update: ParameterUpdate) -> Self {
        Self::Parameter(update)
    }
}
