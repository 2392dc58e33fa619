//! Motion state and controller interface types

use hoist_protocol::Command;

use crate::traits::Direction;

/// Motion controller state
///
/// `Stopping` is entered whenever a seek ends or reverses, while both
/// directions are released. It never outlasts the operation that entered
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// No target, nothing engaged
    #[default]
    Idle,
    /// Driving towards the target
    Seeking { direction: Direction },
    /// Both directions released
    Stopping,
}

impl MotionState {
    /// Direction being driven, if seeking
    pub fn direction(&self) -> Option<Direction> {
        match self {
            MotionState::Seeking { direction } => Some(*direction),
            _ => None,
        }
    }

    /// Check if the desk is being driven
    pub fn is_moving(&self) -> bool {
        matches!(self, MotionState::Seeking { .. })
    }
}

/// Result of an accepted target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetOutcome {
    /// Started (or continued) driving in this direction
    Seeking(Direction),
    /// Already within the convergence band, nothing engaged
    AlreadyThere,
    /// No position known yet; the seek starts on the first reading
    AwaitingPosition,
}

/// Target outside the allowed range (fine units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeError {
    /// Rejected target
    pub requested: i32,
    /// Lowest allowed target
    pub min: i32,
    /// Highest allowed target
    pub max: i32,
}

/// Something the controller did that its owner has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionOutput {
    /// State changed
    Transition(MotionState),
    /// Command for the transport to send
    Send(Command),
    /// Seek completed at this target (fine units)
    Arrived(i32),
}
