//! Actuation strategy trait
//!
//! A desk is moved either by toggling its up/down lines directly or by
//! sending commands to its control box. The motion controller does not
//! care which; it only engages and releases an [`Actuator`].

use hoist_protocol::Command;

/// Travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Raise the desk
    Up,
    /// Lower the desk
    Down,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Sign of travel in height units (+1 up, -1 down)
    pub fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// Trait for desk actuation strategies
///
/// Implementations either switch outputs as a side effect or return the
/// [`Command`] the transport has to send, or both.
///
/// Implementations must never have both directions engaged. Engaging a
/// direction while the other one is engaged has to drop the other one
/// first.
pub trait Actuator {
    /// Start driving in `direction`
    ///
    /// `target` is the requested height in native units, for control
    /// boxes that position themselves.
    fn engage(&mut self, direction: Direction, target: u16) -> Option<Command>;

    /// Stop driving
    fn release(&mut self) -> Option<Command>;

    /// Called on every tick while a direction is engaged
    ///
    /// Control boxes that only move while key frames keep arriving need a
    /// repeat here. The default does nothing.
    fn hold(&mut self) -> Option<Command> {
        None
    }

    /// Currently engaged direction, if any
    fn engaged(&self) -> Option<Direction>;
}
