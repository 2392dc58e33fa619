//! Relay line actuator
//!
//! Moves the desk by holding its up or down line active, the way the hand
//! switch does. The control box never sees a command; position feedback
//! still comes from its telemetry (or dead reckoning).
//!
//! The inactive line is always driven inactive before the other one is
//! driven active, so both lines are never active together.

use hoist_core::traits::{Actuator, Direction};
use hoist_hal::OutputPin;
use hoist_protocol::Command;

/// Two relay lines, one per direction
pub struct RelayActuator<P> {
    up: P,
    down: P,
    /// If true, line active = pin LOW
    inverted: bool,
    engaged: Option<Direction>,
}

impl<P: OutputPin> RelayActuator<P> {
    /// Create a relay actuator with both lines released
    ///
    /// # Arguments
    /// - `up`, `down`: The GPIO pins driving each relay
    /// - `inverted`: If true, relays are active-low
    pub fn new(up: P, down: P, inverted: bool) -> Self {
        let mut relay = Self {
            up,
            down,
            inverted,
            engaged: None,
        };
        // Ensure both lines start released
        relay.release_lines();
        relay
    }

    /// Check if the up line is active
    pub fn up_active(&self) -> bool {
        self.up.is_active(self.inverted)
    }

    /// Check if the down line is active
    pub fn down_active(&self) -> bool {
        self.down.is_active(self.inverted)
    }

    fn release_lines(&mut self) {
        self.up.set_active(false, self.inverted);
        self.down.set_active(false, self.inverted);
    }
}

impl<P: OutputPin> Actuator for RelayActuator<P> {
    fn engage(&mut self, direction: Direction, _target: u16) -> Option<Command> {
        let inverted = self.inverted;
        let (on, off) = match direction {
            Direction::Up => (&mut self.up, &mut self.down),
            Direction::Down => (&mut self.down, &mut self.up),
        };
        off.set_active(false, inverted);
        on.set_active(true, inverted);

        self.engaged = Some(direction);
        None
    }

    fn release(&mut self) -> Option<Command> {
        self.release_lines();
        self.engaged = None;
        None
    }

    fn engaged(&self) -> Option<Direction> {
        self.engaged
    }
}
