//! Serial command actuator
//!
//! Moves the desk by sending commands to its control box. With native
//! positioning the box is told the target height and drives itself there;
//! otherwise it gets a MoveUp/MoveDown key frame on every tick, like a held
//! remote button.

use hoist_core::traits::{Actuator, Direction};
use hoist_protocol::Command;

/// Command-based actuator
#[derive(Debug, Clone)]
pub struct SerialActuator {
    native_positioning: bool,
    engaged: Option<Direction>,
    /// Last GoToHeight target sent
    last_target: Option<u16>,
}

impl SerialActuator {
    /// Create a serial actuator
    ///
    /// # Arguments
    /// - `native_positioning`: send GoToHeight instead of key frames
    pub fn new(native_positioning: bool) -> Self {
        Self {
            native_positioning,
            engaged: None,
            last_target: None,
        }
    }

    fn key_frame(direction: Direction) -> Command {
        match direction {
            Direction::Up => Command::MoveUp,
            Direction::Down => Command::MoveDown,
        }
    }
}

impl Actuator for SerialActuator {
    fn engage(&mut self, direction: Direction, target: u16) -> Option<Command> {
        let previous = self.engaged.replace(direction);

        if self.native_positioning {
            if previous == Some(direction) && self.last_target == Some(target) {
                return None;
            }
            self.last_target = Some(target);
            Some(Command::GoToHeight(target))
        } else {
            Some(Self::key_frame(direction))
        }
    }

    fn release(&mut self) -> Option<Command> {
        self.last_target = None;
        self.engaged.take().map(|_| Command::Stop)
    }

    fn hold(&mut self) -> Option<Command> {
        if self.native_positioning {
            return None;
        }
        self.engaged.map(Self::key_frame)
    }

    fn engaged(&self) -> Option<Direction> {
        self.engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_positioning() {
        let mut actuator = SerialActuator::new(true);

        assert_eq!(
            actuator.engage(Direction::Up, 1000),
            Some(Command::GoToHeight(1000))
        );
        assert_eq!(actuator.hold(), None);
        // Same target again is not resent
        assert_eq!(actuator.engage(Direction::Up, 1000), None);
        assert_eq!(
            actuator.engage(Direction::Up, 1100),
            Some(Command::GoToHeight(1100))
        );

        assert_eq!(actuator.release(), Some(Command::Stop));
        assert_eq!(actuator.engaged(), None);
    }

    #[test]
    fn test_key_frames() {
        let mut actuator = SerialActuator::new(false);

        assert_eq!(actuator.engage(Direction::Down, 700), Some(Command::MoveDown));
        assert_eq!(actuator.hold(), Some(Command::MoveDown));
        assert_eq!(actuator.hold(), Some(Command::MoveDown));

        assert_eq!(actuator.release(), Some(Command::Stop));
        assert_eq!(actuator.hold(), None);
    }

    #[test]
    fn test_release_when_idle() {
        let mut actuator = SerialActuator::new(true);
        assert_eq!(actuator.release(), None);
    }

    #[test]
    fn test_retarget_after_release() {
        let mut actuator = SerialActuator::new(true);
        actuator.engage(Direction::Up, 900);
        actuator.release();
        assert_eq!(
            actuator.engage(Direction::Up, 900),
            Some(Command::GoToHeight(900))
        );
    }
}
