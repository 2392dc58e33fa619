//! Commands sent to the desk control box

use crate::frame::{Frame, Marker};

// Command IDs: controller → desk
pub const CMD_MOVE_UP: u8 = 0x01;
pub const CMD_MOVE_DOWN: u8 = 0x02;
pub const CMD_QUERY_MEMORY_AND_HEIGHT: u8 = 0x07;
pub const CMD_QUERY_LIMITS: u8 = 0x0C;
pub const CMD_GO_TO_HEIGHT: u8 = 0x1B;
pub const CMD_STOP: u8 = 0x2B;

/// Outgoing command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start moving up (one step per frame on most control boxes)
    MoveUp,
    /// Start moving down
    MoveDown,
    /// Stop any motion
    Stop,
    /// Drive to an absolute height in native units
    GoToHeight(u16),
    /// Ask for the memory slots and the current height
    QueryMemoryAndHeight,
    /// Ask for the configured min/max height
    QueryLimits,
}

impl Command {
    /// Wire command ID
    pub const fn id(self) -> u8 {
        match self {
            Command::MoveUp => CMD_MOVE_UP,
            Command::MoveDown => CMD_MOVE_DOWN,
            Command::Stop => CMD_STOP,
            Command::GoToHeight(_) => CMD_GO_TO_HEIGHT,
            Command::QueryMemoryAndHeight => CMD_QUERY_MEMORY_AND_HEIGHT,
            Command::QueryLimits => CMD_QUERY_LIMITS,
        }
    }

    /// Build the outgoing frame for this command
    pub fn to_frame(self) -> Frame {
        match self {
            Command::GoToHeight(height) => {
                let mut frame = Frame::empty(Marker::Outgoing, CMD_GO_TO_HEIGHT);
                // Two bytes always fit
                let _ = frame.payload.extend_from_slice(&height.to_be_bytes());
                frame
            }
            other => Frame::empty(Marker::Outgoing, other.id()),
        }
    }

    /// Recover a command from an outgoing frame
    ///
    /// Returns `None` for frames that are not commands or carry the
    /// wrong payload.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if frame.marker != Marker::Outgoing {
            return None;
        }

        match (frame.command_id, frame.payload.as_slice()) {
            (CMD_MOVE_UP, []) => Some(Command::MoveUp),
            (CMD_MOVE_DOWN, []) => Some(Command::MoveDown),
            (CMD_STOP, []) => Some(Command::Stop),
            (CMD_QUERY_MEMORY_AND_HEIGHT, []) => Some(Command::QueryMemoryAndHeight),
            (CMD_QUERY_LIMITS, []) => Some(Command::QueryLimits),
            (CMD_GO_TO_HEIGHT, &[hi, lo]) => Some(Command::GoToHeight(u16::from_be_bytes([hi, lo]))),
            _ => None,
        }
    }
}
