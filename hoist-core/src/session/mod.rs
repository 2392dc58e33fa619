//! Desk session
//!
//! Wires frames, telemetry and motion together for one desk.

pub mod desk;
pub mod events;

pub use desk::{DeskSession, DeskState, Events, COMMAND_QUEUE_CAPACITY, MAX_EVENTS};
pub use events::{
    format_height_cm, parse_height_request, SessionEvent, TOPIC_HEIGHT_READ, TOPIC_HEIGHT_SET,
};
