//! Motion control
//!
//! Target seeking with hysteresis, independent of how the desk is driven.

pub mod controller;
pub mod state;

pub use controller::{MotionController, OUTBOX_CAPACITY};
pub use state::{MotionOutput, MotionState, RangeError, TargetOutcome};
