//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic and the
//! way a particular desk is physically driven.

pub mod actuator;

pub use actuator::{Actuator, Direction};
