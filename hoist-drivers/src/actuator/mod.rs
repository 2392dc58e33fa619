//! Actuator implementations
//!
//! - Relay: two GPIO lines switched directly
//! - Serial: commands to the control box
//!
//! [`AnyActuator`] picks one at runtime from the configuration.

pub mod relay;
pub mod serial;

pub use relay::RelayActuator;
pub use serial::SerialActuator;

use hoist_core::config::ActuationKind;
use hoist_core::traits::{Actuator, Direction};
use hoist_hal::OutputPin;
use hoist_protocol::Command;

/// Actuation strategy chosen at runtime
pub enum AnyActuator<P> {
    Relay(RelayActuator<P>),
    Serial(SerialActuator),
}

impl<P: OutputPin> AnyActuator<P> {
    /// Build the actuator described by `kind`
    ///
    /// The relay pins are only used for [`ActuationKind::Relay`]; a serial
    /// setup leaves them untouched.
    pub fn from_kind(kind: ActuationKind, up: P, down: P) -> Self {
        match kind {
            ActuationKind::Relay { inverted } => {
                AnyActuator::Relay(RelayActuator::new(up, down, inverted))
            }
            ActuationKind::Serial { native_positioning } => {
                AnyActuator::Serial(SerialActuator::new(native_positioning))
            }
        }
    }
}

impl<P: OutputPin> Actuator for AnyActuator<P> {
    fn engage(&mut self, direction: Direction, target: u16) -> Option<Command> {
        match self {
            AnyActuator::Relay(a) => a.engage(direction, target),
            AnyActuator::Serial(a) => a.engage(direction, target),
        }
    }

    fn release(&mut self) -> Option<Command> {
        match self {
            AnyActuator::Relay(a) => a.release(),
            AnyActuator::Serial(a) => a.release(),
        }
    }

    fn hold(&mut self) -> Option<Command> {
        match self {
            AnyActuator::Relay(a) => a.hold(),
            AnyActuator::Serial(a) => a.hold(),
        }
    }

    fn engaged(&self) -> Option<Direction> {
        match self {
            AnyActuator::Relay(a) => a.engaged(),
            AnyActuator::Serial(a) => a.engaged(),
        }
    }
}
