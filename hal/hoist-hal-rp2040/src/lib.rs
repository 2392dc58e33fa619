//! RP2040-specific HAL for the standing-desk firmware
//!
//! Implements the hoist-hal traits on top of embassy-rp:
//! - Relay output pins
//! - Buffered UART halves for the control box link

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::RpOutputPin;
pub use uart::{RpUartRx, RpUartTx, UartBusError};
