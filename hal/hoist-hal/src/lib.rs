//! Hoist Hardware Abstraction Layer
//!
//! The desk engine only ever touches hardware through two kinds of
//! signal: digital output levels (the up/down relay lines of a relay-driven
//! desk) and byte streams (the control box's serial link). This crate
//! defines those interfaces so the engine and its drivers stay
//! board-agnostic and can be exercised with mocks on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hoist-firmware                         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hoist-drivers (relay, serial link)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hoist-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hoist-hal-rp2040 (embassy adapters)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial link halves

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::OutputPin;
pub use uart::{UartConfig, UartRx, UartTx};
