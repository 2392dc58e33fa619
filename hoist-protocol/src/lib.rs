//! Standing-desk control box serial protocol
//!
//! This crate frames, validates and encodes the byte protocol spoken by
//! the desk control box (the same protocol its Bluetooth remote uses), and
//! maps validated frames to typed telemetry.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────────┬─────────┬────────┬─────────────┬──────────┬──────┐
//! │ START     │ COMMAND │ LENGTH │ PAYLOAD     │ CHECKSUM │ END  │
//! │ 2B        │ 1B      │ 1B     │ LENGTH B    │ 1B       │ 0x7E │
//! └───────────┴─────────┴────────┴─────────────┴──────────┴──────┘
//! ```
//!
//! START is `F1 F1` for frames sent to the desk and `F2 F2` for frames the
//! desk sends back. CHECKSUM is the byte sum of COMMAND, LENGTH and the
//! payload, modulo 256.

#![no_std]
#![deny(unsafe_code)]

pub mod codec;
pub mod commands;
pub mod frame;
pub mod telemetry;

pub use codec::{CodecStats, FrameCodec, RAW_BUFFER_CAPACITY};
pub use commands::Command;
pub use frame::{Frame, FrameError, Marker, END_MARKER, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use telemetry::{decode, DecodeError, TelemetryEvent};
