//! Board-agnostic core logic for the standing-desk controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Actuation strategy trait (relay lines or serial commands)
//! - Motion controller state machine
//! - Stall supervision
//! - Desk session wiring telemetry, motion and published events
//! - Configuration types and parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod safety;
pub mod session;
pub mod traits;
