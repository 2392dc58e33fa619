//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in hoist-core:
//!
//! - Actuators (relay lines, serial commands, and a runtime choice of both)
//! - Serial link pump between a UART and a desk session

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod link;
