//! Safety monitoring
//!
//! Detects seeks that stop making progress.

pub mod monitor;

pub use monitor::{FaultKind, SafetyStatus, StallSupervisor};
