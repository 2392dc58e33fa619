//! Configuration types
//!
//! Board-agnostic desk configuration and its text-file parser.

pub mod parse;
pub mod types;

pub use parse::parse_config;
pub use types::*;
