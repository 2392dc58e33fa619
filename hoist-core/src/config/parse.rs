//! Line-based parser for the desk configuration file
//!
//! Handles the small TOML subset the desk file uses:
//! - `[motion]`, `[stall]`, `[actuator]` and `[link]` section headers
//! - `key = value` pairs (string, integer, boolean)
//! - Comments (`# ...`), including trailing ones
//!
//! Keys left out keep their defaults. Unknown keys are errors so typos do
//! not silently fall back to defaults.

use super::types::{ActuationKind, ConfigError, DeskConfig, PositionSource};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Motion,
    Stall,
    Actuator,
    Link,
}

/// Actuator keys are independent of each other in the file, so collect
/// them before building the variant.
struct ActuatorDraft {
    relay: bool,
    inverted: bool,
    native_positioning: bool,
}

/// Parse a configuration file into a validated [`DeskConfig`]
pub fn parse_config(input: &str) -> Result<DeskConfig, ConfigError> {
    let mut config = DeskConfig::default();
    let mut section = Section::Root;

    let mut dead_reckoning = false;
    let mut travel_speed = 0u32;
    let mut actuator = match config.actuator {
        ActuationKind::Relay { inverted } => ActuatorDraft {
            relay: true,
            inverted,
            native_positioning: false,
        },
        ActuationKind::Serial { native_positioning } => ActuatorDraft {
            relay: false,
            inverted: false,
            native_positioning,
        },
    };

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line).ok_or(ConfigError::InvalidSection { line: line_no })?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue { line: line_no })?;
        let invalid = ConfigError::InvalidValue { line: line_no };
        let unknown = ConfigError::UnknownKey { line: line_no };

        match (section, key) {
            (Section::Motion, "unit_scale") => {
                config.motion.unit_scale = parse_int(value).ok_or(invalid)?
            }
            (Section::Motion, "hysteresis") => {
                config.motion.hysteresis = parse_int(value).ok_or(invalid)?
            }
            (Section::Motion, "safety_min") => {
                config.motion.safety_min = parse_int(value).ok_or(invalid)?
            }
            (Section::Motion, "safety_max") => {
                config.motion.safety_max = parse_int(value).ok_or(invalid)?
            }
            (Section::Motion, "position_source") => {
                dead_reckoning = match parse_string(value) {
                    "telemetry" => false,
                    "dead_reckoning" => true,
                    _ => return Err(invalid),
                }
            }
            (Section::Motion, "travel_speed") => travel_speed = parse_int(value).ok_or(invalid)?,

            (Section::Stall, "timeout_ms") => {
                config.stall.timeout_ms = parse_int(value).ok_or(invalid)?
            }
            (Section::Stall, "min_progress") => {
                config.stall.min_progress = parse_int(value).ok_or(invalid)?
            }
            (Section::Stall, "max_seek_ms") => {
                config.stall.max_seek_ms = parse_int(value).ok_or(invalid)?
            }

            (Section::Actuator, "kind") => {
                actuator.relay = match parse_string(value) {
                    "relay" => true,
                    "serial" => false,
                    _ => return Err(invalid),
                }
            }
            (Section::Actuator, "inverted") => {
                actuator.inverted = parse_bool(value).ok_or(invalid)?
            }
            (Section::Actuator, "native_positioning") => {
                actuator.native_positioning = parse_bool(value).ok_or(invalid)?
            }

            (Section::Link, "baudrate") => config.link.baudrate = parse_int(value).ok_or(invalid)?,

            _ => return Err(unknown),
        }
    }

    if dead_reckoning {
        config.motion.position_source = PositionSource::DeadReckoning {
            fine_per_s: travel_speed,
        };
    }

    config.actuator = if actuator.relay {
        ActuationKind::Relay {
            inverted: actuator.inverted,
        }
    } else {
        ActuationKind::Serial {
            native_positioning: actuator.native_positioning,
        }
    };

    config.validate()?;
    Ok(config)
}

/// Parse a "[name]" header
fn parse_section_header(line: &str) -> Option<Section> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    match name {
        "motion" => Some(Section::Motion),
        "stall" => Some(Section::Stall),
        "actuator" => Some(Section::Actuator),
        "link" => Some(Section::Link),
        _ => None,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments outside of strings
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Option<T> {
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).ok()?;
    }
    digits.parse().ok()
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
