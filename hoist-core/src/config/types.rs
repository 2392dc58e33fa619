//! Configuration type definitions
//!
//! Heights come in two scales. Native units are what the desk reports
//! (millimeters for serial-command control boxes). Fine units are native
//! units multiplied by `unit_scale` and are what the motion controller
//! works in, so fractional readings and sub-unit hysteresis stay integral.

/// Where the controller gets its position from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PositionSource {
    /// Height readings decoded from desk telemetry
    #[default]
    Telemetry,
    /// Position integrated from a known travel speed while seeking
    DeadReckoning {
        /// Travel speed in fine units per second
        fine_per_s: u32,
    },
}

/// Motion controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Fine units per native unit
    pub unit_scale: u16,
    /// Convergence band half-width in fine units
    pub hysteresis: i32,
    /// Lowest height accepted before the desk reports its limits (native)
    pub safety_min: u16,
    /// Highest height accepted before the desk reports its limits (native)
    pub safety_max: u16,
    /// Position feedback source
    pub position_source: PositionSource,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            unit_scale: 10,
            hysteresis: 8,
            safety_min: 600,
            safety_max: 1250,
            position_source: PositionSource::Telemetry,
        }
    }
}

impl MotionConfig {
    /// Convert a native height to fine units
    pub fn to_fine(&self, native: u16) -> i32 {
        i32::from(native) * i32::from(self.unit_scale)
    }

    /// Convert fine units to the nearest native height
    ///
    /// Out-of-range values saturate at the `u16` bounds.
    pub fn to_native(&self, fine: i32) -> u16 {
        let scale = i32::from(self.unit_scale.max(1));
        let rounded = fine.saturating_add(scale / 2).div_euclid(scale);
        rounded.clamp(0, i32::from(u16::MAX)) as u16
    }

    /// Absolute safety range in fine units
    pub fn safety_range(&self) -> (i32, i32) {
        (self.to_fine(self.safety_min), self.to_fine(self.safety_max))
    }
}

/// Stall supervision configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StallConfig {
    /// Maximum time without progress while seeking (0 disables)
    pub timeout_ms: u32,
    /// Position change in fine units that counts as progress
    pub min_progress: i32,
    /// Maximum duration of a single seek (0 disables)
    pub max_seek_ms: u32,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            min_progress: 10,
            max_seek_ms: 60_000,
        }
    }
}

/// How the desk is physically driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuationKind {
    /// Two relay lines, one per direction
    Relay {
        /// Lines are active-low
        inverted: bool,
    },
    /// Commands to the control box over the serial link
    Serial {
        /// Use GoToHeight instead of MoveUp/MoveDown
        native_positioning: bool,
    },
}

impl Default for ActuationKind {
    fn default() -> Self {
        ActuationKind::Serial {
            native_positioning: true,
        }
    }
}

impl ActuationKind {
    /// Pin level of a released relay line
    ///
    /// Relay pins must be created at this level so no line is active
    /// before the actuator takes them over.
    pub fn relay_released_high(&self) -> bool {
        matches!(self, ActuationKind::Relay { inverted: true })
    }
}

/// Serial link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { baudrate: 9600 }
    }
}

/// Complete desk configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeskConfig {
    pub motion: MotionConfig,
    pub stall: StallConfig,
    pub actuator: ActuationKind,
    pub link: LinkConfig,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection { line: usize },
    /// Key not valid in its section
    UnknownKey { line: usize },
    /// Value could not be parsed for its key
    InvalidValue { line: usize },
    /// Values parse but contradict each other
    Inconsistent,
}

impl DeskConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let motion = &self.motion;
        if motion.unit_scale == 0 || motion.hysteresis < 0 {
            return Err(ConfigError::Inconsistent);
        }
        if motion.safety_min >= motion.safety_max {
            return Err(ConfigError::Inconsistent);
        }
        if let PositionSource::DeadReckoning { fine_per_s: 0 } = motion.position_source {
            return Err(ConfigError::Inconsistent);
        }
        if self.stall.min_progress < 0 || self.link.baudrate == 0 {
            return Err(ConfigError::Inconsistent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = DeskConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.link.baudrate, 9600);
        assert_eq!(config.motion.safety_range(), (6000, 12500));
    }

    #[test]
    fn test_unit_conversion() {
        let motion = MotionConfig::default();
        assert_eq!(motion.to_fine(700), 7000);
        assert_eq!(motion.to_native(7000), 700);
        assert_eq!(motion.to_native(9995), 1000);
        assert_eq!(motion.to_native(9994), 999);
        assert_eq!(motion.to_native(-40), 0);
        assert_eq!(motion.to_native(i32::MAX), u16::MAX);
        assert_eq!(motion.to_native(i32::MAX - 3), u16::MAX);
        assert_eq!(motion.to_native(i32::MIN), 0);
    }

    #[test]
    fn test_relay_released_level() {
        assert!(ActuationKind::Relay { inverted: true }.relay_released_high());
        assert!(!ActuationKind::Relay { inverted: false }.relay_released_high());
        assert!(!ActuationKind::default().relay_released_high());
    }

    #[test]
    fn test_unit_scale_one() {
        let motion = MotionConfig {
            unit_scale: 1,
            ..MotionConfig::default()
        };
        assert_eq!(motion.to_fine(723), 723);
        assert_eq!(motion.to_native(723), 723);
    }

    #[test]
    fn test_inverted_safety_range_rejected() {
        let mut config = DeskConfig::default();
        config.motion.safety_min = 1300;
        assert_eq!(config.validate(), Err(ConfigError::Inconsistent));
    }

    #[test]
    fn test_dead_reckoning_needs_speed() {
        let mut config = DeskConfig::default();
        config.motion.position_source = PositionSource::DeadReckoning { fine_per_s: 0 };
        assert_eq!(config.validate(), Err(ConfigError::Inconsistent));

        config.motion.position_source = PositionSource::DeadReckoning { fine_per_s: 350 };
        assert_eq!(config.validate(), Ok(()));
    }
}
