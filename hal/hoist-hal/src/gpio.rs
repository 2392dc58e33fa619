//! Digital output abstraction
//!
//! Relay-driven desks are moved by holding one of two lines (up or down)
//! active, exactly like the hand switch does.

/// Digital output pin
///
/// Implementations drive the physical level; callers deal with logical
/// "active" state and polarity on top of this.
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Drive the pin to a specific level
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Drive the pin to its active level for the given polarity
    ///
    /// With `inverted` set the line is active-low (typical for opto-isolated
    /// relay boards).
    fn set_active(&mut self, active: bool, inverted: bool) {
        self.set_level(active != inverted);
    }

    /// Check whether the pin is at its active level for the given polarity
    fn is_active(&self, inverted: bool) -> bool {
        self.is_set_high() != inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePin {
        high: bool,
    }

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high() {
        let mut pin = FakePin { high: false };
        pin.set_active(true, false);
        assert!(pin.is_set_high());
        assert!(pin.is_active(false));

        pin.set_active(false, false);
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_active_low() {
        let mut pin = FakePin { high: false };
        pin.set_active(false, true);
        assert!(pin.is_set_high());
        assert!(!pin.is_active(true));

        pin.set_active(true, true);
        assert!(!pin.is_set_high());
        assert!(pin.is_active(true));
    }
}
