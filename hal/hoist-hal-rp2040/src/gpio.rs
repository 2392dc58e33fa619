//! GPIO output pins

use embassy_rp::gpio::Output;
use hoist_hal::OutputPin;

/// Push-pull output driving one relay
pub struct RpOutputPin {
    pin: Output<'static>,
}

impl RpOutputPin {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl OutputPin for RpOutputPin {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
