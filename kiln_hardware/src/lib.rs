//! Sensor and actuator backends for the kiln controller.
//!
//! The simulated kiln and the masking adapter are always available. GPIO
//! drivers (MAX6675 thermocouple, relay, button) need the `hardware` feature.

pub mod error;
pub mod masked;
pub mod max6675;
pub mod sim;

pub use masked::MaskedSensor;
pub use sim::{SimParams, SimulatedHeater, SimulatedKiln, SimulatedSensor};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hardware::{RelayHeater, make_button_checker};
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use max6675::Max6675;

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod hardware {
    use std::rc::Rc;

    use kiln_traits::Heater;
    use rppal::gpio::{Gpio, OutputPin};

    use crate::error::{HwError, Result};

    /// Solid-state or mechanical relay driving the element.
    pub struct RelayHeater {
        pin: OutputPin,
        active_low: bool,
    }

    impl RelayHeater {
        pub fn new(pin: u8, active_low: bool) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            // Element off before anything else happens.
            if active_low {
                pin.set_high();
            } else {
                pin.set_low();
            }
            Ok(Self { pin, active_low })
        }
    }

    impl Heater for RelayHeater {
        fn set(&mut self, on: bool) {
            if on != self.active_low {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
        }
    }

    impl Drop for RelayHeater {
        fn drop(&mut self) {
            self.set(false);
        }
    }

    /// Build a pressed-state reader for a push button.
    ///
    /// The closure is cloneable so the same pin can serve as start trigger
    /// and abort input.
    pub fn make_button_checker(pin: u8, active_low: bool) -> Result<impl Fn() -> bool + Clone> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio.get(pin).map_err(|e| HwError::Gpio(e.to_string()))?;
        let input = if active_low {
            pin.into_input_pullup()
        } else {
            pin.into_input_pulldown()
        };
        let input = Rc::new(input);
        Ok(move || {
            if active_low {
                input.is_low()
            } else {
                input.is_high()
            }
        })
    }
}
