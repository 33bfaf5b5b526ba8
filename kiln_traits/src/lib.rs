pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Temperature input consumed by the ramp controller.
///
/// Reads are synchronous and always produce a value in degrees Celsius.
/// Implementations that can fail must mask the failure themselves (see
/// `Thermocouple` for the fallible driver-level contract).
pub trait TemperatureSensor {
    fn read_celsius(&mut self) -> f64;
}

/// Binary heating element output. Idempotent.
pub trait Heater {
    fn set(&mut self, on: bool);
}

/// Fallible driver-level temperature reader.
pub trait Thermocouple {
    fn read(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for Box<T> {
    fn read_celsius(&mut self) -> f64 {
        (**self).read_celsius()
    }
}

impl<T: Heater + ?Sized> Heater for Box<T> {
    fn set(&mut self, on: bool) {
        (**self).set(on);
    }
}
