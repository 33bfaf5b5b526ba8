//! MAX6675 K-type thermocouple converter.
//!
//! The chip shifts out a 16-bit frame: bit 15 dummy, bits 14..3 temperature
//! in 0.25 °C steps, bit 2 set when the probe is open, bits 1..0 unused.

use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Minimum time between reads; pulling CS low aborts the running conversion.
pub const CONVERSION_TIME: Duration = Duration::from_millis(220);

const OPEN_BIT: u16 = 1 << 2;

/// Decode one raw frame to °C.
pub fn decode(raw: u16) -> Result<f64> {
    if raw & OPEN_BIT != 0 {
        return Err(HwError::ThermocoupleOpen);
    }
    let quarters = (raw >> 3) & 0x0FFF;
    Ok(f64::from(quarters) * 0.25)
}

/// Tracks when the next conversion is complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionGate {
    last_read: Option<Instant>,
}

impl ConversionGate {
    pub fn ready(&self, now: Instant) -> bool {
        self.last_read
            .is_none_or(|t| now.saturating_duration_since(t) >= CONVERSION_TIME)
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_read = Some(now);
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use driver::Max6675;

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod driver {
    use std::time::{Duration, Instant};

    use kiln_traits::Thermocouple;
    use rppal::gpio::{Gpio, InputPin, OutputPin};
    use tracing::trace;

    use super::{ConversionGate, decode};
    use crate::error::{HwError, Result};

    const HALF_CLOCK: Duration = Duration::from_micros(10);

    /// Bit-banged MAX6675 on three GPIO lines.
    pub struct Max6675 {
        clk: OutputPin,
        cs: OutputPin,
        so: InputPin,
        gate: ConversionGate,
        last: Option<f64>,
    }

    impl Max6675 {
        pub fn new(clk_pin: u8, cs_pin: u8, so_pin: u8) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut clk = gpio
                .get(clk_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            let mut cs = gpio
                .get(cs_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            let so = gpio
                .get(so_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input();
            clk.set_low();
            cs.set_high(); // idle deselected, conversion running
            Ok(Self {
                clk,
                cs,
                so,
                gate: ConversionGate::default(),
                last: None,
            })
        }

        fn read_frame(&mut self) -> u16 {
            self.cs.set_low();
            std::thread::sleep(HALF_CLOCK);
            let mut frame: u16 = 0;
            for _ in 0..16 {
                self.clk.set_low();
                std::thread::sleep(HALF_CLOCK);
                frame = (frame << 1) | u16::from(self.so.is_high());
                self.clk.set_high();
                std::thread::sleep(HALF_CLOCK);
            }
            self.clk.set_low();
            self.cs.set_high();
            frame
        }

        pub fn read_celsius(&mut self) -> Result<f64> {
            let now = Instant::now();
            if !self.gate.ready(now) {
                return self.last.ok_or(HwError::NotReady);
            }
            let frame = self.read_frame();
            self.gate.mark(now);
            trace!(frame, "max6675 frame");
            let t = decode(frame)?;
            self.last = Some(t);
            Ok(t)
        }
    }

    impl Thermocouple for Max6675 {
        fn read(&mut self) -> std::result::Result<f64, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.read_celsius()?)
        }
    }
}
