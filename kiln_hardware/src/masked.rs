//! Adapter from a fallible thermocouple driver to the infallible sensor port.

use kiln_traits::{TemperatureSensor, Thermocouple};

/// Masks read failures with the last good reading.
///
/// Before the first good reading the fallback (normally ambient) is used.
/// Non-finite values count as failures.
pub struct MaskedSensor<T: Thermocouple> {
    inner: T,
    last_good: Option<f64>,
    fallback_c: f64,
    failures: u64,
    streak: u64,
}

impl<T: Thermocouple> MaskedSensor<T> {
    pub fn new(inner: T, fallback_c: f64) -> Self {
        Self {
            inner,
            last_good: None,
            fallback_c,
            failures: 0,
            streak: 0,
        }
    }

    /// Total masked reads since construction.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn last_good(&self) -> Option<f64> {
        self.last_good
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Thermocouple> TemperatureSensor for MaskedSensor<T> {
    fn read_celsius(&mut self) -> f64 {
        let reason = match self.inner.read() {
            Ok(v) if v.is_finite() => {
                if self.streak > 0 {
                    tracing::info!(masked = self.streak, "thermocouple recovered");
                    self.streak = 0;
                }
                self.last_good = Some(v);
                return v;
            }
            Ok(v) => format!("non-finite reading {v}"),
            Err(e) => e.to_string(),
        };
        self.failures = self.failures.saturating_add(1);
        self.streak = self.streak.saturating_add(1);
        let masked = self.last_good.unwrap_or(self.fallback_c);
        if self.streak == 1 {
            tracing::warn!(error = %reason, masked_c = masked, "thermocouple read failed, holding last value");
        } else {
            tracing::debug!(error = %reason, streak = self.streak, "thermocouple still failing");
        }
        masked
    }
}
