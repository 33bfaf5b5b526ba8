//! Runtime configuration for the ramp controller.
//!
//! These are the structs consumed by `RampCore`. They are separate from the
//! TOML-deserialized config in `kiln_config`; see `conversions` for the mapping.

use crate::profile::DEFAULT_AMBIENT_C;

/// Timing and reference values for a firing run.
#[derive(Debug, Clone)]
pub struct RampCfg {
    /// Sampling cadence (ms). Each sample reads the sensor once and makes one
    /// heater decision.
    pub sample_period_ms: u64,
    /// Start temperature of the first phase (°C).
    pub ambient_c: f64,
    /// Sleep between control-loop iterations in `runner::run` (ms).
    pub poll_ms: u64,
    /// Start-button settle delay applied on press and on release (ms).
    pub settle_ms: u64,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            sample_period_ms: 1000,
            ambient_c: DEFAULT_AMBIENT_C,
            poll_ms: 5,
            settle_ms: 100,
        }
    }
}
