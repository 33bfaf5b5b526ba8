//! Linear setpoint interpolation within one phase.

/// Ramp slope in °C per second.
///
/// `duration_s` must be > 0.
#[inline]
pub fn gain(start_c: f64, target_c: f64, duration_s: f64) -> f64 {
    debug_assert!(duration_s > 0.0, "phase duration must be > 0");
    (target_c - start_c) / duration_s
}

/// Instantaneous target temperature `elapsed_s` seconds into a phase that
/// ramps from `start_c` to `target_c` over `duration_s` seconds.
///
/// Equal to `start_c + gain * elapsed_s`. The product is taken before the
/// division so the result is exact at both ends of the ramp for whole-number
/// inputs. There is no clamping: past `duration_s` the line extrapolates, and
/// stopping the phase is the caller's job.
///
/// Preconditions: `elapsed_s >= 0`, `duration_s > 0`.
#[inline]
pub fn setpoint(start_c: f64, target_c: f64, duration_s: f64, elapsed_s: f64) -> f64 {
    debug_assert!(duration_s > 0.0, "phase duration must be > 0");
    debug_assert!(elapsed_s >= 0.0, "elapsed time must be >= 0");
    start_c + (target_c - start_c) * elapsed_s / duration_s
}
