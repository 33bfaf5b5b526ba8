//! Common time helpers for kiln_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Milliseconds covered by `samples` samples of `period_ms`, saturating.
#[inline]
pub fn samples_to_ms(samples: u64, period_ms: u64) -> u64 {
    samples.saturating_mul(period_ms)
}

/// Phase length in milliseconds, saturating.
#[inline]
pub fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(MILLIS_PER_SEC)
}

/// Elapsed seconds after `samples` samples of `period_ms`.
#[inline]
pub fn elapsed_secs(samples: u64, period_ms: u64) -> f64 {
    samples_to_ms(samples, period_ms) as f64 / MILLIS_PER_SEC as f64
}

/// True once `samples` samples of `period_ms` cover a phase of `duration_s`.
#[inline]
pub fn phase_elapsed(samples: u64, period_ms: u64, duration_s: u64) -> bool {
    samples_to_ms(samples, period_ms) >= secs_to_ms(duration_s)
}
