//! Type-state builder for `RampRunner` and generic `build_ramp` constructor.
//!
//! The builder enforces at compile time that a sensor, a heater and a profile
//! are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use kiln_traits::clock::{Clock, MonotonicClock};
use kiln_traits::{Heater, TemperatureSensor};

use crate::config::RampCfg;
use crate::core::{Check, RampCore};
use crate::error::{BuildError, Result};
use crate::profile::Profile;
use crate::progress::{NullSink, ProgressSink};
use crate::runner::{self, RunOptions, RunOutcome};
use crate::status::{RampState, RampStatus};

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Boxed ramp controller, the usual entry point.
pub struct RampRunner {
    pub(crate) inner: RampCore<Box<dyn TemperatureSensor>, Box<dyn Heater>>,
}

impl std::fmt::Debug for RampRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RampRunner")
            .field("phases", &self.inner.profile.len())
            .field("state", &self.inner.state)
            .field("heater_on", &self.inner.heater_on)
            .finish()
    }
}

impl RampRunner {
    /// Start building a RampRunner.
    pub fn builder() -> RampBuilder<Missing, Missing, Missing> {
        RampBuilder::default()
    }

    pub fn state(&self) -> RampState {
        self.inner.state()
    }

    pub fn status(&self) -> RampStatus {
        self.inner.status()
    }

    pub fn profile(&self) -> &Profile {
        self.inner.profile()
    }

    pub fn cfg(&self) -> &RampCfg {
        self.inner.cfg()
    }

    pub fn heater_on(&self) -> bool {
        self.inner.heater_on()
    }

    pub fn samples_taken(&self) -> u64 {
        self.inner.samples_taken()
    }

    pub fn setpoint_now(&self) -> Option<f64> {
        self.inner.setpoint_now()
    }

    /// One iteration of the control loop.
    pub fn step(&mut self) -> RampStatus {
        self.inner.step()
    }

    /// Start a firing immediately.
    pub fn start(&mut self) -> Result<RampStatus> {
        self.inner.start()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Replace the profile between firings.
    pub fn load_profile(&mut self, profile: Profile) -> Result<()> {
        self.inner.load_profile(profile)
    }

    pub fn set_progress_sink(&mut self, sink: impl ProgressSink + 'static) {
        self.inner.set_progress_sink(sink);
    }

    /// Drive one firing to a terminal state. See `runner::run`.
    pub fn run(&mut self, opts: RunOptions) -> Result<RunOutcome> {
        runner::run(&mut self.inner, opts)
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `RampRunner`. Timing is validated on `build()`.
pub struct RampBuilder<S, H, P> {
    sensor: Option<Box<dyn TemperatureSensor>>,
    heater: Option<Box<dyn Heater>>,
    profile: Option<Profile>,
    cfg: Option<RampCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    abort_check: Option<Check>,
    start_check: Option<Check>,
    sink: Option<Box<dyn ProgressSink>>,
    _s: PhantomData<S>,
    _h: PhantomData<H>,
    _p: PhantomData<P>,
}

impl Default for RampBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            heater: None,
            profile: None,
            cfg: None,
            clock: None,
            abort_check: None,
            start_check: None,
            sink: None,
            _s: PhantomData,
            _h: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Validate timing and construct a `RampCore`.
///
/// Shared by `RampBuilder::try_build()` and `build_ramp()`.
#[allow(clippy::too_many_arguments)]
fn validate_and_build<S: TemperatureSensor, H: Heater>(
    sensor: S,
    heater: H,
    profile: Profile,
    cfg: RampCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    abort_check: Option<Check>,
    start_check: Option<Check>,
    sink: Option<Box<dyn ProgressSink>>,
) -> Result<RampCore<S, H>> {
    if cfg.sample_period_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sample_period_ms must be >= 1",
        )));
    }
    if cfg.poll_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "poll_ms must be >= 1",
        )));
    }
    if !cfg.ambient_c.is_finite() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "ambient_c must be finite",
        )));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    Ok(RampCore {
        profile,
        sensor,
        heater,
        clock,
        epoch,
        cfg,
        state: RampState::Idle,
        run: None,
        abort_check,
        start_check,
        abort_latched: false,
        sink: sink.unwrap_or_else(|| Box::new(NullSink)),
        heater_on: false,
        samples_taken: 0,
    })
}

impl<S, H, P> RampBuilder<S, H, P> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<RampRunner> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let heater = self
            .heater
            .ok_or_else(|| eyre::Report::new(BuildError::MissingHeater))?;
        let profile = self
            .profile
            .ok_or_else(|| eyre::Report::new(BuildError::MissingProfile))?;

        let inner = validate_and_build(
            sensor,
            heater,
            profile,
            self.cfg.unwrap_or_default(),
            self.clock,
            self.abort_check,
            self.start_check,
            self.sink,
        )?;

        Ok(RampRunner { inner })
    }

    fn retype<S2, H2, P2>(self) -> RampBuilder<S2, H2, P2> {
        RampBuilder {
            sensor: self.sensor,
            heater: self.heater,
            profile: self.profile,
            cfg: self.cfg,
            clock: self.clock,
            abort_check: self.abort_check,
            start_check: self.start_check,
            sink: self.sink,
            _s: PhantomData,
            _h: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<S, H, P> RampBuilder<S, H, P> {
    pub fn with_cfg(mut self, cfg: RampCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }
    /// Poll `f` once per iteration; `true` aborts the running phase.
    pub fn with_abort_check<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.abort_check = Some(Box::new(f));
        self
    }
    /// Poll `f` while idle; a press followed by a release starts the run.
    pub fn with_start_trigger<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.start_check = Some(Box::new(f));
        self
    }
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<H, P> RampBuilder<Missing, H, P> {
    pub fn with_sensor(
        mut self,
        sensor: impl TemperatureSensor + 'static,
    ) -> RampBuilder<Set, H, P> {
        self.sensor = Some(Box::new(sensor));
        self.retype()
    }
}

impl<S, P> RampBuilder<S, Missing, P> {
    pub fn with_heater(mut self, heater: impl Heater + 'static) -> RampBuilder<S, Set, P> {
        self.heater = Some(Box::new(heater));
        self.retype()
    }
}

impl<S, H> RampBuilder<S, H, Missing> {
    pub fn with_profile(mut self, profile: Profile) -> RampBuilder<S, H, Set> {
        self.profile = Some(profile);
        self.retype()
    }
}

impl RampBuilder<Set, Set, Set> {
    /// Validate and build. Only available when sensor, heater and profile are set.
    pub fn build(self) -> Result<RampRunner> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type RampG<S, H> = RampCore<S, H>;

/// Build a generic, statically-dispatched `RampG` from concrete ports.
///
/// Delegates to the shared `validate_and_build`. Attach a progress sink
/// afterwards with `set_progress_sink`.
pub fn build_ramp<S, H>(
    sensor: S,
    heater: H,
    profile: Profile,
    cfg: RampCfg,
    abort_check: Option<Box<dyn FnMut() -> bool>>,
    start_check: Option<Box<dyn FnMut() -> bool>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<RampG<S, H>>
where
    S: TemperatureSensor + 'static,
    H: Heater + 'static,
{
    validate_and_build(
        sensor,
        heater,
        profile,
        cfg,
        clock,
        abort_check,
        start_check,
        None,
    )
}
