//! The ramp state machine (`RampCore`).
//!
//! One call to `step()` is one control-loop iteration: poll the abort port,
//! then, if a sample is due, read the sensor, compute the ramp setpoint and
//! switch the heater. Pacing between iterations belongs to the caller (see
//! `runner::run`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use kiln_traits::{Clock, Heater, TemperatureSensor};

use crate::config::RampCfg;
use crate::error::{KilnError, Result};
use crate::profile::Profile;
use crate::progress::{ProgressSample, ProgressSink};
use crate::setpoint;
use crate::status::{RampState, RampStatus};
use crate::util::{elapsed_secs, phase_elapsed, samples_to_ms};

pub(crate) type Check = Box<dyn FnMut() -> bool>;

/// Per-run bookkeeping. Exists only while a phase is running.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunState {
    pub(crate) phase: usize,
    pub(crate) start_c: f64,
    pub(crate) target_c: f64,
    pub(crate) duration_s: u64,
    pub(crate) gain: f64,
    /// Phase start, ms since the core epoch.
    pub(crate) start_ms: u64,
    pub(crate) samples: u64,
    pub(crate) next_sample_ms: u64,
}

/// Unified core for both dynamic (boxed) and generic (static dispatch) variants.
pub struct RampCore<S: TemperatureSensor, H: Heater> {
    pub(crate) profile: Profile,
    pub(crate) sensor: S,
    pub(crate) heater: H,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) cfg: RampCfg,

    pub(crate) state: RampState,
    pub(crate) run: Option<RunState>,
    pub(crate) abort_check: Option<Check>,
    pub(crate) start_check: Option<Check>,
    pub(crate) abort_latched: bool,
    pub(crate) sink: Box<dyn ProgressSink>,
    pub(crate) heater_on: bool,
    pub(crate) samples_taken: u64,
}

impl<S: TemperatureSensor, H: Heater> std::fmt::Debug for RampCore<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RampCore")
            .field("phases", &self.profile.len())
            .field("state", &self.state)
            .field("heater_on", &self.heater_on)
            .field("samples_taken", &self.samples_taken)
            .finish_non_exhaustive()
    }
}

impl<S: TemperatureSensor, H: Heater> RampCore<S, H> {
    pub fn state(&self) -> RampState {
        self.state
    }

    pub fn status(&self) -> RampStatus {
        self.state.into()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn cfg(&self) -> &RampCfg {
        &self.cfg
    }

    /// Last state written to the heater.
    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    /// Samples taken since the run started, across all phases.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    pub fn has_start_trigger(&self) -> bool {
        self.start_check.is_some()
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Replace the progress sink.
    pub fn set_progress_sink(&mut self, sink: impl ProgressSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Setpoint at the current instant, if a phase is running.
    pub fn setpoint_now(&self) -> Option<f64> {
        let run = self.run.as_ref()?;
        let elapsed_ms = self.now_ms().saturating_sub(run.start_ms);
        Some(setpoint::setpoint(
            run.start_c,
            run.target_c,
            run.duration_s as f64,
            elapsed_ms as f64 / 1000.0,
        ))
    }

    /// Replace the profile. Only allowed while no run is in progress.
    pub fn load_profile(&mut self, profile: Profile) -> Result<()> {
        if matches!(self.state, RampState::PhaseRunning(_) | RampState::Arming) {
            return Err(eyre::Report::new(KilnError::State(
                "cannot replace the profile while a firing is in progress".into(),
            )));
        }
        self.reset();
        self.profile = profile;
        Ok(())
    }

    /// Start a run now, bypassing the start trigger.
    ///
    /// A terminal machine is reset first. Fails if a phase is already running.
    pub fn start(&mut self) -> Result<RampStatus> {
        match self.state {
            RampState::PhaseRunning(phase) => {
                return Err(eyre::Report::new(KilnError::State(format!(
                    "firing already running (phase {phase})"
                ))));
            }
            RampState::Completed | RampState::Aborted(_) => self.reset(),
            RampState::Idle | RampState::Arming => {}
        }
        self.begin();
        Ok(self.status())
    }

    /// Return to `Idle`, clearing the run and the abort latch.
    pub fn reset(&mut self) {
        if matches!(self.state, RampState::PhaseRunning(_)) {
            self.heater_off();
        }
        self.state = RampState::Idle;
        self.run = None;
        self.abort_latched = false;
        self.samples_taken = 0;
    }

    /// One iteration of the control loop.
    pub fn step(&mut self) -> RampStatus {
        match self.state {
            RampState::Idle | RampState::Arming => self.poll_trigger(),
            RampState::PhaseRunning(phase) => {
                if self.poll_abort() {
                    self.abort(phase);
                } else if let Some(due_ms) = self.run.as_ref().map(|r| r.next_sample_ms)
                    && self.now_ms() >= due_ms
                {
                    self.sample();
                }
            }
            RampState::Completed | RampState::Aborted(_) => {
                // The heater is already off; go back to waiting for the
                // next press of the start button.
                if self.start_check.is_some() {
                    self.reset();
                    self.poll_trigger();
                }
            }
        }
        self.status()
    }

    // ── Private: state transitions ───────────────────────────────────────────

    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    fn poll_abort(&mut self) -> bool {
        if !self.abort_latched
            && let Some(check) = self.abort_check.as_mut()
            && check()
        {
            self.abort_latched = true;
        }
        self.abort_latched
    }

    /// Press, settle, release, settle, start.
    fn poll_trigger(&mut self) {
        let Some(check) = self.start_check.as_mut() else {
            return;
        };
        let pressed = check();
        let settle = Duration::from_millis(self.cfg.settle_ms);
        match (self.state, pressed) {
            (RampState::Idle, true) => {
                tracing::debug!("start button pressed");
                self.clock.sleep(settle);
                self.state = RampState::Arming;
            }
            (RampState::Arming, false) => {
                tracing::debug!("start button released");
                self.clock.sleep(settle);
                self.begin();
            }
            _ => {}
        }
    }

    fn begin(&mut self) {
        self.abort_latched = false;
        self.samples_taken = 0;
        tracing::info!(
            phases = self.profile.len(),
            total_s = self.profile.total_duration_s(),
            "firing started"
        );
        if self.profile.is_empty() {
            self.state = RampState::Completed;
            self.run = None;
            tracing::info!("empty profile, nothing to fire");
            return;
        }
        let now = self.now_ms();
        self.enter_phase(0, now);
    }

    fn enter_phase(&mut self, index: usize, at_ms: u64) {
        let ambient = self.cfg.ambient_c;
        let (Some(phase), Some(start_c)) = (
            self.profile.phase(index).copied(),
            self.profile.start_temperature(index, ambient),
        ) else {
            self.finish();
            return;
        };
        let duration_s = phase.duration_s();
        let gain = setpoint::gain(start_c, phase.target_c(), duration_s as f64);
        self.run = Some(RunState {
            phase: index,
            start_c,
            target_c: phase.target_c(),
            duration_s,
            gain,
            start_ms: at_ms,
            samples: 0,
            next_sample_ms: at_ms.saturating_add(self.cfg.sample_period_ms),
        });
        self.state = RampState::PhaseRunning(index);
        tracing::info!(
            phase = index,
            start_c,
            target_c = phase.target_c(),
            duration_s,
            gain,
            "phase started"
        );
    }

    fn sample(&mut self) {
        let period = self.cfg.sample_period_ms;
        let Some(run) = self.run.as_mut() else {
            return;
        };
        run.samples = run.samples.saturating_add(1);
        run.next_sample_ms = run.next_sample_ms.saturating_add(period);
        let run = *run;
        self.samples_taken = self.samples_taken.saturating_add(1);

        let measured_c = self.sensor.read_celsius();
        let elapsed_s = elapsed_secs(run.samples, period);
        let setpoint_c =
            setpoint::setpoint(run.start_c, run.target_c, run.duration_s as f64, elapsed_s);
        let on = measured_c < setpoint_c;
        self.heater.set(on);
        self.heater_on = on;

        self.sink.emit(&ProgressSample {
            phase_index: run.phase,
            elapsed_s,
            measured_c,
            setpoint_c,
            gain: run.gain,
            heater_on: on,
        });

        if phase_elapsed(run.samples, period, run.duration_s) {
            // Next phase starts on this sample's scheduled tick, not on the
            // (possibly late) wall time of this iteration.
            let end_ms = run
                .start_ms
                .saturating_add(samples_to_ms(run.samples, period));
            self.advance(run.phase, end_ms);
        }
    }

    fn advance(&mut self, finished: usize, at_ms: u64) {
        tracing::info!(phase = finished, "phase complete");
        let next = finished + 1;
        if next < self.profile.len() {
            self.enter_phase(next, at_ms);
        } else {
            self.finish();
        }
    }

    fn heater_off(&mut self) {
        self.heater.set(false);
        self.heater_on = false;
    }

    fn finish(&mut self) {
        self.heater_off();
        self.run = None;
        self.state = RampState::Completed;
        tracing::info!(samples = self.samples_taken, "firing complete");
    }

    fn abort(&mut self, phase: usize) {
        self.heater_off();
        self.run = None;
        self.state = RampState::Aborted(phase);
        tracing::warn!(phase, samples = self.samples_taken, "firing aborted");
    }
}
