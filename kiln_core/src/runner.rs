//! Blocking driver loop around `RampCore::step`.

use std::time::Duration;

use kiln_traits::{Heater, TemperatureSensor};

use crate::core::RampCore;
use crate::error::{KilnError, Result};
use crate::status::RampStatus;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Wait for the start trigger instead of starting immediately.
    pub wait_for_trigger: bool,
}

/// How a firing ended. Abort is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { phases: usize, samples: u64 },
    Aborted { phase: usize, samples: u64 },
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Run one firing to completion or abort, sleeping `poll_ms` between
/// iterations, then reset the machine to idle.
///
/// The heater is off when this returns.
pub fn run<S, H>(ramp: &mut RampCore<S, H>, opts: RunOptions) -> Result<RunOutcome>
where
    S: TemperatureSensor,
    H: Heater,
{
    if ramp.state().is_terminal() {
        ramp.reset();
    }
    if opts.wait_for_trigger {
        if !ramp.has_start_trigger() {
            return Err(eyre::Report::new(KilnError::State(
                "no start trigger configured".into(),
            )));
        }
        tracing::info!("waiting for start button");
    } else {
        ramp.start()?;
    }

    let poll = Duration::from_millis(ramp.cfg().poll_ms);
    let clock = ramp.clock().clone();
    let outcome = loop {
        match ramp.step() {
            RampStatus::Completed => {
                break RunOutcome::Completed {
                    phases: ramp.profile().len(),
                    samples: ramp.samples_taken(),
                };
            }
            RampStatus::Aborted { phase } => {
                break RunOutcome::Aborted {
                    phase,
                    samples: ramp.samples_taken(),
                };
            }
            RampStatus::Idle | RampStatus::Running { .. } => clock.sleep(poll),
        }
    };

    ramp.reset();
    tracing::debug!(?outcome, "run finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_ramp;
    use crate::config::RampCfg;
    use crate::profile::Profile;
    use kiln_traits::clock::test_clock::TestClock;

    struct Fixed(f64);
    impl TemperatureSensor for Fixed {
        fn read_celsius(&mut self) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Relay(bool);
    impl Heater for Relay {
        fn set(&mut self, on: bool) {
            self.0 = on;
        }
    }

    #[test]
    fn runs_two_phases_with_test_clock() {
        let clock = TestClock::new();
        let profile = Profile::from_pairs([(10, 100.0), (5, 50.0)]).unwrap();
        let mut ramp = build_ramp(
            Fixed(20.0),
            Relay::default(),
            profile,
            RampCfg::default(),
            None,
            None,
            Some(Box::new(clock.clone())),
        )
        .unwrap();

        let out = run(&mut ramp, RunOptions::default()).unwrap();
        assert_eq!(
            out,
            RunOutcome::Completed {
                phases: 2,
                samples: 15
            }
        );
        assert!(!ramp.heater.0);
        assert!(clock.elapsed() >= Duration::from_secs(15));
        assert!(clock.elapsed() < Duration::from_secs(16));
    }

    #[test]
    fn waiting_without_trigger_is_an_error() {
        let mut ramp = build_ramp(
            Fixed(20.0),
            Relay::default(),
            Profile::empty(),
            RampCfg::default(),
            None,
            None,
            Some(Box::new(TestClock::new())),
        )
        .unwrap();
        let err = run(
            &mut ramp,
            RunOptions {
                wait_for_trigger: true,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KilnError>(),
            Some(KilnError::State(_))
        ));
    }
}
