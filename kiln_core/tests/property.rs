mod common;

use common::{ProbeSensor, SpyHeater, collector, drive};
use kiln_core::setpoint::setpoint;
use kiln_core::{Profile, RampRunner, RampStatus};
use kiln_traits::clock::test_clock::TestClock;
use proptest::prelude::*;

prop_compose! {
    fn phases_strategy()(
        phases in prop::collection::vec((1u64..40, -50i32..1300), 0..=10),
    ) -> Vec<(u64, f64)> {
        phases.into_iter().map(|(d, t)| (d, f64::from(t))).collect()
    }
}

proptest! {
    #[test]
    fn endpoints_are_exact(start in -50i32..1300, target in -50i32..1300, duration in 1u32..100_000) {
        let (s, t, d) = (f64::from(start), f64::from(target), f64::from(duration));
        prop_assert_eq!(setpoint(s, t, d, 0.0), s);
        prop_assert_eq!(setpoint(s, t, d, d), t);
    }

    #[test]
    fn ramp_is_monotonic_in_elapsed(
        start in -50i32..1300,
        target in -50i32..1300,
        duration in 1u32..10_000,
        a in 0u32..10_000,
        b in 0u32..10_000,
    ) {
        let (s, t, d) = (f64::from(start), f64::from(target), f64::from(duration));
        let (lo, hi) = (f64::from(a.min(b)), f64::from(a.max(b)));
        let (x, y) = (setpoint(s, t, d, lo), setpoint(s, t, d, hi));
        if target > start {
            prop_assert!(x <= y);
        } else if target < start {
            prop_assert!(x >= y);
        } else {
            prop_assert_eq!(x, y);
        }
    }

    #[test]
    fn every_run_visits_phases_in_order_and_ends_off(
        pairs in phases_strategy(),
        measured in -50i32..1300,
        abort_after in prop::option::of(0usize..200),
    ) {
        let profile = Profile::from_pairs(pairs.clone()).unwrap();
        let sensor = ProbeSensor::at(f64::from(measured));
        let heater = SpyHeater::default();
        let clock = TestClock::new();
        let (samples, sink) = collector();
        let reads = sensor.reads.clone();
        let mut ramp = RampRunner::builder()
            .with_sensor(sensor)
            .with_heater(heater.clone())
            .with_profile(profile)
            .with_clock(Box::new(clock.clone()))
            .with_abort_check(move || abort_after.is_some_and(|n| reads.get() >= n))
            .with_progress(sink)
            .build()
            .unwrap();

        ramp.start().unwrap();
        let end = drive(|| ramp.step(), &clock, 1000);

        let seen: Vec<usize> = samples.borrow().iter().map(|s| s.phase_index).collect();
        prop_assert!(seen.windows(2).all(|w| w[0] <= w[1] && w[1] - w[0] <= 1));
        match end {
            RampStatus::Completed => {
                let total: u64 = pairs.iter().map(|(d, _)| *d).sum();
                prop_assert_eq!(seen.len() as u64, total);
            }
            RampStatus::Aborted { phase } => {
                // Abort lands in the phase of the last sample, or in the one
                // just entered after it.
                let last = seen.last().copied().unwrap_or(0);
                prop_assert!(phase == last || phase == last + 1, "{} after {}", phase, last);
            }
            other => prop_assert!(false, "unexpected terminal status {:?}", other),
        }
        if pairs.is_empty() {
            prop_assert_eq!(heater.count(), 0);
        } else {
            prop_assert_eq!(heater.last(), Some(false));
        }
    }
}
