#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kiln_core::{ProgressSample, RampStatus};
use kiln_traits::clock::test_clock::TestClock;
use kiln_traits::{Heater, TemperatureSensor};

/// Sensor whose reading the test controls; counts reads.
#[derive(Clone, Default)]
pub struct ProbeSensor {
    pub temp: Rc<Cell<f64>>,
    pub reads: Rc<Cell<usize>>,
}

impl ProbeSensor {
    pub fn at(temp_c: f64) -> Self {
        let s = Self::default();
        s.temp.set(temp_c);
        s
    }
}

impl TemperatureSensor for ProbeSensor {
    fn read_celsius(&mut self) -> f64 {
        self.reads.set(self.reads.get() + 1);
        self.temp.get()
    }
}

/// Heater that records every write.
#[derive(Clone, Default)]
pub struct SpyHeater {
    pub writes: Rc<RefCell<Vec<bool>>>,
}

impl Heater for SpyHeater {
    fn set(&mut self, on: bool) {
        self.writes.borrow_mut().push(on);
    }
}

impl SpyHeater {
    pub fn last(&self) -> Option<bool> {
        self.writes.borrow().last().copied()
    }

    pub fn count(&self) -> usize {
        self.writes.borrow().len()
    }
}

pub type Samples = Rc<RefCell<Vec<ProgressSample>>>;

/// A closure sink collecting samples into a shared vector.
pub fn collector() -> (Samples, impl FnMut(&ProgressSample) + 'static) {
    let samples: Samples = Rc::default();
    let sink_ref = samples.clone();
    (samples, move |s: &ProgressSample| {
        sink_ref.borrow_mut().push(*s)
    })
}

/// Advance `period_ms` per step until the run leaves `Running`.
pub fn drive(
    mut step: impl FnMut() -> RampStatus,
    clock: &TestClock,
    period_ms: u64,
) -> RampStatus {
    for _ in 0..100_000 {
        clock.advance_ms(period_ms);
        match step() {
            RampStatus::Running { .. } => continue,
            other => return other,
        }
    }
    panic!("run did not terminate");
}
