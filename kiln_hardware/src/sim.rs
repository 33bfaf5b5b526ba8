//! First-order thermal model standing in for a real kiln.

use std::cell::Cell;
use std::rc::Rc;

use kiln_traits::{Heater, TemperatureSensor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub initial_c: f64,
    /// Temperature the chamber relaxes towards with the element off.
    pub ambient_c: f64,
    /// Gain per sample while the element is on (°C).
    pub heat_c_per_sample: f64,
    /// Fraction of the excess over ambient lost per sample, in [0, 1].
    pub loss_per_sample: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            initial_c: 25.0,
            ambient_c: 25.0,
            heat_c_per_sample: 2.0,
            loss_per_sample: 0.01,
        }
    }
}

/// Shared simulated chamber. Hand out one sensor and one heater; the model
/// advances one sample each time the sensor is read.
#[derive(Debug, Clone)]
pub struct SimulatedKiln {
    temp_c: Rc<Cell<f64>>,
    element_on: Rc<Cell<bool>>,
    params: SimParams,
}

impl SimulatedKiln {
    pub fn new(params: SimParams) -> Self {
        Self {
            temp_c: Rc::new(Cell::new(params.initial_c)),
            element_on: Rc::new(Cell::new(false)),
            params,
        }
    }

    pub fn sensor(&self) -> SimulatedSensor {
        SimulatedSensor { kiln: self.clone() }
    }

    pub fn heater(&self) -> SimulatedHeater {
        SimulatedHeater { kiln: self.clone() }
    }

    pub fn temperature(&self) -> f64 {
        self.temp_c.get()
    }

    pub fn element_on(&self) -> bool {
        self.element_on.get()
    }

    fn tick(&self) -> f64 {
        let p = &self.params;
        let mut t = self.temp_c.get();
        if self.element_on.get() {
            t += p.heat_c_per_sample;
        }
        t -= (t - p.ambient_c) * p.loss_per_sample;
        self.temp_c.set(t);
        t
    }
}

impl Default for SimulatedKiln {
    fn default() -> Self {
        Self::new(SimParams::default())
    }
}

pub struct SimulatedSensor {
    kiln: SimulatedKiln,
}

impl TemperatureSensor for SimulatedSensor {
    fn read_celsius(&mut self) -> f64 {
        let t = self.kiln.tick();
        tracing::trace!(temp_c = t, "simulated thermocouple");
        t
    }
}

pub struct SimulatedHeater {
    kiln: SimulatedKiln,
}

impl Heater for SimulatedHeater {
    fn set(&mut self, on: bool) {
        if self.kiln.element_on.replace(on) != on {
            tracing::debug!(on, "simulated element switched");
        }
    }
}
