//! Per-sample progress reporting.
//!
//! The ramp core emits one `ProgressSample` for every sensor sample. Sinks
//! must not block: the control loop calls them inline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Sender, TrySendError};

/// Snapshot of one control decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub phase_index: usize,
    /// Seconds since the start of the current phase.
    pub elapsed_s: f64,
    pub measured_c: f64,
    pub setpoint_c: f64,
    /// Ramp slope of the current phase (°C/s).
    pub gain: f64,
    pub heater_on: bool,
}

pub trait ProgressSink {
    fn emit(&mut self, sample: &ProgressSample);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressSample),
{
    fn emit(&mut self, sample: &ProgressSample) {
        self(sample);
    }
}

/// Discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _sample: &ProgressSample) {}
}

/// Logs each sample at `info` under the `kiln::progress` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&mut self, s: &ProgressSample) {
        tracing::info!(
            target: "kiln::progress",
            phase = s.phase_index,
            elapsed_s = s.elapsed_s,
            temp_c = s.measured_c,
            setpoint_c = s.setpoint_c,
            gain = s.gain,
            heater = s.heater_on,
            "sample"
        );
    }
}

/// Shared count of samples a `ChannelSink` could not deliver.
///
/// Stays readable after the sink itself has been moved into a ramp.
#[derive(Debug, Clone, Default)]
pub struct DroppedSamples(Arc<AtomicU64>);

impl DroppedSamples {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }
}

/// Forwards samples to another thread over a bounded channel.
///
/// Uses `try_send`: when the consumer falls behind, samples are dropped
/// and counted instead of stalling the control loop.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<ProgressSample>,
    dropped: DroppedSamples,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProgressSample>) -> Self {
        Self {
            tx,
            dropped: DroppedSamples::default(),
            disconnected: false,
        }
    }

    /// Number of samples dropped because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    /// Handle on the drop count that outlives the sink.
    pub fn dropped_counter(&self) -> DroppedSamples {
        self.dropped.clone()
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&mut self, sample: &ProgressSample) {
        match self.tx.try_send(*sample) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.bump();
                tracing::trace!(dropped, "progress channel full");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.bump();
                if !self.disconnected {
                    self.disconnected = true;
                    tracing::debug!("progress receiver gone; dropping further samples");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(phase_index: usize) -> ProgressSample {
        ProgressSample {
            phase_index,
            elapsed_s: 1.0,
            measured_c: 20.0,
            setpoint_c: 32.5,
            gain: 7.5,
            heater_on: true,
        }
    }

    #[test]
    fn closure_is_a_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |s: &ProgressSample| seen.push(s.phase_index);
            sink.emit(&sample(0));
            sink.emit(&sample(1));
        }
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn channel_sink_drops_when_full() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut sink = ChannelSink::new(tx);
        sink.emit(&sample(0));
        sink.emit(&sample(1));
        assert_eq!(sink.dropped(), 1);
        assert_eq!(rx.try_recv().unwrap().phase_index, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_survives_closed_receiver() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        sink.emit(&sample(0));
        sink.emit(&sample(0));
        assert_eq!(sink.dropped(), 2);
    }

    #[test]
    fn drop_count_is_readable_after_the_sink_is_gone() {
        let (tx, _rx) = crossbeam_channel::bounded(2);
        let mut sink = ChannelSink::new(tx);
        let counter = sink.dropped_counter();
        for i in 0..5 {
            sink.emit(&sample(i));
        }
        let mut boxed: Box<dyn ProgressSink> = Box::new(sink);
        boxed.emit(&sample(5));
        drop(boxed);
        assert_eq!(counter.get(), 4);
    }
}
