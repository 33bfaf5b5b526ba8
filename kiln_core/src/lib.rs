#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core ramp logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent firing engine. All hardware
//! interactions go through `kiln_traits::TemperatureSensor` and
//! `kiln_traits::Heater`.
//!
//! ## Architecture
//!
//! - **Profile**: validated, immutable list of phases (`profile` module)
//! - **Setpoint**: linear interpolation within a phase (`setpoint` module)
//! - **Control**: bang-bang state machine against the ramped setpoint (`RampCore`)
//! - **Runner**: blocking loop that paces `step()` (`runner` module)
//! - **Sources**: profile loading from disk (`source` module)
//! - **Progress**: per-sample reporting sinks (`progress` module)
//!
//! Time comes from `kiln_traits::Clock`; tests swap in `TestClock` and never
//! sleep.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod core;
pub mod error;
pub mod profile;
pub mod progress;
pub mod runner;
pub mod setpoint;
pub mod source;
pub mod status;
pub mod util;

pub use builder::{Missing, RampBuilder, RampG, RampRunner, Set, build_ramp};
pub use config::RampCfg;
pub use crate::core::RampCore;
pub use error::{BuildError, KilnError, ProfileError, Report, Result};
pub use profile::{DEFAULT_AMBIENT_C, MAX_PHASES, Phase, Profile};
pub use progress::{
    ChannelSink, DroppedSamples, NullSink, ProgressSample, ProgressSink, TracingSink,
};
pub use runner::{RunOptions, RunOutcome};
pub use source::{FileProfileSource, ProfileSource};
pub use status::{RampState, RampStatus};
