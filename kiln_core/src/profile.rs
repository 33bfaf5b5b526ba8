//! Firing profile data model.
//!
//! A `Profile` is an ordered list of phases. Each phase ramps linearly from
//! its start temperature (the previous phase's target, or ambient for the
//! first phase) to its own target over its duration. Profiles are validated
//! on construction and immutable afterwards, so a value of this type is
//! always safe to run.

use std::num::NonZeroU64;

use crate::error::ProfileError;
use crate::setpoint;

/// Maximum number of phases a profile may hold.
pub const MAX_PHASES: usize = 10;

/// Start temperature of the first phase when none is configured (°C).
pub const DEFAULT_AMBIENT_C: f64 = 25.0;

/// One segment of a firing profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    duration_s: NonZeroU64,
    target_c: f64,
}

impl Phase {
    pub fn new(duration_s: NonZeroU64, target_c: f64) -> Self {
        Self {
            duration_s,
            target_c,
        }
    }

    #[inline]
    pub fn duration_s(&self) -> u64 {
        self.duration_s.get()
    }

    #[inline]
    pub fn target_c(&self) -> f64 {
        self.target_c
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    phases: Vec<Phase>,
}

impl Profile {
    /// Validate and wrap a list of phases.
    pub fn new(phases: Vec<Phase>) -> Result<Self, ProfileError> {
        if phases.len() > MAX_PHASES {
            return Err(ProfileError::TooManyPhases {
                len: phases.len(),
                max: MAX_PHASES,
            });
        }
        if let Some(index) = phases.iter().position(|p| !p.target_c.is_finite()) {
            return Err(ProfileError::NonFiniteTarget { index });
        }
        Ok(Self { phases })
    }

    /// Build from `(duration_s, target_c)` pairs, rejecting zero durations.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let phases = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (duration_s, target_c))| {
                NonZeroU64::new(duration_s)
                    .map(|d| Phase::new(d, target_c))
                    .ok_or(ProfileError::ZeroDuration { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(phases)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Start temperature of phase `index`: the previous phase's target, or
    /// `ambient_c` for the first phase. `None` past the end.
    pub fn start_temperature(&self, index: usize, ambient_c: f64) -> Option<f64> {
        if index >= self.phases.len() {
            return None;
        }
        Some(match index {
            0 => ambient_c,
            i => self.phases[i - 1].target_c,
        })
    }

    /// Ramp slope of phase `index` in °C per second.
    pub fn gain(&self, index: usize, ambient_c: f64) -> Option<f64> {
        let phase = self.phase(index)?;
        let start = self.start_temperature(index, ambient_c)?;
        Some(setpoint::gain(start, phase.target_c, phase.duration_s() as f64))
    }

    /// Setpoint of phase `index` after `elapsed_s` seconds in that phase.
    pub fn setpoint_at(&self, index: usize, elapsed_s: f64, ambient_c: f64) -> Option<f64> {
        let phase = self.phase(index)?;
        let start = self.start_temperature(index, ambient_c)?;
        Some(setpoint::setpoint(
            start,
            phase.target_c,
            phase.duration_s() as f64,
            elapsed_s,
        ))
    }

    /// Sum of all phase durations in seconds.
    pub fn total_duration_s(&self) -> u64 {
        self.phases
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.duration_s()))
    }
}
