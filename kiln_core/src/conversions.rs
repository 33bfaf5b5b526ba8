//! Conversions from `kiln_config` documents into validated `kiln_core` types.

use kiln_config::{PhaseDoc, ProfileDoc};

use crate::config::RampCfg;
use crate::error::ProfileError;
use crate::profile::Profile;

// ── RampCfg ──────────────────────────────────────────────────────────────────

impl From<&kiln_config::ControlCfg> for RampCfg {
    fn from(c: &kiln_config::ControlCfg) -> Self {
        Self {
            sample_period_ms: c.sample_period_ms,
            ambient_c: c.ambient_c,
            poll_ms: c.poll_ms,
            settle_ms: c.settle_ms,
        }
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

impl TryFrom<&ProfileDoc> for Profile {
    type Error = ProfileError;

    fn try_from(doc: &ProfileDoc) -> Result<Self, Self::Error> {
        match doc {
            ProfileDoc::Columns { time, temperature } => {
                if time.len() != temperature.len() {
                    return Err(ProfileError::MismatchedColumns {
                        durations: time.len(),
                        targets: temperature.len(),
                    });
                }
                Self::from_pairs(time.iter().copied().zip(temperature.iter().copied()))
            }
            ProfileDoc::Phases { phases } => Self::try_from(phases.as_slice()),
        }
    }
}

impl TryFrom<&[PhaseDoc]> for Profile {
    type Error = ProfileError;

    fn try_from(phases: &[PhaseDoc]) -> Result<Self, Self::Error> {
        Self::from_pairs(phases.iter().map(|p| (p.duration_s, p.target_c)))
    }
}
