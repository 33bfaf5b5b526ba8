//! Ramp state machine states and per-step status.

/// Where the ramp state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampState {
    /// Waiting for a start trigger.
    Idle,
    /// Start button pressed; waiting for release.
    Arming,
    /// Ramping through phase `i`.
    PhaseRunning(usize),
    /// All phases ran; heater forced off.
    Completed,
    /// Abort requested during phase `i`; heater forced off.
    Aborted(usize),
}

impl RampState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted(_))
    }
}

/// Public status of a single step of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStatus {
    /// No run active; waiting for a start trigger.
    Idle,
    /// A phase is active.
    Running { phase: usize },
    /// The run finished; heater already off.
    Completed,
    /// The run was aborted in `phase`; heater already off.
    Aborted { phase: usize },
}

impl From<RampState> for RampStatus {
    fn from(s: RampState) -> Self {
        match s {
            RampState::Idle | RampState::Arming => Self::Idle,
            RampState::PhaseRunning(phase) => Self::Running { phase },
            RampState::Completed => Self::Completed,
            RampState::Aborted(phase) => Self::Aborted { phase },
        }
    }
}
