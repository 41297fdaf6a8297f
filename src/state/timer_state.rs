//! Timer phase and the snapshot published to status readers

use serde::Serialize;

use super::CountdownSession;

/// Where the countdown state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    Expired,
    Cancelled,
}

impl TimerPhase {
    pub fn is_running(self) -> bool {
        matches!(self, TimerPhase::Running)
    }
}

/// Read-only view of the timer for status queries
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub session: Option<CountdownSession>,
    pub remaining_ms: Option<u64>,
}

impl TimerSnapshot {
    /// Snapshot of a service that has never run a session
    pub fn idle() -> Self {
        Self {
            phase: TimerPhase::Idle,
            session: None,
            remaining_ms: None,
        }
    }

    /// Snapshot of a running session with the time left
    pub fn running(session: CountdownSession, remaining_ms: u64) -> Self {
        Self {
            phase: TimerPhase::Running,
            session: Some(session),
            remaining_ms: Some(remaining_ms),
        }
    }

    /// Snapshot after a session ended in `phase`
    pub fn ended(phase: TimerPhase) -> Self {
        Self {
            phase,
            session: None,
            remaining_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
