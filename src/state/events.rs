//! Events published by the timer service

use serde::Serialize;

use super::CountdownSession;

/// Everything a subscriber can hear from the timer service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A new session began
    Started { session: CountdownSession },
    /// One tick of a running session
    Progress { remaining_ms: u64 },
    /// The session expired and the disable action ran
    Finished { success: bool },
    /// The session was cancelled before expiry
    Cancelled,
}

impl TimerEvent {
    /// Name used for the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Started { .. } => "started",
            TimerEvent::Progress { .. } => "progress",
            TimerEvent::Finished { .. } => "finished",
            TimerEvent::Cancelled => "cancelled",
        }
    }
}
