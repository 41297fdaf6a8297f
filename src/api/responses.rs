//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::AdapterState,
    state::{CountdownSession, TimerSnapshot},
};

/// Minutes as typed by a user or sent as a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MinutesInput {
    Number(i64),
    Text(String),
}

impl MinutesInput {
    /// The raw text the shared validation runs on
    pub fn as_text(&self) -> String {
        match self {
            MinutesInput::Number(n) => n.to_string(),
            MinutesInput::Text(text) => text.clone(),
        }
    }
}

/// Body of `POST /timer/start`
#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub minutes: MinutesInput,
}

/// API response structure for timer commands
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<CountdownSession>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, session: Option<CountdownSession>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    pub fn started(session: CountdownSession) -> Self {
        let message = format!("Timer started for {} minutes", session.duration_minutes);
        Self::new("started", message, Some(session))
    }

    pub fn already_running(session: CountdownSession) -> Self {
        Self::new("already_running", "Timer already running".to_string(), Some(session))
    }

    pub fn cancelled() -> Self {
        Self::new("cancelled", "Timer cancelled".to_string(), None)
    }

    pub fn not_running() -> Self {
        Self::new("not_running", "No timer running".to_string(), None)
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error", message, None)
    }
}

/// Status response with timer and adapter information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub bluetooth: AdapterState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
