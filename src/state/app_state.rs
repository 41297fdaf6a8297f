//! Shared application state handed to the HTTP layer

use std::{sync::Mutex, time::Instant};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    services::{Adapter, AdapterState},
    tasks::TimerHandle,
};

/// Everything a request handler needs to reach the timer and the adapter
#[derive(Debug)]
pub struct AppState {
    /// Handle to the countdown service
    pub timer: TimerHandle,
    /// Backend used for direct adapter queries
    pub adapter: Adapter,
    /// Latest adapter state published by the monitor
    pub adapter_state: watch::Receiver<AdapterState>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        timer: TimerHandle,
        adapter: Adapter,
        adapter_state: watch::Receiver<AdapterState>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            timer,
            adapter,
            adapter_state,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Record that `action` just happened
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last) = self.last_action.lock() {
            *last = Some((action.to_string(), Utc::now()));
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|last| last.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    /// Current adapter state, as last seen by the monitor
    pub fn adapter_state(&self) -> AdapterState {
        *self.adapter_state.borrow()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
