//! The persistent "Bluetooth Timer" notification

use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{state::TimerEvent, utils::format_remaining};

pub const NOTIFICATION_TITLE: &str = "Bluetooth Timer";

/// What the single notification slot should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub body: String,
    /// Ongoing notifications never expire on their own
    pub ongoing: bool,
}

impl NotificationContent {
    fn ongoing(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ongoing: true,
        }
    }

    fn last(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ongoing: false,
        }
    }
}

/// Map a timer event onto the notification slot
pub fn render(event: &TimerEvent) -> NotificationContent {
    match event {
        TimerEvent::Started { .. } => NotificationContent::ongoing("Timer running..."),
        TimerEvent::Progress { remaining_ms } => NotificationContent::ongoing(format!(
            "Time remaining: {}",
            format_remaining(*remaining_ms)
        )),
        TimerEvent::Finished { success: true } => NotificationContent::last("Bluetooth turned off"),
        TimerEvent::Finished { success: false } => {
            NotificationContent::last("Failed to turn off Bluetooth")
        }
        TimerEvent::Cancelled => NotificationContent::last("Timer cancelled"),
    }
}

/// Desktop notification updated in place through notify-send
#[derive(Debug, Default)]
pub struct DesktopNotifier {
    id: Option<u32>,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    async fn show(&mut self, content: &NotificationContent) -> Result<(), String> {
        let mut command = Command::new("notify-send");
        command
            .arg("--app-name=bt-timer")
            .arg("--print-id")
            .arg("--urgency=low");
        if let Some(id) = self.id {
            command.arg(format!("--replace-id={}", id));
        }
        if content.ongoing {
            command
                .arg("--expire-time=0")
                .arg("--hint=boolean:resident:true");
        }
        command.arg(NOTIFICATION_TITLE).arg(&content.body);

        let output = command
            .output()
            .await
            .map_err(|e| format!("Failed to execute notify-send: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("notify-send failed: {}", stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Ok(id) = stdout.trim().parse() {
            self.id = Some(id);
        }
        if !content.ongoing {
            self.id = None;
        }
        Ok(())
    }
}

/// Every content shown, kept in memory; clones share the same history
#[derive(Debug, Clone, Default)]
pub struct NotificationHistory {
    shown: Arc<Mutex<Vec<NotificationContent>>>,
}

impl NotificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, content: &NotificationContent) {
        let mut shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        shown.push(content.clone());
    }

    pub fn shown(&self) -> Vec<NotificationContent> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<NotificationContent> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }
}

/// Notification backend
#[derive(Debug)]
pub enum Notifier {
    Desktop(DesktopNotifier),
    Log,
    Memory(NotificationHistory),
}

impl Notifier {
    /// Show `content`; failures are logged and otherwise ignored
    pub async fn show(&mut self, content: &NotificationContent) {
        match self {
            Notifier::Desktop(desktop) => {
                if let Err(e) = desktop.show(content).await {
                    warn!("Notification update failed: {}", e);
                }
            }
            Notifier::Log if content.ongoing => {
                debug!("[{}] {}", NOTIFICATION_TITLE, content.body);
            }
            Notifier::Log => {
                info!("[{}] {}", NOTIFICATION_TITLE, content.body);
            }
            Notifier::Memory(history) => history.push(content),
        }
    }
}
