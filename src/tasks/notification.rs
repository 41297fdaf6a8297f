//! Notification task: keeps the persistent notification in step with the timer

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::{
    services::{render, NotificationContent, Notifier},
    state::{TimerEvent, TimerSnapshot},
    tasks::recv_event,
};

/// Decides what the single notification slot shows next
#[derive(Debug, Default)]
pub struct NotificationSlot {
    ongoing: bool,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every timer event replaces the slot content
    pub fn on_event(&mut self, event: &TimerEvent) -> NotificationContent {
        let content = render(event);
        self.ongoing = content.ongoing;
        content
    }

    /// A session that ended without an event releases the slot
    pub fn on_snapshot(&mut self, snapshot: &TimerSnapshot) -> Option<NotificationContent> {
        if !self.ongoing || snapshot.is_running() {
            return None;
        }
        self.ongoing = false;
        Some(NotificationContent {
            body: "Timer finished".to_string(),
            ongoing: false,
        })
    }
}

/// Render every timer event into the notification slot
///
/// A session that expires without a completion event (adapter absent or
/// already off) is noticed through the snapshot and the slot is released.
pub async fn notification_task(
    mut notifier: Notifier,
    mut events: broadcast::Receiver<TimerEvent>,
    mut snapshot: watch::Receiver<TimerSnapshot>,
) {
    info!("Starting notification task");
    let mut slot = NotificationSlot::new();

    loop {
        tokio::select! {
            biased;

            event = recv_event(&mut events) => {
                let Some(event) = event else { break };
                let content = slot.on_event(&event);
                notifier.show(&content).await;
            }
            changed = snapshot.changed() => {
                if changed.is_err() {
                    break;
                }
                let content = slot.on_snapshot(&snapshot.borrow_and_update());
                if let Some(content) = content {
                    notifier.show(&content).await;
                }
            }
        }
    }

    debug!("Notification task stopped");
}
