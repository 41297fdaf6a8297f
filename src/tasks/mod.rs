//! Background tasks module
//!
//! The countdown service and the tasks that run alongside it.

pub mod adapter_monitor;
pub mod notification;
pub mod timer_service;

// Re-export main functions
pub use adapter_monitor::{adapter_monitor_task, spawn_adapter_monitor};
pub use notification::{notification_task, NotificationSlot};
pub use timer_service::{
    recv_event, spawn_timer_service, CancelOutcome, StartOutcome, TimerHandle, TimerService,
};
