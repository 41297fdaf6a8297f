//! bt-timer - switch Bluetooth off after a chosen delay
//!
//! A single countdown service owns the session and publishes progress and
//! completion events. A terminal controller and an HTTP API start and cancel
//! it, and a desktop notification mirrors the countdown.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use tasks::{spawn_timer_service, TimerHandle};
pub use utils::signals::shutdown_signal;
