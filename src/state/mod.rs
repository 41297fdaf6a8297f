//! State management module
//!
//! Session, timer phase, event and shared application state types.

pub mod app_state;
pub mod events;
pub mod session;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use events::TimerEvent;
pub use session::{CountdownSession, Minutes};
pub use timer_state::{TimerPhase, TimerSnapshot};
