//! User interface module
//!
//! The controller that turns user input into timer commands, the validation
//! it shares with the HTTP API, and the interactive terminal front-end.

pub mod controller;
pub mod terminal;
pub mod validation;

// Re-export main types
pub use controller::{Controller, Layout, Update, View, IDLE_COUNTDOWN};
pub use terminal::{parse_command, run_terminal, TerminalCommand};
pub use validation::{validate_start, Preset};
