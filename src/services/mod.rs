//! Platform services module
//!
//! Bluetooth adapter backends and the desktop notification used while a
//! countdown is running.

pub mod adapter;
pub mod bluetoothctl;
pub mod notifier;
pub mod rfkill;
pub mod simulated;

// Re-export main types
pub use adapter::{disable_bluetooth, Adapter, AdapterState, DisableOutcome};
pub use bluetoothctl::BluetoothctlAdapter;
pub use notifier::{
    render, DesktopNotifier, NotificationContent, NotificationHistory, Notifier,
};
pub use rfkill::RfkillAdapter;
pub use simulated::SimulatedAdapter;
