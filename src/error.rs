//! Error types shared across the crate

use thiserror::Error;

/// Input rejected at a UI boundary before it can reach the timer service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter time in minutes")]
    Empty,
    #[error("Bluetooth is already OFF")]
    BluetoothOff,
    #[error("Please enter time between 1-999 minutes")]
    OutOfRange,
}

/// Failures talking to the Bluetooth adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Bluetooth not supported")]
    Unavailable,
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed: {stderr}")]
    Command {
        program: &'static str,
        stderr: String,
    },
    #[error("failed to read adapter state: {0}")]
    Io(#[from] std::io::Error),
}

/// The timer service task is gone and can no longer accept commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("timer service is not running")]
    Closed,
}

/// Errors surfaced by the UI controller
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}
