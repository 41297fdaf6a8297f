//! Bluetooth adapter abstraction and the expiry disable action

use serde::Serialize;
use tracing::{debug, error, info};

use super::{BluetoothctlAdapter, RfkillAdapter, SimulatedAdapter};
use crate::error::AdapterError;

/// Power state of the adapter as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AdapterState {
    pub present: bool,
    pub enabled: bool,
}

impl AdapterState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn powered(enabled: bool) -> Self {
        Self {
            present: true,
            enabled,
        }
    }
}

/// The Bluetooth backend in use
#[derive(Debug, Clone)]
pub enum Adapter {
    Rfkill(RfkillAdapter),
    Bluetoothctl(BluetoothctlAdapter),
    Simulated(SimulatedAdapter),
}

impl Adapter {
    pub fn name(&self) -> &'static str {
        match self {
            Adapter::Rfkill(_) => "rfkill",
            Adapter::Bluetoothctl(_) => "bluetoothctl",
            Adapter::Simulated(_) => "simulated",
        }
    }

    /// Query presence and power state
    pub async fn state(&self) -> Result<AdapterState, AdapterError> {
        match self {
            Adapter::Rfkill(a) => a.state().await,
            Adapter::Bluetoothctl(a) => a.state().await,
            Adapter::Simulated(a) => Ok(a.state()),
        }
    }

    /// Whether this process is allowed to switch the adapter off
    pub async fn has_disable_capability(&self) -> bool {
        match self {
            Adapter::Rfkill(a) => a.has_disable_capability().await,
            Adapter::Bluetoothctl(a) => a.has_disable_capability().await,
            Adapter::Simulated(a) => a.has_disable_capability(),
        }
    }

    /// Switch the adapter off, returning whether the backend reported success
    pub async fn disable(&self) -> Result<bool, AdapterError> {
        match self {
            Adapter::Rfkill(a) => a.disable().await,
            Adapter::Bluetoothctl(a) => a.disable().await,
            Adapter::Simulated(a) => Ok(a.disable()),
        }
    }
}

/// What happened when a session expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableOutcome {
    /// No adapter on this host
    Absent,
    /// Bluetooth was already off, nothing to do
    AlreadyOff,
    /// The disable capability is not granted
    MissingCapability,
    /// The disable call ran and returned this result
    Attempted(bool),
}

impl DisableOutcome {
    /// The `success` flag of the completion event, if one should be published
    pub fn completion(self) -> Option<bool> {
        match self {
            DisableOutcome::Absent | DisableOutcome::AlreadyOff => None,
            DisableOutcome::MissingCapability => Some(false),
            DisableOutcome::Attempted(success) => Some(success),
        }
    }
}

/// Turn Bluetooth off at the end of a session
pub async fn disable_bluetooth(adapter: &Adapter) -> DisableOutcome {
    let state = match adapter.state().await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to read adapter state before disabling: {}", e);
            return DisableOutcome::Absent;
        }
    };

    if !state.present {
        debug!("No Bluetooth adapter present, skipping disable");
        return DisableOutcome::Absent;
    }
    if !state.enabled {
        debug!("Bluetooth already off, skipping disable");
        return DisableOutcome::AlreadyOff;
    }

    if !adapter.has_disable_capability().await {
        error!("Bluetooth permission missing");
        return DisableOutcome::MissingCapability;
    }

    match adapter.disable().await {
        Ok(success) => {
            info!("Bluetooth disable result: {}", success);
            DisableOutcome::Attempted(success)
        }
        Err(e) => {
            error!("Bluetooth disable failed: {}", e);
            DisableOutcome::Attempted(false)
        }
    }
}
