//! BlueZ adapter driven through the bluetoothctl command line tool

use tokio::process::Command;
use tracing::{debug, info};

use super::AdapterState;
use crate::error::AdapterError;

#[derive(Debug, Clone, Default)]
pub struct BluetoothctlAdapter;

impl BluetoothctlAdapter {
    pub fn new() -> Self {
        Self
    }

    pub async fn state(&self) -> Result<AdapterState, AdapterError> {
        let listing = run(&["list"]).await?;
        if !has_controller(&listing) {
            return Ok(AdapterState::absent());
        }

        let show = run(&["show"]).await?;
        Ok(AdapterState::powered(parse_powered(&show).unwrap_or(false)))
    }

    pub async fn has_disable_capability(&self) -> bool {
        match run(&["show"]).await {
            Ok(_) => true,
            Err(e) => {
                debug!("bluetoothctl show unavailable: {}", e);
                false
            }
        }
    }

    pub async fn disable(&self) -> Result<bool, AdapterError> {
        debug!("Attempting to power off the default controller");

        let stdout = match run(&["power", "off"]).await {
            Ok(stdout) => stdout,
            Err(AdapterError::Command { stderr, .. }) => {
                debug!("bluetoothctl power off failed: {}", stderr);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let success = stdout.contains("succeeded");
        if success {
            info!("Default controller powered off");
        }
        Ok(success)
    }
}

async fn run(args: &[&str]) -> Result<String, AdapterError> {
    let output = Command::new("bluetoothctl")
        .args(args)
        .output()
        .await
        .map_err(|source| AdapterError::Spawn {
            program: "bluetoothctl",
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(AdapterError::Command {
            program: "bluetoothctl",
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `bluetoothctl list` prints one `Controller <addr> <name>` line per adapter
fn has_controller(listing: &str) -> bool {
    listing
        .lines()
        .any(|line| line.trim_start().starts_with("Controller "))
}

fn parse_powered(show: &str) -> Option<bool> {
    show.lines().find_map(|line| {
        let value = line.trim().strip_prefix("Powered:")?;
        match value.trim() {
            "yes" => Some(true),
            "no" => Some(false),
            _ => None,
        }
    })
}
