//! rfkill backed adapter: reads sysfs, blocks through the rfkill tool

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, process::Command};
use tracing::{debug, info};

use super::AdapterState;
use crate::error::AdapterError;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/rfkill";
pub const DEFAULT_CONTROL_DEVICE: &str = "/dev/rfkill";

/// One `/sys/class/rfkill/rfkillN` entry of type bluetooth
#[derive(Debug, Clone, PartialEq, Eq)]
struct RfkillEntry {
    soft_blocked: bool,
    hard_blocked: bool,
}

impl RfkillEntry {
    fn unblocked(&self) -> bool {
        !self.soft_blocked && !self.hard_blocked
    }
}

#[derive(Debug, Clone)]
pub struct RfkillAdapter {
    sysfs_root: PathBuf,
    control_device: PathBuf,
}

impl RfkillAdapter {
    pub fn new() -> Self {
        Self::with_paths(DEFAULT_SYSFS_ROOT, DEFAULT_CONTROL_DEVICE)
    }

    pub fn with_paths(sysfs_root: impl Into<PathBuf>, control_device: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            control_device: control_device.into(),
        }
    }

    pub async fn state(&self) -> Result<AdapterState, AdapterError> {
        let entries = self.bluetooth_entries().await?;
        Ok(AdapterState {
            present: !entries.is_empty(),
            enabled: entries.iter().any(RfkillEntry::unblocked),
        })
    }

    /// Writing to the rfkill control device is what `rfkill block` needs
    pub async fn has_disable_capability(&self) -> bool {
        match fs::OpenOptions::new().write(true).open(&self.control_device).await {
            Ok(_) => true,
            Err(e) => {
                debug!("{} is not writable: {}", self.control_device.display(), e);
                false
            }
        }
    }

    pub async fn disable(&self) -> Result<bool, AdapterError> {
        debug!("Attempting to block bluetooth via rfkill");

        let output = Command::new("rfkill")
            .args(["block", "bluetooth"])
            .output()
            .await
            .map_err(|source| AdapterError::Spawn {
                program: "rfkill",
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("rfkill block failed: {}", stderr.trim());
            return Ok(false);
        }

        info!("Bluetooth blocked via rfkill");
        Ok(true)
    }

    async fn bluetooth_entries(&self) -> Result<Vec<RfkillEntry>, AdapterError> {
        let mut dir = match fs::read_dir(&self.sysfs_root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if read_attr(&path, "type").await?.as_deref() != Some("bluetooth") {
                continue;
            }
            entries.push(RfkillEntry {
                soft_blocked: read_flag(&path, "soft").await?,
                hard_blocked: read_flag(&path, "hard").await?,
            });
        }
        Ok(entries)
    }
}

impl Default for RfkillAdapter {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_attr(dir: &Path, name: &str) -> Result<Option<String>, AdapterError> {
    match fs::read_to_string(dir.join(name)).await {
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn read_flag(dir: &Path, name: &str) -> Result<bool, AdapterError> {
    Ok(read_attr(dir, name).await?.as_deref() == Some("1"))
}
