//! Configuration and CLI argument handling

use std::time::Duration;
use clap::{Parser, ValueEnum};

use crate::services::{
    Adapter, BluetoothctlAdapter, DesktopNotifier, Notifier, RfkillAdapter, SimulatedAdapter,
};

/// Bluetooth backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdapterKind {
    /// Read sysfs and block through rfkill
    Rfkill,
    /// Talk to BlueZ through bluetoothctl
    Bluetoothctl,
    /// In-memory adapter that starts powered on, for dry runs
    Simulated,
}

/// Notification backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    /// Desktop notification through notify-send
    Desktop,
    /// Log lines only
    Log,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "bt-timer")]
#[command(about = "Switch Bluetooth off after a chosen delay")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Bluetooth backend
    #[arg(short, long, value_enum, default_value_t = AdapterKind::Rfkill)]
    pub adapter: AdapterKind,

    /// Where the countdown notification goes
    #[arg(short, long, value_enum, default_value_t = NotifierKind::Desktop)]
    pub notifier: NotifierKind,

    /// Seconds between adapter state polls
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Run the interactive terminal controller alongside the API
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// Build the configured adapter backend
    pub fn build_adapter(&self) -> Adapter {
        match self.adapter {
            AdapterKind::Rfkill => Adapter::Rfkill(RfkillAdapter::new()),
            AdapterKind::Bluetoothctl => Adapter::Bluetoothctl(BluetoothctlAdapter::new()),
            AdapterKind::Simulated => Adapter::Simulated(SimulatedAdapter::new(true, true)),
        }
    }

    /// Build the configured notifier
    pub fn build_notifier(&self) -> Notifier {
        match self.notifier {
            NotifierKind::Desktop => Notifier::Desktop(DesktopNotifier::new()),
            NotifierKind::Log => Notifier::Log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["bt-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.adapter, AdapterKind::Rfkill);
        assert_eq!(config.notifier, NotifierKind::Desktop);
        assert_eq!(config.poll_period(), Duration::from_secs(2));
        assert_eq!(config.log_level(), "info");
        assert!(!config.interactive);
    }

    #[test]
    fn selects_backends() {
        let config = Config::try_parse_from([
            "bt-timer", "--adapter", "simulated", "--notifier", "log", "-i", "-v",
        ])
        .unwrap();
        assert_eq!(config.build_adapter().name(), "simulated");
        assert!(matches!(config.build_notifier(), Notifier::Log));
        assert!(config.interactive);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(Config::try_parse_from(["bt-timer", "--poll-interval", "0"]).is_err());
    }
}
