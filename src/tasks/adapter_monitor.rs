//! Adapter power-state monitor

use std::time::Duration;
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::services::{Adapter, AdapterState};

/// Poll `adapter` every `period` and publish changes on `state_tx`
///
/// The task exits when every receiver of `state_tx` is gone.
pub async fn adapter_monitor_task(
    adapter: Adapter,
    period: Duration,
    state_tx: watch::Sender<AdapterState>,
) {
    info!("Starting adapter monitor, polling every {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = state_tx.closed() => break,
        }

        let state = match adapter.state().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to query adapter state: {}", e);
                continue;
            }
        };

        let changed = state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if changed {
            debug!("Adapter state changed: present={}, enabled={}", state.present, state.enabled);
        }
    }

    debug!("Adapter monitor stopped, no subscribers left");
}

/// Read the adapter once and spawn a monitor seeded with that value
pub async fn spawn_adapter_monitor(
    adapter: Adapter,
    period: Duration,
) -> watch::Receiver<AdapterState> {
    let initial = match adapter.state().await {
        Ok(state) => state,
        Err(e) => {
            warn!("Initial adapter query failed: {}", e);
            AdapterState::absent()
        }
    };
    let (state_tx, state_rx) = watch::channel(initial);
    tokio::spawn(adapter_monitor_task(adapter, period, state_tx));
    state_rx
}
