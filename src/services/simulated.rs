//! In-memory adapter for dry runs and tests

use std::sync::{Arc, Mutex, MutexGuard};

use super::AdapterState;

#[derive(Debug)]
struct Inner {
    present: bool,
    enabled: bool,
    capability: bool,
    disable_result: bool,
    disable_calls: u32,
}

/// Adapter whose state lives in memory; clones share the same state
#[derive(Debug, Clone)]
pub struct SimulatedAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedAdapter {
    pub fn new(enabled: bool, capability: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                present: true,
                enabled,
                capability,
                disable_result: true,
                disable_calls: 0,
            })),
        }
    }

    /// A host without any Bluetooth hardware
    pub fn absent() -> Self {
        let adapter = Self::new(false, false);
        adapter.lock().present = false;
        adapter
    }

    // A poisoned lock only means a test panicked mid-update; the data is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> AdapterState {
        let inner = self.lock();
        AdapterState {
            present: inner.present,
            enabled: inner.present && inner.enabled,
        }
    }

    pub fn has_disable_capability(&self) -> bool {
        self.lock().capability
    }

    pub fn disable(&self) -> bool {
        let mut inner = self.lock();
        inner.disable_calls += 1;
        if inner.disable_result {
            inner.enabled = false;
        }
        inner.disable_result
    }

    /// Flip the power state from outside, as a user toggling Bluetooth would
    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    /// Make future disable calls report `result`
    pub fn set_disable_result(&self, result: bool) {
        self.lock().disable_result = result;
    }

    pub fn disable_calls(&self) -> u32 {
        self.lock().disable_calls
    }
}
