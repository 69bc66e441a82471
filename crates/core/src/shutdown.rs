// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shutdown signal shared by the controller and its schedulers
//!
//! Schedulers publish through [`ShutdownSignal::unless_triggered`] and the
//! controller closes through [`ShutdownSignal::trigger_then`]. Both run
//! under the same lock, so an event is either published before `close`
//! or not at all.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    triggered: Arc<Mutex<bool>>,
    notify: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            triggered: Arc::new(Mutex::new(false)),
            notify: Arc::new(notify),
        }
    }

    /// Receiver that changes once the signal is triggered
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.notify.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        *self.lock()
    }

    pub fn trigger(&self) {
        self.trigger_then(|| {});
    }

    /// Trigger the signal and run `f` before any pending publisher resumes
    pub fn trigger_then(&self, f: impl FnOnce()) {
        let mut triggered = self.lock();
        *triggered = true;
        self.notify.send_replace(true);
        f();
    }

    /// Run `f` only if the signal has not been triggered
    ///
    /// Returns whether `f` ran.
    pub fn unless_triggered(&self, f: impl FnOnce()) -> bool {
        let triggered = self.lock();
        if *triggered {
            return false;
        }
        f();
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.triggered.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
