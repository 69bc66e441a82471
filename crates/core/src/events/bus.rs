// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus routing spool events to subscribers
//!
//! Publishing never blocks: every subscriber owns an unbounded channel.
//! Subscribers whose receiver has been dropped are pruned on the next
//! publish.

use super::event::SpoolEvent;
use super::subscription::{SubscriberId, Subscription};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

/// Sender for event delivery
pub type EventSender = mpsc::UnboundedSender<SpoolEvent>;
/// Receiver for event delivery
pub type EventReceiver = mpsc::UnboundedReceiver<SpoolEvent>;

struct Subscriber {
    subscription: Subscription,
    tx: EventSender,
}

#[derive(Default)]
struct Routes {
    subscribers: Vec<Subscriber>,
    /// Receives every event regardless of patterns
    global: Option<EventSender>,
}

/// Cloneable handle; clones share subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    routes: Arc<RwLock<Routes>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events matching the subscription's patterns
    ///
    /// Subscribing again with the same id replaces the earlier subscriber.
    pub fn subscribe(&self, subscription: Subscription) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut routes = self.write();
        routes
            .subscribers
            .retain(|s| s.subscription.id() != subscription.id());
        routes.subscribers.push(Subscriber { subscription, tx });
        rx
    }

    pub fn unsubscribe(&self, id: &SubscriberId) {
        self.write()
            .subscribers
            .retain(|s| s.subscription.id() != id);
    }

    /// Install the catch-all receiver, replacing any previous one
    pub fn set_global_handler(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.write().global = Some(tx);
        rx
    }

    /// Deliver `event` to the global handler and every matching subscriber
    pub fn publish(&self, event: SpoolEvent) {
        let name = event.name();
        let mut closed = false;
        {
            let routes = self.read();
            if let Some(global) = &routes.global {
                let _ = global.send(event.clone());
            }
            for subscriber in &routes.subscribers {
                if subscriber.tx.is_closed() {
                    closed = true;
                } else if subscriber.subscription.matches(name) {
                    let _ = subscriber.tx.send(event.clone());
                }
            }
        }

        if closed {
            self.write().subscribers.retain(|s| !s.tx.is_closed());
        }
    }

    /// Number of live subscribers, not counting the global handler
    pub fn subscriber_count(&self) -> usize {
        self.read()
            .subscribers
            .iter()
            .filter(|s| !s.tx.is_closed())
            .count()
    }

    fn read(&self) -> RwLockReadGuard<'_, Routes> {
        self.routes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Routes> {
        self.routes.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
