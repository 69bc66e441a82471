// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events system for spool observability
//!
//! This module provides:
//! - `SpoolEvent` - The four occurrences a spool reports
//! - `EventBus` - Route events to matching subscribers using patterns
//! - `EventPattern` - Pattern matching for event subscriptions

mod bus;
mod event;
mod subscription;

pub use bus::{EventBus, EventReceiver, EventSender};
pub use event::SpoolEvent;
pub use subscription::{EventPattern, SubscriberId, Subscription};
