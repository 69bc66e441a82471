// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! spool-core: disk-backed write-ahead spooler
//!
//! Content is appended to a time-named segment in a working directory.
//! Segments are rotated on a fixed interval and, once aged, relocated to a
//! stable directory where a downstream consumer picks them up. An optional
//! retention sweep deletes consumed files from the stable directory.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod retention;
pub mod segment;
pub mod shutdown;
pub mod stream;
pub mod transfer;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    Encoding, Interval, RetentionOptions, RetentionPlan, SpoolConfig, StreamOptions,
    ValidatedConfig,
};
pub use controller::{Spool, SpoolController, SpoolDeps};
pub use error::{FailureKind, SpoolError};
pub use events::{EventBus, EventPattern, EventReceiver, SpoolEvent, Subscription};
pub use retention::{RetentionReport, RetentionScheduler};
pub use segment::SegmentNamer;
pub use shutdown::ShutdownSignal;
pub use stream::StreamManager;
pub use transfer::{TransferReport, TransferScheduler};
