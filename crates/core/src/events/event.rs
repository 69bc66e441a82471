// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spool events

use crate::error::{FailureKind, SpoolError};
use std::path::PathBuf;

/// Occurrences surfaced by a running spool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoolEvent {
    /// The initial segment is open and the schedulers are running
    Open { segment: PathBuf },
    /// One transfer cycle completed, however many files it moved
    Transfer,
    /// A runtime failure; the spool keeps running
    Error { kind: FailureKind, message: String },
    /// Schedulers stopped and the active segment closed
    Close,
}

impl SpoolEvent {
    pub fn error(err: &SpoolError) -> Self {
        SpoolEvent::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Event name used for pattern subscriptions
    pub fn name(&self) -> &'static str {
        match self {
            SpoolEvent::Open { .. } => "spool:open",
            SpoolEvent::Transfer => "spool:transfer",
            SpoolEvent::Error { .. } => "spool:error",
            SpoolEvent::Close => "spool:close",
        }
    }
}
