// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spool errors
//!
//! Configuration and setup failures are returned from construction. Every
//! failure after that is published as a [`SpoolEvent::Error`] instead.
//!
//! [`SpoolEvent::Error`]: crate::events::SpoolEvent::Error

use spool_adapters::FsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the spooler
#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("invalid configuration: {0} is required")]
    InvalidConfig(&'static str),

    #[error("invalid interval for {field}: {value:?}")]
    InvalidInterval { field: &'static str, value: String },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to create directory: {0}")]
    DirectoryCreate(#[source] FsError),

    #[error("spool must be started inside a tokio runtime")]
    NoRuntime,

    #[error("no active stream, content dropped")]
    NoActiveStream,

    #[error("failed to open segment {}: {source}", path.display())]
    StreamOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stream error: {0}")]
    Stream(#[source] std::io::Error),

    #[error("failed to list directory: {0}")]
    ListDirectory(#[source] FsError),

    #[error("file operation failed for {file}: {source}")]
    PerFileIo {
        file: String,
        #[source]
        source: FsError,
    },

    #[error("file task failed: {0}")]
    FileTask(#[source] tokio::task::JoinError),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SpoolError {
    /// Classification carried by error events
    pub fn kind(&self) -> FailureKind {
        match self {
            SpoolError::NoActiveStream => FailureKind::NoActiveStream,
            SpoolError::StreamOpen { .. } => FailureKind::StreamOpen,
            SpoolError::Stream(_) => FailureKind::Stream,
            SpoolError::ListDirectory(_) => FailureKind::ListDirectory,
            SpoolError::PerFileIo { .. } | SpoolError::FileTask(_) => FailureKind::PerFileIo,
            SpoolError::InvalidConfig(_)
            | SpoolError::InvalidInterval { .. }
            | SpoolError::InvalidPattern { .. }
            | SpoolError::DirectoryCreate(_)
            | SpoolError::NoRuntime
            | SpoolError::ConfigRead { .. }
            | SpoolError::ConfigParse(_) => FailureKind::Setup,
        }
    }
}

/// Cloneable classification of a spool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Construction-time failure; never published by a running spool
    Setup,
    /// Write attempted with no segment open
    NoActiveStream,
    /// A new segment could not be opened during rotation
    StreamOpen,
    /// Write or flush on the active segment failed
    Stream,
    /// A scheduler could not list its directory; the cycle was aborted
    ListDirectory,
    /// Stat, rename or unlink of a single file failed, or its task died
    PerFileIo,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Setup => "setup",
            FailureKind::NoActiveStream => "no_active_stream",
            FailureKind::StreamOpen => "stream_open",
            FailureKind::Stream => "stream",
            FailureKind::ListDirectory => "list_directory",
            FailureKind::PerFileIo => "per_file_io",
        };
        f.write_str(name)
    }
}
