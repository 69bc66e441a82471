// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem adapters
//!
//! Every directory, stat, rename and unlink operation the spooler performs
//! goes through [`FsAdapter`], so failures can be injected in tests.

mod local;

pub use local::LocalFsAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFsAdapter, FsCall};

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem operation kinds, used for error context and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    EnsureDir,
    ListDir,
    Stat,
    Rename,
    Remove,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsOp::EnsureDir => "ensure_dir",
            FsOp::ListDir => "list_dir",
            FsOp::Stat => "stat",
            FsOp::Rename => "rename",
            FsOp::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Errors from filesystem operations
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    pub fn io(op: FsOp, path: &Path, source: std::io::Error) -> Self {
        FsError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The operation that failed
    pub fn op(&self) -> FsOp {
        match self {
            FsError::Io { op, .. } => *op,
        }
    }

    /// The path the failed operation targeted
    pub fn path(&self) -> &Path {
        match self {
            FsError::Io { path, .. } => path,
        }
    }
}

/// Adapter for the filesystem operations the spooler needs
#[async_trait]
pub trait FsAdapter: Clone + Send + Sync + 'static {
    /// Create a directory and its parents if absent
    ///
    /// Synchronous: only called while a spool is being constructed.
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError>;

    /// List the file names (not paths) in a directory
    async fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError>;

    /// Size of a file in bytes
    async fn file_len(&self, path: &Path) -> Result<u64, FsError>;

    /// Atomically rename a file
    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Remove a file
    async fn remove_file(&self, path: &Path) -> Result<(), FsError>;
}
