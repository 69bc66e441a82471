// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local filesystem adapter backed by `tokio::fs`

use super::{FsAdapter, FsError, FsOp};
use async_trait::async_trait;
use std::path::Path;

/// Adapter that performs real operations on the local filesystem
#[derive(Clone, Debug, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsAdapter for LocalFsAdapter {
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError> {
        std::fs::create_dir_all(path).map_err(|e| FsError::io(FsOp::EnsureDir, path, e))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| FsError::io(FsOp::ListDir, path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FsError::io(FsOp::ListDir, path, e))?
        {
            // Non-UTF-8 names can never match a segment pattern
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn file_len(&self, path: &Path) -> Result<u64, FsError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| FsError::io(FsOp::Stat, path, e))?;
        Ok(metadata.len())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        tokio::fs::rename(from, to)
            .await
            .map_err(|e| FsError::io(FsOp::Rename, from, e))
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| FsError::io(FsOp::Remove, path, e))
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
