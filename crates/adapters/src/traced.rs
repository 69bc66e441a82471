// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::fs::{FsAdapter, FsError};
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any FsAdapter
#[derive(Clone, Debug, Default)]
pub struct TracedFsAdapter<F> {
    inner: F,
}

impl<F> TracedFsAdapter<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F: FsAdapter> FsAdapter for TracedFsAdapter<F> {
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError> {
        let span = tracing::info_span!("fs.ensure_dir", path = %path.display());
        let _guard = span.enter();

        let result = self.inner.ensure_dir(path);
        match &result {
            Ok(()) => tracing::debug!("directory ready"),
            Err(e) => tracing::error!(error = %e, "ensure_dir failed"),
        }
        result
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let span = tracing::debug_span!("fs.list_dir", path = %path.display());

        async {
            let start = Instant::now();
            let result = self.inner.list_dir(path).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(names) => tracing::debug!(entries = names.len(), elapsed_ms, "listed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "list failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn file_len(&self, path: &Path) -> Result<u64, FsError> {
        let result = self.inner.file_len(path).await;
        tracing::trace!(path = %path.display(), len = ?result.as_ref().ok(), "stat");
        result
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let span = tracing::info_span!(
            "fs.rename",
            from = %from.display(),
            to = %to.display()
        );

        async {
            let start = Instant::now();
            let result = self.inner.rename(from, to).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "renamed"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "rename failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        let span = tracing::info_span!("fs.remove_file", path = %path.display());

        async {
            let result = self.inner.remove_file(path).await;
            match &result {
                Ok(()) => tracing::debug!("removed"),
                Err(e) => tracing::warn!(error = %e, "remove failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
