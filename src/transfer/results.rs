use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Thread-safe accumulation of per-item outcomes during a transfer run.
///
/// The three sets are append-only and keyed by remote identifier; an
/// identifier lands in at most one of {succeeded, corrupted}, and stays in
/// failed only while it is absent from both. Completion order across workers
/// is not guaranteed, only membership.
#[derive(Debug, Default)]
pub struct RunResults {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    succeeded: Vec<String>,
    failed: Vec<String>,
    corrupted: Vec<String>,
    local_files: Vec<PathBuf>,
}

impl RunResults {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a successful transfer (or a verified already-present item),
    /// clearing any earlier failure for the same key.
    pub fn record_success(&self, key: &str, local_path: &Path) {
        let mut inner = self.lock();
        inner.failed.retain(|k| k != key);
        if !inner.succeeded.iter().any(|k| k == key) {
            inner.succeeded.push(key.to_string());
            inner.local_files.push(local_path.to_path_buf());
        }
    }

    /// Records a transient failure. Ignored when the key already succeeded or
    /// was marked corrupted.
    pub fn record_failure(&self, key: &str) {
        let mut inner = self.lock();
        if inner.succeeded.iter().any(|k| k == key)
            || inner.corrupted.iter().any(|k| k == key)
            || inner.failed.iter().any(|k| k == key)
        {
            return;
        }
        inner.failed.push(key.to_string());
    }

    /// Records an integrity mismatch: the bytes arrived but the digests
    /// disagree. Clears any earlier failure; retrying blindly would not fix a
    /// content mismatch.
    pub fn record_corrupted(&self, key: &str) {
        let mut inner = self.lock();
        inner.failed.retain(|k| k != key);
        if inner.succeeded.iter().any(|k| k == key) {
            return;
        }
        if !inner.corrupted.iter().any(|k| k == key) {
            inner.corrupted.push(key.to_string());
        }
    }

    /// The keys currently marked failed, for the sequential retry pass.
    pub fn failed_keys(&self) -> Vec<String> {
        self.lock().failed.clone()
    }

    /// Freezes the current state into an immutable report.
    pub fn snapshot(&self) -> RunReport {
        let inner = self.lock();
        RunReport {
            succeeded: inner.succeeded.clone(),
            failed: inner.failed.clone(),
            corrupted: inner.corrupted.clone(),
            local_files: inner.local_files.clone(),
        }
    }
}

/// The immutable outcome of one transfer run: three disjoint identifier sets
/// plus the local paths of succeeded items, for the cleanup pass.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub corrupted: Vec<String>,
    pub local_files: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty() && self.corrupted.is_empty()
    }
}
