//! Mutual exclusion for snapshot writes
//!
//! Every snapshot action runs while holding the lock for its document's
//! path, so a save can never interleave with the delete issued when the same
//! editor closes. With [`LockScope::Workspace`] all paths share one lock.

use dashmap::DashMap;
use lifeboat_core::LockScope;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<PathBuf, Arc<Mutex<()>>>;

/// Table of async locks keyed by resource path
#[derive(Debug)]
pub struct ResourceLocks {
    scope: LockScope,
    table: Arc<LockTable>,
}

impl ResourceLocks {
    pub fn new(scope: LockScope) -> Self {
        Self {
            scope,
            table: Arc::new(DashMap::new()),
        }
    }

    pub fn scope(&self) -> LockScope {
        self.scope
    }

    fn key_for(&self, path: &Path) -> PathBuf {
        match self.scope {
            LockScope::Resource => path.to_path_buf(),
            LockScope::Workspace => PathBuf::new(),
        }
    }

    /// Wait for and take the lock covering `path`
    pub async fn acquire(&self, path: &Path) -> ResourceGuard {
        let key = self.key_for(path);
        let mutex = Arc::clone(self.table.entry(key.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        tracing::trace!(resource = %key.display(), "lock acquired");

        ResourceGuard {
            guard: Some(guard),
            key,
            table: Arc::clone(&self.table),
        }
    }

    /// Whether some caller currently holds the lock covering `path`
    pub fn is_locked(&self, path: &Path) -> bool {
        self.table
            .get(&self.key_for(path))
            .map(|m| m.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of live lock entries
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Held lock; released on drop
///
/// Dropping the last guard for a path also drops its table entry, so the
/// table stays as small as the set of paths currently in use.
#[derive(Debug)]
pub struct ResourceGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: PathBuf,
    table: Arc<LockTable>,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
