//! Blob storage for snapshots, keyed by path
//!
//! The scheduler guarantees at most one caller per path at a time, so stores
//! only need to be safe for concurrent use on *different* paths.

use crate::error::{Result, SnapshotError};
use dashmap::DashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Read/write/delete access to named blobs
pub trait SnapshotStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Full contents, or [`SnapshotError::NotFound`]
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create the blob if absent, overwrite it otherwise
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Remove the blob; succeeds if it was already gone
    fn delete(&self, path: &Path) -> Result<()>;

    /// Last modification time, or [`SnapshotError::NotFound`]
    fn mtime(&self, path: &Path) -> Result<SystemTime>;

    /// Drop any cached view so blobs written by other processes become visible
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

/// Store backed by the local file system
///
/// Relative paths resolve against `root`; absolute paths are used as-is.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of `path` inside this store
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl SnapshotStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|e| SnapshotError::io(full, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        atomic_write(&self.resolve(path), bytes)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path);
        match std::fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::io(full, e)),
        }
    }

    fn mtime(&self, path: &Path) -> Result<SystemTime> {
        let full = self.resolve(path);
        std::fs::metadata(&full)
            .and_then(|m| m.modified())
            .map_err(|e| SnapshotError::io(full, e))
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file in the target's directory, fsyncs it,
/// then renames it over the target. A crash mid-write leaves either the old
/// snapshot or the new one, never a torn file.
pub fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".lifeboat-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| SnapshotError::io(dir, e))?;
    tmp.write_all(data)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| SnapshotError::io(tmp.path(), e))?;
    tmp.persist(target)
        .map_err(|e| SnapshotError::io(target, e.error))?;
    tracing::trace!(path = %target.display(), bytes = data.len(), "atomic write");
    Ok(())
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    bytes: Vec<u8>,
    modified: SystemTime,
}

/// In-memory store, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<PathBuf, MemoryEntry>,
    refreshes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blob with an explicit modification time
    pub fn insert_with_mtime(&self, path: impl Into<PathBuf>, bytes: &[u8], modified: SystemTime) {
        self.entries.insert(
            path.into(),
            MemoryEntry {
                bytes: bytes.to_vec(),
                modified,
            },
        );
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// How many times [`SnapshotStore::refresh`] was called
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.entries
            .get(path)
            .map(|e| e.bytes.clone())
            .ok_or_else(|| SnapshotError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.insert_with_mtime(path, bytes, SystemTime::now());
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.entries.remove(path);
        Ok(())
    }

    fn mtime(&self, path: &Path) -> Result<SystemTime> {
        self.entries
            .get(path)
            .map(|e| e.modified)
            .ok_or_else(|| SnapshotError::NotFound(path.to_path_buf()))
    }

    fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn exercise(store: &dyn SnapshotStore, path: &Path) {
        assert!(!store.exists(path));
        assert!(store.read(path).unwrap_err().is_not_found());
        assert!(store.mtime(path).unwrap_err().is_not_found());

        store.write(path, b"first").unwrap();
        assert!(store.exists(path));
        assert_eq!(store.read(path).unwrap(), b"first");
        assert!(store.mtime(path).is_ok());

        store.write(path, b"second").unwrap();
        assert_eq!(store.read(path).unwrap(), b"second");

        store.delete(path).unwrap();
        assert!(!store.exists(path));

        // Deleting again is a no-op
        store.delete(path).unwrap();
    }

    #[test]
    fn test_fs_store_contract() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());
        exercise(&store, Path::new("~foo.txt"));
    }

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::new();
        exercise(&store, Path::new("src/~foo.txt"));
    }

    #[test]
    fn test_fs_store_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("src")).unwrap();
        let store = FsStore::new(temp_dir.path());

        store.write(Path::new("src/~a.rs"), b"fn main() {}").unwrap();
        assert_eq!(
            std::fs::read(temp_dir.path().join("src/~a.rs")).unwrap(),
            b"fn main() {}"
        );
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("~x.txt");

        atomic_write(&target, b"one").unwrap();
        atomic_write(&target, b"two").unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["~x.txt".to_string()]);
        assert_eq!(std::fs::read(&target).unwrap(), b"two");
    }

    #[test]
    fn test_fs_mtime_follows_file_system() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());
        store.write(Path::new("~m.txt"), b"m").unwrap();

        let when = filetime::FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(temp_dir.path().join("~m.txt"), when).unwrap();

        assert_eq!(
            store.mtime(Path::new("~m.txt")).unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000)
        );
    }

    #[test]
    fn test_fs_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());
        assert!(store.write(Path::new("nope/~x.txt"), b"x").is_err());
    }

    #[test]
    fn test_memory_store_mtime_and_refresh() {
        let store = MemoryStore::new();
        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        store.insert_with_mtime("a.txt", b"a", old);

        assert_eq!(store.mtime(Path::new("a.txt")).unwrap(), old);
        assert_eq!(store.paths(), vec![PathBuf::from("a.txt")]);

        store.refresh().unwrap();
        store.refresh().unwrap();
        assert_eq!(store.refresh_count(), 2);
    }
}
