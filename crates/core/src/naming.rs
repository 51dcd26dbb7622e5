//! Snapshot naming
//!
//! A snapshot lives in the same directory as the file it protects, under the
//! original file name wrapped in a configurable prefix and suffix
//! (`foo.txt` -> `~foo.txt` with the defaults). Handles are never persisted;
//! they are recomputed from the document path whenever they are needed.

use crate::config::{ConfigProvider, KEY_SNAPSHOT_NAME_PREFIX, KEY_SNAPSHOT_NAME_SUFFIX};
use std::path::{Path, PathBuf};

/// Prefix/suffix pair used to derive snapshot file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    prefix: String,
    suffix: String,
}

impl SnapshotNaming {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Read the current prefix and suffix from configuration
    ///
    /// Missing keys count as empty strings.
    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self::new(
            config.get_string(KEY_SNAPSHOT_NAME_PREFIX).unwrap_or_default(),
            config.get_string(KEY_SNAPSHOT_NAME_SUFFIX).unwrap_or_default(),
        )
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether neither prefix nor suffix carries any visible text
    ///
    /// With trivial naming every file would look like a snapshot, so name
    /// filtering is switched off.
    pub fn is_trivial(&self) -> bool {
        self.prefix.trim().is_empty() && self.suffix.trim().is_empty()
    }

    /// Snapshot file name for an original file name
    pub fn snapshot_name(&self, original_name: &str) -> String {
        format!("{}{}{}", self.prefix, original_name, self.suffix)
    }

    /// Derive the snapshot handle for the file at `original`
    ///
    /// Returns `None` when the path has no file name (a root or `..`).
    pub fn handle_for(&self, original: &Path) -> Option<SnapshotHandle> {
        let name = original.file_name()?.to_string_lossy();
        let path = original.with_file_name(self.snapshot_name(&name));
        Some(SnapshotHandle {
            original: original.to_path_buf(),
            path,
        })
    }

    /// Whether `name` looks like a snapshot file name
    pub fn is_snapshot_name(&self, name: &str) -> bool {
        if self.is_trivial() {
            return false;
        }
        name.len() > self.prefix.len() + self.suffix.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.suffix)
    }

    /// Original file name for a snapshot file name, if it is one
    pub fn original_name<'a>(&self, snapshot_name: &'a str) -> Option<&'a str> {
        if !self.is_snapshot_name(snapshot_name) {
            return None;
        }
        let end = snapshot_name.len() - self.suffix.len();
        Some(&snapshot_name[self.prefix.len()..end])
    }

    /// Path of the original file a snapshot at `snapshot` protects
    pub fn original_for(&self, snapshot: &Path) -> Option<PathBuf> {
        let name = snapshot.file_name()?.to_str()?;
        let original = self.original_name(name)?;
        Some(snapshot.with_file_name(original))
    }
}

impl Default for SnapshotNaming {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_SNAPSHOT_NAME_PREFIX,
            crate::config::DEFAULT_SNAPSHOT_NAME_SUFFIX,
        )
    }
}

/// Location of a document's snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    original: PathBuf,
    path: PathBuf,
}

impl SnapshotHandle {
    /// Where the snapshot is stored
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file this snapshot protects
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// True when the snapshot would overwrite the original itself
    ///
    /// Happens with empty prefix and suffix. Every action treats such a
    /// handle as "no snapshot".
    pub fn is_self_snapshot(&self) -> bool {
        self.path == self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_default_handle_is_tilde_sibling() {
        let naming = SnapshotNaming::default();
        let handle = naming.handle_for(Path::new("proj/src/foo.txt")).unwrap();

        assert_eq!(handle.path(), Path::new("proj/src/~foo.txt"));
        assert_eq!(handle.original(), Path::new("proj/src/foo.txt"));
        assert!(!handle.is_self_snapshot());
    }

    #[test]
    fn test_prefix_and_suffix() {
        let naming = SnapshotNaming::new(".#", ".snap");
        let handle = naming.handle_for(Path::new("a/b.rs")).unwrap();
        assert_eq!(handle.path(), Path::new("a/.#b.rs.snap"));
    }

    #[test]
    fn test_empty_naming_is_self_snapshot() {
        let naming = SnapshotNaming::new("", "");
        let handle = naming.handle_for(Path::new("foo.txt")).unwrap();
        assert!(handle.is_self_snapshot());
        assert!(naming.is_trivial());
    }

    #[test]
    fn test_whitespace_naming_is_trivial_but_not_self() {
        let naming = SnapshotNaming::new(" ", "");
        let handle = naming.handle_for(Path::new("foo.txt")).unwrap();
        assert!(naming.is_trivial());
        assert!(!handle.is_self_snapshot());
        assert!(!naming.is_snapshot_name(" foo.txt"));
    }

    #[test]
    fn test_no_file_name() {
        assert!(SnapshotNaming::default().handle_for(Path::new("/")).is_none());
        assert!(SnapshotNaming::default().handle_for(Path::new("a/..")).is_none());
    }

    #[test]
    fn test_filter_and_reverse_mapping() {
        let naming = SnapshotNaming::new("~", ".bak");

        assert!(naming.is_snapshot_name("~foo.txt.bak"));
        assert!(!naming.is_snapshot_name("foo.txt"));
        assert!(!naming.is_snapshot_name("~foo.txt"));
        assert!(!naming.is_snapshot_name("~.bak"));

        assert_eq!(naming.original_name("~foo.txt.bak"), Some("foo.txt"));
        assert_eq!(naming.original_name("foo.txt"), None);
        assert_eq!(
            naming.original_for(Path::new("dir/~foo.txt.bak")),
            Some(PathBuf::from("dir/foo.txt"))
        );
    }

    #[test]
    fn test_from_config_follows_settings() {
        let mut settings = Settings::default();
        settings.naming.prefix = String::new();
        settings.naming.suffix = ".swp".to_string();

        let naming = SnapshotNaming::from_config(&settings);
        assert_eq!(naming.snapshot_name("x.md"), "x.md.swp");
    }
}
