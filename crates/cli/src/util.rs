//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use lifeboat_core::config;
use lifeboat_core::hash::hash_file;
use lifeboat_core::{SnapshotHandle, SnapshotNaming};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Directories never descended into while scanning
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".jj", "target", "node_modules"];

/// Naming from the settings file; refuses names that would match every file
pub fn load_naming() -> Result<SnapshotNaming> {
    let settings = config::load()?;
    let naming = SnapshotNaming::from_config(&settings);
    if naming.is_trivial() {
        anyhow::bail!(
            "Snapshot naming has an empty prefix and suffix; every file would be its own snapshot. \
             Set naming.prefix or naming.suffix with 'lifeboat config set'."
        );
    }
    Ok(naming)
}

/// Snapshot handle for `file`
pub fn snapshot_for(naming: &SnapshotNaming, file: &Path) -> Result<SnapshotHandle> {
    let handle = naming
        .handle_for(file)
        .with_context(|| format!("Not a file path: {}", file.display()))?;
    if handle.is_self_snapshot() {
        anyhow::bail!("{} would be its own snapshot", file.display());
    }
    Ok(handle)
}

/// Like [`snapshot_for`], but the snapshot must exist
pub fn existing_snapshot_for(naming: &SnapshotNaming, file: &Path) -> Result<SnapshotHandle> {
    let handle = snapshot_for(naming, file)?;
    if !handle.path().is_file() {
        anyhow::bail!("No snapshot for {}", file.display());
    }
    Ok(handle)
}

/// A snapshot found on disk
#[derive(Debug, Clone, Serialize)]
pub struct FoundSnapshot {
    pub snapshot: PathBuf,
    pub original: PathBuf,
    pub size: u64,
    /// Seconds since the Unix epoch
    pub modified: u64,
    /// The original file no longer exists
    pub orphan: bool,
    /// Content differs from the original; unknown for orphans
    pub differs: Option<bool>,
}

/// Every snapshot under `dir`, sorted by path
pub fn find_snapshots(dir: &Path, naming: &SnapshotNaming) -> Result<Vec<FoundSnapshot>> {
    let mut found = Vec::new();

    let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !SKIPPED_DIRS.contains(&&*name)
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(original) = naming.original_for(path) else {
            continue;
        };

        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let orphan = !original.is_file();
        let differs = if orphan {
            None
        } else {
            Some(hash_file(path)? != hash_file(&original)?)
        };

        found.push(FoundSnapshot {
            snapshot: path.to_path_buf(),
            original,
            size: metadata.len(),
            modified,
            orphan,
            differs,
        });
    }

    found.sort_by(|a, b| a.snapshot.cmp(&b.snapshot));
    Ok(found)
}

/// Ask a yes/no question on stdin; anything but y/yes is a no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Format seconds since the epoch as relative time ("2 hours ago")
pub fn format_relative_time(ts_secs: u64) -> String {
    let datetime = UNIX_EPOCH + std::time::Duration::from_secs(ts_secs);

    if let Ok(elapsed) = SystemTime::now().duration_since(datetime) {
        let seconds = elapsed.as_secs();

        if seconds < 60 {
            format!("{} seconds ago", seconds)
        } else if seconds < 3600 {
            format!("{} minutes ago", seconds / 60)
        } else if seconds < 86400 {
            format!("{} hours ago", seconds / 3600)
        } else if seconds < 604800 {
            format!("{} days ago", seconds / 86400)
        } else {
            format!("{} weeks ago", seconds / 604800)
        }
    } else {
        "in the future".to_string()
    }
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Path relative to `base` when possible, for display
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
