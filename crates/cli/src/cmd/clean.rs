//! Delete every snapshot under a directory

use crate::util;
use anyhow::{Context, Result};
use lifeboat_core::{FsStore, SnapshotStore};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub async fn run(dir: Option<PathBuf>, yes: bool) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let naming = util::load_naming()?;
    let found = util::find_snapshots(&dir, &naming)?;
    if found.is_empty() {
        println!("{}", "No snapshots found".dimmed());
        return Ok(());
    }

    for snapshot in &found {
        println!("  {}", util::display_path(&snapshot.snapshot, &dir));
    }
    if !yes && !util::confirm(&format!("Delete {} snapshot(s)?", found.len()))? {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    // Found paths are relative to the working directory, not to `dir`
    let store = FsStore::new(std::env::current_dir().context("Failed to get current directory")?);
    let mut freed = 0u64;
    for snapshot in &found {
        store
            .delete(&snapshot.snapshot)
            .with_context(|| format!("Failed to delete {}", snapshot.snapshot.display()))?;
        freed += snapshot.size;
    }

    println!(
        "{} Deleted {} snapshot(s), freed {}",
        "✓".green(),
        found.len(),
        util::format_size(freed).green()
    );
    Ok(())
}
