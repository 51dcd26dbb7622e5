//! Delete the snapshot of one file

use crate::util;
use anyhow::{Context, Result};
use lifeboat_core::{FsStore, SnapshotStore};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(file: &Path) -> Result<()> {
    let naming = util::load_naming()?;
    let handle = util::snapshot_for(&naming, file)?;
    let store = FsStore::new(std::env::current_dir().context("Failed to get current directory")?);

    if !store.exists(handle.path()) {
        println!("{}", format!("No snapshot for {}", file.display()).dimmed());
        return Ok(());
    }

    store
        .delete(handle.path())
        .with_context(|| format!("Failed to delete snapshot {}", handle.path().display()))?;
    println!("{} Discarded {}", "✓".green(), handle.path().display().cyan());
    Ok(())
}
