//! Replace a file with the content of its snapshot

use crate::util;
use anyhow::{Context, Result};
use lifeboat_core::store::atomic_write;
use lifeboat_core::{FsStore, SnapshotStore};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(file: &Path, yes: bool) -> Result<()> {
    let naming = util::load_naming()?;
    let handle = util::existing_snapshot_for(&naming, file)?;
    let store = FsStore::new(std::env::current_dir().context("Failed to get current directory")?);

    let content = store
        .read(handle.path())
        .with_context(|| format!("Failed to read snapshot {}", handle.path().display()))?;

    if !yes {
        let question = format!(
            "Overwrite {} with its snapshot ({})?",
            file.display(),
            util::format_size(content.len() as u64)
        );
        if !util::confirm(&question)? {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    atomic_write(&store.resolve(file), &content)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    store
        .delete(handle.path())
        .with_context(|| format!("Failed to delete snapshot {}", handle.path().display()))?;

    tracing::info!(file = %file.display(), "recovered from snapshot");
    println!("{} Recovered {}", "✓".green(), file.display().cyan());
    Ok(())
}
