//! List snapshots under a directory

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub async fn run(dir: Option<PathBuf>, json: bool) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let naming = util::load_naming()?;
    let found = util::find_snapshots(&dir, &naming)?;

    if json {
        let text = serde_json::to_string_pretty(&found).context("Failed to serialize scan results")?;
        println!("{}", text);
        return Ok(());
    }

    if found.is_empty() {
        println!("{}", "No snapshots found".dimmed());
        return Ok(());
    }

    println!("{}", "Snapshots".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    let mut orphans = 0;
    for snapshot in &found {
        let status = match snapshot.differs {
            Some(true) => "modified".yellow().to_string(),
            Some(false) => "identical".dimmed().to_string(),
            None => {
                orphans += 1;
                "orphan".red().to_string()
            }
        };
        println!(
            "{}  {}  {}  {}",
            util::display_path(&snapshot.original, &dir).cyan(),
            status,
            util::format_size(snapshot.size),
            util::format_relative_time(snapshot.modified).dimmed()
        );
    }

    println!();
    println!(
        "{} snapshot(s), {} orphaned",
        found.len().to_string().yellow(),
        orphans
    );
    if found.iter().any(|s| s.differs == Some(true)) {
        println!(
            "{}",
            "Use 'lifeboat diff FILE' to inspect and 'lifeboat recover FILE' to restore.".dimmed()
        );
    }

    Ok(())
}
