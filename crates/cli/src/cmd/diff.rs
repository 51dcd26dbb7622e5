//! Show the diff between a file and its snapshot

use crate::{diff_utils, util};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(file: &Path, context_lines: usize) -> Result<()> {
    let naming = util::load_naming()?;
    let handle = util::existing_snapshot_for(&naming, file)?;

    let snapshot = std::fs::read(handle.path())
        .with_context(|| format!("Failed to read snapshot {}", handle.path().display()))?;
    let original = if file.is_file() {
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?
    } else {
        println!("{}", "Original file is missing; showing the full snapshot".yellow());
        Vec::new()
    };

    if diff_utils::is_binary(&original) || diff_utils::is_binary(&snapshot) {
        if original == snapshot {
            println!("{}", "No differences".dimmed());
        } else {
            println!("Binary files {} and {} differ", file.display(), handle.path().display());
        }
        return Ok(());
    }

    let diff = diff_utils::generate_unified_diff(
        &original,
        &snapshot,
        &file.display().to_string(),
        &handle.path().display().to_string(),
        context_lines,
    );

    if diff.is_empty() {
        println!("{}", "No differences".dimmed());
    } else {
        print!("{}", diff);
    }

    Ok(())
}
