//! Configuration management command
//!
//! Provides CLI interface to view and edit the settings file.

use anyhow::{Context, Result};
use lifeboat_core::config::{self, Settings, MIN_RESCHEDULE_DELAY};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let settings = config::load()?;
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Lifeboat Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[schedule]".yellow());
    println!(
        "  {} = {} {}",
        "reschedule_delay_secs".cyan(),
        settings.schedule.reschedule_delay_secs,
        format!(
            "({} min {} s)",
            settings.schedule.reschedule_delay_secs / 60,
            settings.schedule.reschedule_delay_secs % 60
        )
        .dimmed()
    );
    println!(
        "  {} = {}",
        "lock_scope".cyan(),
        settings.schedule.lock_scope.as_str()
    );

    println!("\n{}", "[naming]".yellow());
    println!("  {} = {:?}", "prefix".cyan(), settings.naming.prefix);
    println!("  {} = {:?}", "suffix".cyan(), settings.naming.suffix);
    println!(
        "  {}",
        format!(
            "(foo.txt is snapshotted as {})",
            lifeboat_core::SnapshotNaming::from_config(&settings).snapshot_name("foo.txt")
        )
        .dimmed()
    );

    println!("\n{}", "Valid Ranges:".bold());
    println!(
        "  reschedule_delay_secs: {} or more",
        MIN_RESCHEDULE_DELAY.as_secs()
    );
    println!("  lock_scope: resource | workspace");
    println!("  prefix, suffix: no path separators; not both empty");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let settings = config::load()?;

    let value = settings.get(key).with_context(|| {
        format!(
            "Unknown config key: {}. Use 'lifeboat config list' to see available keys.",
            key
        )
    })?;

    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut settings = config::load()?;
    settings.set(key, value)?;
    config::save(&settings)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    if is_trivial_naming(&settings) {
        println!(
            "{}",
            "Warning: empty prefix and suffix disable snapshots entirely".yellow()
        );
    }

    Ok(())
}

fn is_trivial_naming(settings: &Settings) -> bool {
    lifeboat_core::SnapshotNaming::from_config(settings).is_trivial()
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", config::example_config());
    Ok(())
}
