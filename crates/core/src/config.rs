//! Snapshot configuration
//!
//! The scheduler never holds on to configuration values: it asks a
//! [`ConfigProvider`] every time it reschedules or derives a snapshot name, so
//! edits made while editors are open apply from the next cycle on.
//!
//! [`Settings`] is the TOML-backed provider used by the CLI and by hosts that
//! have no preference store of their own:
//!
//! ```toml
//! [schedule]
//! reschedule_delay_secs = 300
//! lock_scope = "resource"
//!
//! [naming]
//! prefix = "~"
//! suffix = ""
//! ```

use crate::error::SnapshotError;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Delay between two snapshots of the same editor
pub const KEY_RESCHEDULE_DELAY: &str = "reschedule.delay";
/// Text prepended to the original file name
pub const KEY_SNAPSHOT_NAME_PREFIX: &str = "snapshot.name.prefix";
/// Text appended to the original file name
pub const KEY_SNAPSHOT_NAME_SUFFIX: &str = "snapshot.name.suffix";
/// Granularity of the lock held while a snapshot is written
pub const KEY_LOCK_SCOPE: &str = "lock.scope";

pub const DEFAULT_RESCHEDULE_DELAY: Duration = Duration::from_secs(5 * 60);
/// Smallest delay accepted in a settings file
pub const MIN_RESCHEDULE_DELAY: Duration = Duration::from_secs(5);
/// Smallest delay any provider can yield; keeps a task from spinning
pub const MIN_PROVIDER_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_SNAPSHOT_NAME_PREFIX: &str = "~";
pub const DEFAULT_SNAPSHOT_NAME_SUFFIX: &str = "";

/// Environment variable overriding the settings file location
pub const CONFIG_ENV_VAR: &str = "LIFEBOAT_CONFIG";

/// Source of configuration values, consulted on demand
pub trait ConfigProvider: Send + Sync {
    fn get_duration(&self, key: &str) -> Option<Duration>;
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Current reschedule delay, falling back to the default
///
/// Values below [`MIN_PROVIDER_DELAY`] are raised to it.
pub fn reschedule_delay(config: &dyn ConfigProvider) -> Duration {
    config
        .get_duration(KEY_RESCHEDULE_DELAY)
        .unwrap_or(DEFAULT_RESCHEDULE_DELAY)
        .max(MIN_PROVIDER_DELAY)
}

/// Current lock scope, falling back to per-resource locking
pub fn lock_scope(config: &dyn ConfigProvider) -> LockScope {
    config
        .get_string(KEY_LOCK_SCOPE)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// Which lock a snapshot write holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockScope {
    /// One lock per document path
    #[default]
    Resource,
    /// A single lock covering the whole workspace
    Workspace,
}

impl LockScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Workspace => "workspace",
        }
    }
}

impl std::str::FromStr for LockScope {
    type Err = SnapshotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resource" => Ok(Self::Resource),
            "workspace" => Ok(Self::Workspace),
            other => Err(SnapshotError::InvalidConfig(format!(
                "unknown lock scope '{}' (expected 'resource' or 'workspace')",
                other
            ))),
        }
    }
}

/// `[schedule]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub reschedule_delay_secs: u64,
    pub lock_scope: LockScope,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            reschedule_delay_secs: DEFAULT_RESCHEDULE_DELAY.as_secs(),
            lock_scope: LockScope::Resource,
        }
    }
}

/// `[naming]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    pub prefix: String,
    pub suffix: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_SNAPSHOT_NAME_PREFIX.to_string(),
            suffix: DEFAULT_SNAPSHOT_NAME_SUFFIX.to_string(),
        }
    }
}

/// Persisted snapshot settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schedule: ScheduleSettings,
    pub naming: NamingSettings,
}

impl Settings {
    /// Check ranges and naming rules
    pub fn validate(&self) -> std::result::Result<(), SnapshotError> {
        if Duration::from_secs(self.schedule.reschedule_delay_secs) < MIN_RESCHEDULE_DELAY {
            return Err(SnapshotError::InvalidConfig(format!(
                "schedule.reschedule_delay_secs must be at least {} (got {})",
                MIN_RESCHEDULE_DELAY.as_secs(),
                self.schedule.reschedule_delay_secs
            )));
        }

        for (key, value) in [
            ("naming.prefix", &self.naming.prefix),
            ("naming.suffix", &self.naming.suffix),
        ] {
            if value.contains('/') || value.contains('\\') {
                return Err(SnapshotError::InvalidConfig(format!(
                    "{} must not contain a path separator (got '{}')",
                    key, value
                )));
            }
        }

        Ok(())
    }

    /// Read a value by its dotted settings-file key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "schedule.reschedule_delay_secs" => Some(self.schedule.reschedule_delay_secs.to_string()),
            "schedule.lock_scope" => Some(self.schedule.lock_scope.as_str().to_string()),
            "naming.prefix" => Some(self.naming.prefix.clone()),
            "naming.suffix" => Some(self.naming.suffix.clone()),
            _ => None,
        }
    }

    /// Set a value by its dotted settings-file key
    ///
    /// The result is validated; on error `self` is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "schedule.reschedule_delay_secs" => {
                updated.schedule.reschedule_delay_secs = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            "schedule.lock_scope" => {
                updated.schedule.lock_scope = value.parse()?;
            }
            "naming.prefix" => updated.naming.prefix = value.to_string(),
            "naming.suffix" => updated.naming.suffix = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'lifeboat config list' to see available keys.",
                key
            ),
        }
        updated.validate().context("Invalid configuration value")?;
        *self = updated;
        Ok(())
    }

    /// All settings-file keys, in display order
    pub fn keys() -> &'static [&'static str] {
        &[
            "schedule.reschedule_delay_secs",
            "schedule.lock_scope",
            "naming.prefix",
            "naming.suffix",
        ]
    }
}

impl ConfigProvider for Settings {
    fn get_duration(&self, key: &str) -> Option<Duration> {
        match key {
            KEY_RESCHEDULE_DELAY => Some(
                Duration::from_secs(self.schedule.reschedule_delay_secs).max(MIN_RESCHEDULE_DELAY),
            ),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match key {
            KEY_SNAPSHOT_NAME_PREFIX => Some(self.naming.prefix.clone()),
            KEY_SNAPSHOT_NAME_SUFFIX => Some(self.naming.suffix.clone()),
            KEY_LOCK_SCOPE => Some(self.schedule.lock_scope.as_str().to_string()),
            _ => None,
        }
    }
}

/// Settings that can be changed while tasks are running
///
/// Clones share the same underlying values.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
    /// Delay override that bypasses the settings-file minimum
    delay_override: Arc<RwLock<Option<Duration>>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
            delay_override: Arc::new(RwLock::new(None)),
        }
    }

    /// Mutate the settings in place
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.inner.write());
    }

    /// Use `delay` as reschedule delay regardless of the settings value
    ///
    /// Embedders (and tests) use this for sub-minimum intervals.
    pub fn set_delay_override(&self, delay: Option<Duration>) {
        *self.delay_override.write() = delay;
    }
}

impl ConfigProvider for SharedSettings {
    fn get_duration(&self, key: &str) -> Option<Duration> {
        if key == KEY_RESCHEDULE_DELAY {
            if let Some(delay) = *self.delay_override.read() {
                return Some(delay);
            }
        }
        self.inner.read().get_duration(key)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.inner.read().get_string(key)
    }
}

/// Location of the settings file
///
/// `$LIFEBOAT_CONFIG` wins; otherwise `<config dir>/lifeboat/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("lifeboat").join("config.toml"))
}

/// Load settings from the default location (defaults if the file is missing)
pub fn load() -> Result<Settings> {
    let path = config_file_path().context("Could not determine config file path")?;
    load_from(&path)
}

/// Load settings from `path` (defaults if the file is missing)
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let settings: Settings = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Save settings to the default location
pub fn save(settings: &Settings) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(settings, &path)
}

/// Save settings to `path`, creating parent directories
pub fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    settings.validate().context("Refusing to save invalid configuration")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let text = toml::to_string_pretty(settings).context("Failed to serialize configuration")?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved settings");
    Ok(())
}

/// Write a default settings file if none exists yet
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&Settings::default(), &path)?;
    }
    Ok(path)
}

/// Annotated example settings file
pub fn example_config() -> String {
    format!(
        r#"# Lifeboat configuration

[schedule]
# Seconds between two snapshots of the same editor (minimum {min})
reschedule_delay_secs = {delay}
# "resource" locks each file separately, "workspace" serializes all writes
lock_scope = "resource"

[naming]
# Snapshot of foo.txt is written next to it as <prefix>foo.txt<suffix>
prefix = "{prefix}"
suffix = "{suffix}"
"#,
        min = MIN_RESCHEDULE_DELAY.as_secs(),
        delay = DEFAULT_RESCHEDULE_DELAY.as_secs(),
        prefix = DEFAULT_SNAPSHOT_NAME_PREFIX,
        suffix = DEFAULT_SNAPSHOT_NAME_SUFFIX,
    )
}
