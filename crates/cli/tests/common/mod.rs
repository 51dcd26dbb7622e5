//! Common utilities for integration tests

#![allow(dead_code)]

pub mod cli;

pub use cli::{CommandResult, LifeboatCommand};

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch workspace with its own settings file
pub struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = dir.path().join(".lifeboat-test/config.toml");
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_file(&self) -> &Path {
        &self.config
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root().join(rel)).expect("read file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }

    /// `lifeboat` command running in this workspace
    pub fn lifeboat(&self, args: &[&str]) -> LifeboatCommand {
        let mut command = LifeboatCommand::new(self.root(), &self.config);
        command.args(args);
        command
    }
}
