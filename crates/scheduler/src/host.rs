//! Contracts for the host application's UI side
//!
//! The scheduler never touches UI directly. Work that belongs on the UI
//! thread goes through a [`UiExecutor`]; offering a leftover snapshot to the
//! user goes through a [`RecoveryPrompt`].

use std::path::PathBuf;
use std::time::SystemTime;
use tokio::runtime::Handle;

/// A unit of deferred UI work
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs on the host UI thread at its next idle slot
pub trait UiExecutor: Send + Sync {
    /// Queue `job` and return immediately
    fn async_exec(&self, job: UiJob);
}

/// Executor that runs jobs as tasks on a tokio runtime
///
/// Used when the host has no UI thread of its own.
#[derive(Debug, Clone)]
pub struct RuntimeExecutor {
    handle: Handle,
}

impl RuntimeExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl UiExecutor for RuntimeExecutor {
    fn async_exec(&self, job: UiJob) {
        self.handle.spawn(async move { job() });
    }
}

/// A snapshot found when an editor opened, offered for recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryCandidate {
    /// Portable path of the document, for display
    pub label: String,
    pub original: PathBuf,
    pub snapshot: PathBuf,
    pub snapshot_modified: Option<SystemTime>,
    /// Snapshot bytes equal the original's
    pub identical: bool,
}

/// Offers a leftover snapshot to the user
///
/// Implementations show the original and the snapshot side by side and let
/// the user decide what to keep; the scheduler only detects and offers.
/// Called on the UI executor, fire-and-forget.
pub trait RecoveryPrompt: Send + Sync {
    fn confirm_and_show_diff(&self, candidate: RecoveryCandidate);
}

/// Prompt that only logs the candidate
///
/// Headless hosts pair this with `lifeboat scan` / `lifeboat recover`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPrompt;

impl RecoveryPrompt for LogPrompt {
    fn confirm_and_show_diff(&self, candidate: RecoveryCandidate) {
        if candidate.identical {
            tracing::info!(
                document = %candidate.label,
                snapshot = %candidate.snapshot.display(),
                "leftover snapshot matches the saved file"
            );
        } else {
            tracing::warn!(
                document = %candidate.label,
                snapshot = %candidate.snapshot.display(),
                "unsaved changes from a previous session found; run `lifeboat diff` to inspect"
            );
        }
    }
}
