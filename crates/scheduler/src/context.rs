//! Shared services for snapshot tasks
//!
//! Everything a task needs (configuration, storage, the recovery prompt, the
//! UI executor, locks and the task registry) hangs off one [`AppContext`]
//! that the host builds at startup and passes around as `Arc<AppContext>`.

use crate::host::{LogPrompt, RecoveryPrompt, RuntimeExecutor, UiExecutor};
use crate::locks::ResourceLocks;
use crate::registry::TaskRegistry;
use crate::task::SnapshotTask;
use lifeboat_core::config::{self, ConfigProvider, LockScope};
use lifeboat_core::{Document, Result, SharedSettings, SnapshotError, SnapshotHandle};
use lifeboat_core::{SnapshotNaming, SnapshotStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Services shared by every snapshot task of one host
pub struct AppContext {
    config: Arc<dyn ConfigProvider>,
    store: Arc<dyn SnapshotStore>,
    prompt: Arc<dyn RecoveryPrompt>,
    ui: Arc<dyn UiExecutor>,
    runtime: Handle,
    locks: ResourceLocks,
    tasks: TaskRegistry<SnapshotTask>,
    shutting_down: AtomicBool,
}

impl AppContext {
    /// Start building a context around `store`
    pub fn builder(store: Arc<dyn SnapshotStore>) -> AppContextBuilder {
        AppContextBuilder {
            store,
            config: None,
            prompt: None,
            ui: None,
            runtime: None,
            lock_scope: None,
        }
    }

    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    pub fn prompt(&self) -> Arc<dyn RecoveryPrompt> {
        Arc::clone(&self.prompt)
    }

    pub fn ui(&self) -> &dyn UiExecutor {
        self.ui.as_ref()
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn locks(&self) -> &ResourceLocks {
        &self.locks
    }

    pub fn tasks(&self) -> &TaskRegistry<SnapshotTask> {
        &self.tasks
    }

    /// Naming read fresh from configuration
    pub fn naming(&self) -> SnapshotNaming {
        SnapshotNaming::from_config(self.config())
    }

    /// Snapshot handle for `document` under the current naming
    pub fn handle_for(&self, document: &dyn Document) -> Option<SnapshotHandle> {
        self.naming().handle_for(document.path())
    }

    /// Stop scheduling: tasks finish their current run and exit without
    /// deleting their snapshots
    pub fn begin_shutdown(&self) {
        if !self.shutting_down.swap(true, Ordering::SeqCst) {
            tracing::info!(tasks = self.tasks.len(), "snapshot scheduling shutting down");
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("lock_scope", &self.locks.scope())
            .field("tasks", &self.tasks.len())
            .field("shutting_down", &self.is_shutting_down())
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppContext`]
pub struct AppContextBuilder {
    store: Arc<dyn SnapshotStore>,
    config: Option<Arc<dyn ConfigProvider>>,
    prompt: Option<Arc<dyn RecoveryPrompt>>,
    ui: Option<Arc<dyn UiExecutor>>,
    runtime: Option<Handle>,
    lock_scope: Option<LockScope>,
}

impl AppContextBuilder {
    /// Configuration source (default: built-in settings)
    pub fn config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = Some(config);
        self
    }

    /// Recovery prompt (default: [`LogPrompt`])
    pub fn prompt(mut self, prompt: Arc<dyn RecoveryPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// UI executor (default: jobs run on the runtime)
    pub fn ui(mut self, ui: Arc<dyn UiExecutor>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Runtime that drives the tasks (default: the current one)
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Override the lock scope read from configuration
    pub fn lock_scope(mut self, scope: LockScope) -> Self {
        self.lock_scope = Some(scope);
        self
    }

    /// Finish the context
    ///
    /// Fails with [`SnapshotError::NoRuntime`] when no runtime was given and
    /// the caller is not inside one.
    pub fn build(self) -> Result<Arc<AppContext>> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| SnapshotError::NoRuntime)?,
        };
        let config = self
            .config
            .unwrap_or_else(|| Arc::new(SharedSettings::default()) as Arc<dyn ConfigProvider>);
        let scope = self
            .lock_scope
            .unwrap_or_else(|| config::lock_scope(config.as_ref()));
        let ui = self
            .ui
            .unwrap_or_else(|| Arc::new(RuntimeExecutor::new(runtime.clone())) as Arc<dyn UiExecutor>);

        tracing::debug!(lock_scope = scope.as_str(), "snapshot context ready");

        Ok(Arc::new(AppContext {
            config,
            store: self.store,
            prompt: self
                .prompt
                .unwrap_or_else(|| Arc::new(LogPrompt) as Arc<dyn RecoveryPrompt>),
            ui,
            runtime,
            locks: ResourceLocks::new(scope),
            tasks: TaskRegistry::new(),
            shutting_down: AtomicBool::new(false),
        }))
    }
}
