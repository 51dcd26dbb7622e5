//! The per-editor snapshot task
//!
//! A task loops on the runtime until completed: the first run reconciles a
//! leftover snapshot, every later run saves, and between runs it waits for
//! the configured delay. Waits end early on [`SnapshotTask::wake_up`]; a
//! task put to [`SnapshotTask::sleep`] waits without a deadline until woken.
//! [`SnapshotTask::complete`] ends the loop after any in-flight run and
//! deletes the snapshot.

use crate::actions::Action;
use crate::context::AppContext;
use crate::registry::{Family, FamilyMember, SNAPSHOT_FAMILY};
use lifeboat_core::config;
use lifeboat_core::{DocumentRef, Result, SnapshotError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, trace, warn, Instrument};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Where a task is in its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Spawned, first run not started yet
    Pending,
    Running,
    /// Between runs
    Waiting,
    /// Loop exited; never runs again
    Completed,
}

/// Recurring snapshot task bound to one open editor
pub struct SnapshotTask {
    id: u64,
    name: String,
    document: DocumentRef,
    completed: AtomicBool,
    /// Set by `complete()`: delete the snapshot on the way out
    close_requested: AtomicBool,
    first_run: AtomicBool,
    sleeping: AtomicBool,
    wake_requested: AtomicBool,
    state: Mutex<TaskState>,
    signal: Notify,
    runs: AtomicU64,
    done: watch::Sender<bool>,
}

impl SnapshotTask {
    /// Create, register and start a task for `document`
    ///
    /// The first run is scheduled immediately.
    pub fn spawn(ctx: &Arc<AppContext>, document: DocumentRef) -> Result<Arc<Self>> {
        if document.path().file_name().is_none() {
            return Err(SnapshotError::InvalidDocument(format!(
                "{} has no file name",
                document.label()
            )));
        }

        let (done, _) = watch::channel(false);
        let task = Arc::new(Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            name: format!("Snapshotting {}", document.label()),
            document,
            completed: AtomicBool::new(false),
            close_requested: AtomicBool::new(false),
            first_run: AtomicBool::new(true),
            sleeping: AtomicBool::new(false),
            wake_requested: AtomicBool::new(false),
            state: Mutex::new(TaskState::Pending),
            signal: Notify::new(),
            runs: AtomicU64::new(0),
            done,
        });

        ctx.tasks().register(Arc::clone(&task));

        let span = tracing::info_span!(
            "snapshot_task",
            id = task.id,
            document = %task.document.label()
        );
        ctx.runtime()
            .spawn(Arc::clone(&task).drive(Arc::clone(ctx)).instrument(span));

        debug!(id = task.id, name = %task.name, "snapshot task scheduled");
        Ok(task)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name, `Snapshotting <path>`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn state(&self) -> TaskState {
        *self.state.lock()
    }

    /// Runs started so far
    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping.load(Ordering::SeqCst)
    }

    /// False once completed
    pub fn should_run(&self) -> bool {
        !self.is_completed()
    }

    /// False once completed
    pub fn should_schedule(&self) -> bool {
        !self.is_completed()
    }

    /// Run as soon as possible, cancelling any pending delay or sleep
    pub fn wake_up(&self) {
        if self.is_completed() {
            return;
        }
        self.sleeping.store(false, Ordering::SeqCst);
        self.wake_requested.store(true, Ordering::SeqCst);
        self.signal.notify_one();
        trace!(id = self.id, "woken");
    }

    /// Park the task until the next [`wake_up`](Self::wake_up)
    ///
    /// A run in flight finishes first.
    pub fn sleep(&self) {
        if self.is_completed() {
            return;
        }
        self.sleeping.store(true, Ordering::SeqCst);
        self.signal.notify_one();
        trace!(id = self.id, "put to sleep");
    }

    /// Stop the task and delete its snapshot
    ///
    /// Returns immediately. The delete runs once any in-flight run has
    /// finished; await [`finished`](Self::finished) to observe it.
    pub fn complete(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.close_requested.store(true, Ordering::SeqCst);
        self.signal.notify_one();
        info!(id = self.id, document = %self.document.label(), "snapshot task completing");
    }

    /// Stop the task and keep its snapshot
    pub fn cancel(&self) {
        if self.completed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.signal.notify_one();
        debug!(id = self.id, "snapshot task cancelled");
    }

    /// Resolves once the loop has exited (and the delete, if any, has run)
    pub async fn finished(&self) {
        let mut rx = self.done.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn set_state(&self, state: TaskState) {
        *self.state.lock() = state;
    }

    async fn drive(self: Arc<Self>, ctx: Arc<AppContext>) {
        loop {
            if !self.should_run() {
                break;
            }
            if ctx.is_shutting_down() {
                debug!("shutdown in progress, not rescheduling");
                self.completed.store(true, Ordering::SeqCst);
                break;
            }

            self.set_state(TaskState::Running);
            self.wake_requested.store(false, Ordering::SeqCst);
            self.run_once(&ctx).await;

            if !self.should_schedule() {
                break;
            }
            let delay = config::reschedule_delay(ctx.config());
            self.set_state(TaskState::Waiting);
            trace!(?delay, "rescheduled");
            self.wait(delay).await;
        }

        if self.close_requested.load(Ordering::SeqCst) {
            let _guard = ctx.locks().acquire(self.document.path()).await;
            run_action(&ctx, &self.document, Action::Delete).await;
        }

        self.set_state(TaskState::Completed);
        ctx.tasks().unregister(&self);
        self.done.send_replace(true);
        debug!(runs = self.run_count(), "snapshot task finished");
    }

    async fn run_once(&self, ctx: &Arc<AppContext>) {
        let _guard = ctx.locks().acquire(self.document.path()).await;
        let action = if self.first_run.swap(false, Ordering::SeqCst) {
            Action::Reconcile
        } else {
            Action::Save
        };
        self.runs.fetch_add(1, Ordering::SeqCst);
        run_action(ctx, &self.document, action).await;
    }

    /// Wait out `delay` unless woken or completed first
    async fn wait(&self, delay: Duration) {
        let deadline = Instant::now() + delay;
        loop {
            if self.is_completed() || self.wake_requested.swap(false, Ordering::SeqCst) {
                return;
            }
            if self.is_sleeping() {
                self.signal.notified().await;
                continue;
            }
            tokio::select! {
                _ = time::sleep_until(deadline) => return,
                _ = self.signal.notified() => {}
            }
        }
    }
}

/// Run `action` off the async workers; failures are logged, never raised
async fn run_action(ctx: &Arc<AppContext>, document: &DocumentRef, action: Action) {
    let worker_ctx = Arc::clone(ctx);
    let worker_doc = document.clone();
    let joined =
        tokio::task::spawn_blocking(move || action.perform(&worker_ctx, &*worker_doc)).await;

    match joined {
        Ok(Ok(outcome)) => trace!(action = action.name(), ?outcome, "action done"),
        Ok(Err(e)) => warn!(
            action = action.name(),
            error = %e,
            "snapshot action failed; retrying next cycle"
        ),
        Err(e) => error!(action = action.name(), error = %e, "snapshot action panicked"),
    }
}

impl FamilyMember for SnapshotTask {
    fn family(&self) -> Family {
        SNAPSHOT_FAMILY
    }

    fn is_for(&self, document: &DocumentRef) -> bool {
        self.document.same_as(document)
    }

    fn wake_up(&self) {
        SnapshotTask::wake_up(self);
    }
}

impl std::fmt::Debug for SnapshotTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("completed", &self.is_completed())
            .field("sleeping", &self.is_sleeping())
            .finish()
    }
}
