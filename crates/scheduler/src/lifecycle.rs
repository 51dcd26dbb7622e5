//! Wiring between host editor events and snapshot tasks
//!
//! The host reports editors opening, closing and changing focus through
//! [`PartListener`], and windows through [`WindowListener`]. The
//! [`LifecycleCoordinator`] installs both and maps:
//!
//! - editor opened: start a task (one per editor instance)
//! - editor closed: complete its task, deleting the snapshot
//! - editor activated: wake its task
//! - editor deactivated: snapshot now, then sleep until activated again
//! - window deactivated: wake every task, on the UI executor

use crate::context::AppContext;
use crate::registry::SNAPSHOT_FAMILY;
use crate::task::SnapshotTask;
use lifeboat_core::DocumentRef;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub type WindowId = u64;

/// A workbench part as reported by the host
#[derive(Debug, Clone)]
pub enum Part {
    /// Text editor backed by a file
    FileEditor(DocumentRef),
    /// Views, and editors not backed by a file
    Other(String),
}

impl Part {
    pub fn document(&self) -> Option<&DocumentRef> {
        match self {
            Self::FileEditor(document) => Some(document),
            Self::Other(_) => None,
        }
    }
}

/// Receives part events from one window
pub trait PartListener: Send + Sync {
    fn part_opened(&self, part: &Part);
    fn part_closed(&self, part: &Part);
    fn part_activated(&self, _part: &Part) {}
    fn part_deactivated(&self, _part: &Part) {}
    fn part_brought_to_top(&self, _part: &Part) {}
}

/// Receives window events from the workbench
pub trait WindowListener: Send + Sync {
    fn window_opened(&self, window: &Arc<dyn Window>);
    fn window_closed(&self, window: &Arc<dyn Window>);
    fn window_activated(&self, _window: &Arc<dyn Window>) {}
    fn window_deactivated(&self, _window: &Arc<dyn Window>) {}
}

/// A host window holding editors
pub trait Window: Send + Sync {
    fn id(&self) -> WindowId;
    fn add_part_listener(&self, listener: Arc<dyn PartListener>);
    /// Listeners are matched by `Arc` identity
    fn remove_part_listener(&self, listener: &Arc<dyn PartListener>);
    /// Editors open in this window right now
    fn open_editors(&self) -> Vec<Part>;
}

/// The host's set of windows
pub trait Workbench: Send + Sync {
    fn add_window_listener(&self, listener: Arc<dyn WindowListener>);
    fn remove_window_listener(&self, listener: &Arc<dyn WindowListener>);
    fn windows(&self) -> Vec<Arc<dyn Window>>;
}

struct EditorTracker {
    ctx: Arc<AppContext>,
    focus_tracking: bool,
}

impl EditorTracker {
    /// Task still monitoring `part`; completed tasks that have not exited
    /// yet are passed over
    fn task_for(&self, part: &Part) -> Option<Arc<SnapshotTask>> {
        let document = part.document()?;
        self.ctx
            .tasks()
            .find_by_family(SNAPSHOT_FAMILY)
            .into_iter()
            .find(|task| !task.is_completed() && task.document().same_as(document))
    }
}

impl PartListener for EditorTracker {
    fn part_opened(&self, part: &Part) {
        let Some(document) = part.document() else {
            trace!(?part, "not a file editor, ignoring");
            return;
        };
        if self.ctx.is_shutting_down() {
            return;
        }
        if let Some(existing) = self.task_for(part) {
            trace!(id = existing.id(), "editor already monitored");
            return;
        }

        match SnapshotTask::spawn(&self.ctx, document.clone()) {
            Ok(task) => debug!(id = task.id(), document = %document.label(), "monitoring editor"),
            Err(e) => warn!(document = %document.label(), error = %e, "cannot monitor editor"),
        }
    }

    fn part_closed(&self, part: &Part) {
        if let Some(task) = self.task_for(part) {
            task.complete();
        }
    }

    fn part_activated(&self, part: &Part) {
        if !self.focus_tracking {
            return;
        }
        if let Some(task) = self.task_for(part) {
            task.wake_up();
        }
    }

    fn part_deactivated(&self, part: &Part) {
        if !self.focus_tracking {
            return;
        }
        if let Some(task) = self.task_for(part) {
            task.wake_up();
            task.sleep();
        }
    }
}

struct WindowTracker {
    ctx: Arc<AppContext>,
    parts: Arc<dyn PartListener>,
}

impl WindowListener for WindowTracker {
    fn window_opened(&self, window: &Arc<dyn Window>) {
        trace!(window = window.id(), "window opened");
        window.add_part_listener(Arc::clone(&self.parts));
    }

    fn window_closed(&self, window: &Arc<dyn Window>) {
        trace!(window = window.id(), "window closed");
        window.remove_part_listener(&self.parts);
    }

    fn window_deactivated(&self, window: &Arc<dyn Window>) {
        trace!(window = window.id(), "window deactivated, waking snapshot tasks");
        let ctx = Arc::clone(&self.ctx);
        self.ctx.ui().async_exec(Box::new(move || {
            let woken = ctx.tasks().wake_all(SNAPSHOT_FAMILY);
            debug!(woken, "woke snapshot tasks");
        }));
    }
}

/// Installs and removes the editor/window listeners
pub struct LifecycleCoordinator {
    ctx: Arc<AppContext>,
    parts: Arc<dyn PartListener>,
    windows: Arc<dyn WindowListener>,
}

impl LifecycleCoordinator {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self::build(ctx, true)
    }

    /// Enable or disable waking/sleeping tasks on editor focus changes
    ///
    /// On by default. Call before [`start`](Self::start).
    pub fn with_focus_tracking(self, enabled: bool) -> Self {
        Self::build(self.ctx, enabled)
    }

    fn build(ctx: Arc<AppContext>, focus_tracking: bool) -> Self {
        let parts: Arc<dyn PartListener> = Arc::new(EditorTracker {
            ctx: Arc::clone(&ctx),
            focus_tracking,
        });
        let windows: Arc<dyn WindowListener> = Arc::new(WindowTracker {
            ctx: Arc::clone(&ctx),
            parts: Arc::clone(&parts),
        });
        Self {
            ctx,
            parts,
            windows,
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Listener to install on windows the coordinator does not see open
    pub fn part_listener(&self) -> Arc<dyn PartListener> {
        Arc::clone(&self.parts)
    }

    pub fn window_listener(&self) -> Arc<dyn WindowListener> {
        Arc::clone(&self.windows)
    }

    /// Listen to `workbench` and start tasks for editors already open
    pub fn start(&self, workbench: &dyn Workbench) {
        workbench.add_window_listener(Arc::clone(&self.windows));

        let mut editors = 0;
        for window in workbench.windows() {
            window.add_part_listener(Arc::clone(&self.parts));
            for part in window.open_editors() {
                if part.document().is_some() {
                    editors += 1;
                }
                self.parts.part_opened(&part);
            }
        }
        info!(editors, "snapshot monitoring started");
    }

    /// Remove every listener installed by [`start`](Self::start)
    ///
    /// Running tasks keep going until completed or shut down.
    pub fn stop(&self, workbench: &dyn Workbench) {
        workbench.remove_window_listener(&self.windows);
        for window in workbench.windows() {
            window.remove_part_listener(&self.parts);
        }
        debug!("snapshot monitoring stopped");
    }

    /// Stop rescheduling; snapshots on disk stay for the next session
    pub fn shutdown(&self) {
        self.ctx.begin_shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeboat_core::{BufferDocument, MemoryStore};

    fn ctx() -> Arc<AppContext> {
        AppContext::builder(Arc::new(MemoryStore::new()))
            .build()
            .unwrap()
    }

    fn editor(path: &str) -> Part {
        Part::FileEditor(DocumentRef::from(Arc::new(BufferDocument::new(path, ""))))
    }

    #[tokio::test]
    async fn test_open_twice_starts_one_task() {
        let coordinator = LifecycleCoordinator::new(ctx());
        let part = editor("a.txt");
        let listener = coordinator.part_listener();

        listener.part_opened(&part);
        listener.part_opened(&part);
        assert_eq!(coordinator.context().tasks().len(), 1);

        listener.part_closed(&part);
        let task = coordinator
            .context()
            .tasks()
            .find_for_document(SNAPSHOT_FAMILY, part.document().unwrap())
            .unwrap();
        assert!(task.is_completed());
        task.finished().await;
        assert!(coordinator.context().tasks().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_before_old_task_exits() {
        let coordinator = LifecycleCoordinator::new(ctx());
        let part = editor("r.txt");
        let listener = coordinator.part_listener();
        let tasks = || coordinator.context().tasks().find_by_family(SNAPSHOT_FAMILY);

        listener.part_opened(&part);
        listener.part_closed(&part);
        // the closed task has not been polled yet and is still registered
        listener.part_opened(&part);
        assert_eq!(tasks().len(), 2);
        assert_eq!(tasks().iter().filter(|t| !t.is_completed()).count(), 1);

        listener.part_closed(&part);
        assert!(tasks().iter().all(|t| t.is_completed()));

        for task in tasks() {
            task.finished().await;
        }
        assert!(coordinator.context().tasks().is_empty());
    }

    #[tokio::test]
    async fn test_other_parts_are_ignored() {
        let coordinator = LifecycleCoordinator::new(ctx());
        let view = Part::Other("Outline".to_string());
        let listener = coordinator.part_listener();

        listener.part_opened(&view);
        listener.part_activated(&view);
        listener.part_closed(&view);
        assert!(coordinator.context().tasks().is_empty());
    }

    #[tokio::test]
    async fn test_focus_tracking_can_be_disabled() {
        let coordinator = LifecycleCoordinator::new(ctx()).with_focus_tracking(false);
        let part = editor("f.txt");
        let listener = coordinator.part_listener();

        listener.part_opened(&part);
        listener.part_deactivated(&part);
        let task = coordinator
            .context()
            .tasks()
            .find_for_document(SNAPSHOT_FAMILY, part.document().unwrap())
            .unwrap();
        assert!(!task.is_sleeping());

        task.complete();
        task.finished().await;
    }

    #[tokio::test]
    async fn test_no_new_tasks_after_shutdown() {
        let coordinator = LifecycleCoordinator::new(ctx());
        coordinator.shutdown();
        coordinator.part_listener().part_opened(&editor("late.txt"));
        assert!(coordinator.context().tasks().is_empty());
    }
}
