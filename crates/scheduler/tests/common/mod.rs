//! In-process stand-ins for the host workbench
//!
//! `FakeWorkbench` and `FakeWindow` keep their listeners in plain vectors and
//! replay host events to them, the way an editor would when files are
//! opened, focused and closed.

#![allow(dead_code)]

use lifeboat_core::{BufferDocument, DocumentRef, FsStore, SharedSettings};
use lifeboat_scheduler::{
    AppContext, Part, PartListener, RecoveryCandidate, RecoveryPrompt, Window, WindowId,
    WindowListener, Workbench,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Prompt that records every candidate it is shown
#[derive(Default)]
pub struct RecordingPrompt {
    pub offered: Mutex<Vec<RecoveryCandidate>>,
}

impl RecoveryPrompt for RecordingPrompt {
    fn confirm_and_show_diff(&self, candidate: RecoveryCandidate) {
        self.offered.lock().push(candidate);
    }
}

pub struct FakeWindow {
    id: WindowId,
    listeners: Mutex<Vec<Arc<dyn PartListener>>>,
    editors: Mutex<Vec<Part>>,
}

impl FakeWindow {
    pub fn new(id: WindowId) -> Arc<Self> {
        Arc::new(Self {
            id,
            listeners: Mutex::new(Vec::new()),
            editors: Mutex::new(Vec::new()),
        })
    }

    fn listeners(&self) -> Vec<Arc<dyn PartListener>> {
        self.listeners.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Open an editor and give it focus
    pub fn open(&self, part: &Part) {
        self.editors.lock().push(part.clone());
        for listener in self.listeners() {
            listener.part_opened(part);
            listener.part_activated(part);
        }
    }

    pub fn close(&self, part: &Part) {
        for listener in self.listeners() {
            listener.part_deactivated(part);
            listener.part_closed(part);
        }
        self.editors
            .lock()
            .retain(|p| !same_part(p, part));
    }

    pub fn activate(&self, part: &Part) {
        for listener in self.listeners() {
            listener.part_activated(part);
        }
    }

    pub fn deactivate(&self, part: &Part) {
        for listener in self.listeners() {
            listener.part_deactivated(part);
        }
    }
}

fn same_part(a: &Part, b: &Part) -> bool {
    match (a.document(), b.document()) {
        (Some(a), Some(b)) => a.same_as(b),
        _ => false,
    }
}

impl Window for FakeWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn add_part_listener(&self, listener: Arc<dyn PartListener>) {
        self.listeners.lock().push(listener);
    }

    fn remove_part_listener(&self, listener: &Arc<dyn PartListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn open_editors(&self) -> Vec<Part> {
        self.editors.lock().clone()
    }
}

#[derive(Default)]
pub struct FakeWorkbench {
    listeners: Mutex<Vec<Arc<dyn WindowListener>>>,
    windows: Mutex<Vec<Arc<dyn Window>>>,
}

impl FakeWorkbench {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a window that existed before the coordinator started
    pub fn with_window(&self, window: Arc<FakeWindow>) {
        self.windows.lock().push(window);
    }

    pub fn open_window(&self, window: Arc<FakeWindow>) {
        let window: Arc<dyn Window> = window;
        self.windows.lock().push(Arc::clone(&window));
        for listener in self.listeners.lock().clone() {
            listener.window_opened(&window);
        }
    }

    pub fn deactivate_window(&self, id: WindowId) {
        let window = self
            .windows
            .lock()
            .iter()
            .find(|w| w.id() == id)
            .cloned()
            .expect("unknown window");
        for listener in self.listeners.lock().clone() {
            listener.window_deactivated(&window);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Workbench for FakeWorkbench {
    fn add_window_listener(&self, listener: Arc<dyn WindowListener>) {
        self.listeners.lock().push(listener);
    }

    fn remove_window_listener(&self, listener: &Arc<dyn WindowListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn windows(&self) -> Vec<Arc<dyn Window>> {
        self.windows.lock().clone()
    }
}

/// Context over a file-system store with a sub-minimum delay
pub fn fs_context(
    root: &Path,
    delay: Duration,
    prompt: Arc<RecordingPrompt>,
) -> (Arc<AppContext>, SharedSettings) {
    let settings = SharedSettings::default();
    settings.set_delay_override(Some(delay));
    let ctx = AppContext::builder(Arc::new(FsStore::new(root)))
        .config(Arc::new(settings.clone()))
        .prompt(prompt)
        .build()
        .unwrap();
    (ctx, settings)
}

/// Editor for `path` plus the part that carries it
pub fn editor(path: impl AsRef<Path>) -> (Arc<BufferDocument>, Part) {
    let buffer = Arc::new(BufferDocument::new(path.as_ref(), ""));
    let part = Part::FileEditor(DocumentRef::from(Arc::clone(&buffer)));
    (buffer, part)
}

/// Let in-flight runs and queued UI jobs finish
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
