//! Per-editor snapshot scheduling for Lifeboat
//!
//! One [`SnapshotTask`] runs per open editor. It reconciles any snapshot
//! left over from a crash on its first run, then keeps the editor's unsaved
//! text in a sibling snapshot file at the configured interval, and deletes
//! that snapshot when the editor closes. The [`LifecycleCoordinator`] turns
//! host editor/window events into task creation, wake-ups and completion.

pub mod actions;
pub mod context;
pub mod host;
pub mod lifecycle;
pub mod locks;
pub mod registry;
pub mod task;

// Re-exports
pub use actions::{Action, Outcome};
pub use context::{AppContext, AppContextBuilder};
pub use host::{LogPrompt, RecoveryCandidate, RecoveryPrompt, RuntimeExecutor, UiExecutor};
pub use lifecycle::{
    LifecycleCoordinator, Part, PartListener, Window, WindowId, WindowListener, Workbench,
};
pub use locks::{ResourceGuard, ResourceLocks};
pub use registry::{Family, FamilyMember, TaskRegistry, SNAPSHOT_FAMILY};
pub use task::{SnapshotTask, TaskState};

pub use lifeboat_core::{Result, SnapshotError};
