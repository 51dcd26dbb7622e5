//! The three snapshot actions
//!
//! Each action is a blocking function of the shared context and one
//! document. Callers hold the document's resource lock while one runs. Every
//! action recomputes the snapshot handle from current configuration and
//! treats a handle equal to the document path as "no snapshot".

use crate::context::AppContext;
use crate::host::RecoveryCandidate;
use lifeboat_core::hash::hash_bytes;
use lifeboat_core::{Charset, Document, Result, SnapshotHandle};
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

/// What a snapshot task asks for on a given run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the editor's unsaved text to its snapshot
    Save,
    /// Remove the snapshot once the editor is closed
    Delete,
    /// Offer a snapshot left behind by an earlier session
    Reconcile,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Reconcile => "reconcile",
        }
    }

    /// Run this action for `document`
    pub fn perform(self, ctx: &AppContext, document: &dyn Document) -> Result<Outcome> {
        match self {
            Self::Save => save(ctx, document),
            Self::Delete => delete(ctx, document),
            Self::Reconcile => reconcile(ctx, document),
        }
    }
}

/// Result of a successful action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The editor had no unsaved changes
    Clean,
    /// The editor exposes no text
    NoText,
    /// The document path has no file name
    NoHandle,
    /// Naming maps the snapshot onto the original; nothing done
    SelfSnapshot,
    /// There was no snapshot to act on
    NoSnapshot,
    Written { path: PathBuf, bytes: usize },
    Deleted(PathBuf),
    /// A leftover snapshot was handed to the recovery prompt
    Offered(RecoveryCandidate),
}

/// Handle for `document`, or the outcome that short-circuits the action
fn usable_handle(ctx: &AppContext, document: &dyn Document) -> std::result::Result<SnapshotHandle, Outcome> {
    let handle = ctx.handle_for(document).ok_or(Outcome::NoHandle)?;
    if handle.is_self_snapshot() {
        warn!(
            document = %document.label(),
            "snapshot name equals the file name; check the naming prefix and suffix"
        );
        return Err(Outcome::SelfSnapshot);
    }
    Ok(handle)
}

/// Write the editor's current text to its snapshot
pub fn save(ctx: &AppContext, document: &dyn Document) -> Result<Outcome> {
    if !document.is_dirty() {
        trace!(document = %document.label(), "clean, nothing to save");
        return Ok(Outcome::Clean);
    }
    let handle = match usable_handle(ctx, document) {
        Ok(handle) => handle,
        Err(outcome) => return Ok(outcome),
    };
    let Some(text) = document.contents() else {
        debug!(document = %document.label(), "no text available");
        return Ok(Outcome::NoText);
    };

    let charset: Charset = document.charset().parse()?;
    let bytes = charset.encode(&text);
    ctx.store().write(handle.path(), &bytes)?;

    debug!(
        document = %document.label(),
        snapshot = %handle.path().display(),
        bytes = bytes.len(),
        charset = %charset,
        "snapshot saved"
    );
    Ok(Outcome::Written {
        path: handle.path().to_path_buf(),
        bytes: bytes.len(),
    })
}

/// Remove the snapshot of a closed editor
///
/// Runs regardless of timestamps: a snapshot newer than the saved file is
/// deleted too, since the user closed the editor knowingly.
pub fn delete(ctx: &AppContext, document: &dyn Document) -> Result<Outcome> {
    let handle = match usable_handle(ctx, document) {
        Ok(handle) => handle,
        Err(outcome) => return Ok(outcome),
    };
    if !ctx.store().exists(handle.path()) {
        trace!(document = %document.label(), "no snapshot to delete");
        return Ok(Outcome::NoSnapshot);
    }

    ctx.store().delete(handle.path())?;
    debug!(
        document = %document.label(),
        snapshot = %handle.path().display(),
        "snapshot deleted"
    );
    Ok(Outcome::Deleted(handle.path().to_path_buf()))
}

/// Detect a snapshot left behind by a previous session and offer it
///
/// The prompt runs later on the UI executor; this returns as soon as it is
/// queued.
pub fn reconcile(ctx: &AppContext, document: &dyn Document) -> Result<Outcome> {
    ctx.store().refresh()?;

    let handle = match usable_handle(ctx, document) {
        Ok(handle) => handle,
        Err(outcome) => return Ok(outcome),
    };
    let store = ctx.store();
    if !store.exists(handle.path()) {
        trace!(document = %document.label(), "no leftover snapshot");
        return Ok(Outcome::NoSnapshot);
    }

    let snapshot_hash = store.read(handle.path()).ok().map(|bytes| hash_bytes(&bytes));
    let identical = match (store.read(handle.original()), snapshot_hash) {
        (Ok(original), Some(hash)) => hash_bytes(&original) == hash,
        _ => false,
    };
    let candidate = RecoveryCandidate {
        label: document.label(),
        original: handle.original().to_path_buf(),
        snapshot: handle.path().to_path_buf(),
        snapshot_modified: store.mtime(handle.path()).ok(),
        identical,
    };

    info!(
        document = %candidate.label,
        snapshot = %candidate.snapshot.display(),
        hash = snapshot_hash.map(|h| h.short()).as_deref().unwrap_or("-"),
        identical,
        "found snapshot from a previous session"
    );

    let prompt = ctx.prompt();
    let offered = candidate.clone();
    ctx.ui()
        .async_exec(Box::new(move || prompt.confirm_and_show_diff(offered)));

    Ok(Outcome::Offered(candidate))
}
