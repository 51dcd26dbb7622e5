//! Open editors, as seen by the snapshot machinery
//!
//! A [`Document`] is owned by the host editor. The snapshot code only reads
//! from it: its path, whether it is dirty, and its live text. Two documents
//! are "the same" only when they are the same open editor instance, which is
//! why they travel as [`DocumentRef`] and compare by pointer.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An open, possibly modified editor backed by a file
pub trait Document: Send + Sync + 'static {
    /// Storage path of the file this editor edits
    fn path(&self) -> &Path;

    /// Whether the editor holds unsaved changes
    fn is_dirty(&self) -> bool;

    /// Live text of the editor, `None` when the editor does not expose text
    fn contents(&self) -> Option<String>;

    /// Declared charset of the underlying file
    fn charset(&self) -> String {
        "UTF-8".to_string()
    }

    /// Portable form of the path, used for task names and log lines
    fn label(&self) -> String {
        self.path().to_string_lossy().replace('\\', "/")
    }
}

/// Shared, identity-compared handle to a [`Document`]
#[derive(Clone)]
pub struct DocumentRef(Arc<dyn Document>);

impl DocumentRef {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self(document)
    }

    /// True iff both handles point at the same open editor
    pub fn same_as(&self, other: &DocumentRef) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl<D: Document> From<Arc<D>> for DocumentRef {
    fn from(document: Arc<D>) -> Self {
        Self(document)
    }
}

impl std::ops::Deref for DocumentRef {
    type Target = dyn Document;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DocumentRef").field(&self.0.label()).finish()
    }
}

/// In-memory text buffer implementing [`Document`]
///
/// Hosts without their own document model (and the tests) use this: edits
/// mark the buffer dirty, saving clears the flag.
pub struct BufferDocument {
    path: PathBuf,
    charset: String,
    text: RwLock<String>,
    dirty: AtomicBool,
}

impl BufferDocument {
    /// Create a clean buffer for `path` holding `text`
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            charset: "UTF-8".to_string(),
            text: RwLock::new(text.into()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Set the declared charset
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Replace the buffer text and mark it dirty
    pub fn edit(&self, text: impl Into<String>) {
        *self.text.write() = text.into();
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Mark the buffer as saved
    pub fn mark_saved(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl Document for BufferDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn contents(&self) -> Option<String> {
        Some(self.text.read().clone())
    }

    fn charset(&self) -> String {
        self.charset.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_content() {
        let a: DocumentRef = Arc::new(BufferDocument::new("src/foo.txt", "X")).into();
        let b: DocumentRef = Arc::new(BufferDocument::new("src/foo.txt", "X")).into();
        let a2 = a.clone();

        assert!(a.same_as(&a2));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_edit_marks_dirty() {
        let doc = BufferDocument::new("foo.txt", "");
        assert!(!doc.is_dirty());

        doc.edit("X");
        assert!(doc.is_dirty());
        assert_eq!(doc.contents().as_deref(), Some("X"));

        doc.mark_saved();
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_label_is_portable() {
        let doc = BufferDocument::new(Path::new("proj").join("src").join("a.rs"), "");
        assert_eq!(doc.label(), "proj/src/a.rs");
    }

    #[test]
    fn test_charset_override() {
        let doc = BufferDocument::new("a.txt", "").with_charset("ISO-8859-1");
        assert_eq!(doc.charset(), "ISO-8859-1");
    }
}
