//! Lifeboat Core - building blocks for crash-recovery snapshots of unsaved editors
//!
//! This crate provides the pieces the scheduler is assembled from:
//! - The `Document` contract for open editors (plus an in-memory buffer)
//! - Snapshot naming: deriving a snapshot handle from a document path
//! - The `SnapshotStore` contract with file-system and in-memory stores
//! - Charset encoding of editor text
//! - Configuration (provider contract and TOML settings file)
//! - BLAKE3 content hashing

pub mod charset;
pub mod config;
pub mod document;
pub mod error;
pub mod hash;
pub mod naming;
pub mod store;

// Re-export main types for convenience
pub use charset::Charset;
pub use config::{ConfigProvider, LockScope, Settings, SharedSettings};
pub use document::{BufferDocument, Document, DocumentRef};
pub use error::{Result, SnapshotError};
pub use hash::Blake3Hash;
pub use naming::{SnapshotHandle, SnapshotNaming};
pub use store::{FsStore, MemoryStore, SnapshotStore};
