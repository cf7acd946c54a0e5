//! Folder locks
//!
//! `attachthis`/`detachthis` lock the folder a restriction resolves to;
//! `attachallthis`/`detachallthis` also lock its non-private descendants.
//! Folder-scoped `_except` entries cancel locks from their own sender and
//! family. States are recomputed from the store for every tree snapshot.

mod state;

pub use state::{FolderLockState, FolderLocks, LockFamily};
