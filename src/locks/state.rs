//! Folder lock computation

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::trace;
use uuid::Uuid;

use crate::command::RlvCommand;
use crate::inventory::InventoryTree;
use crate::restrictions::{Restriction, RestrictionStore};

/// Attach or detach side of a folder lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockFamily {
    /// `attachthis`, `attachallthis` and their exceptions
    Attach,
    /// `detachthis`, `detachallthis` and their exceptions
    Detach,
}

impl LockFamily {
    /// `(this, allthis, this_except, allthis_except)`
    fn commands(self) -> [RlvCommand; 4] {
        match self {
            LockFamily::Attach => [
                RlvCommand::AttachThis,
                RlvCommand::AttachAllThis,
                RlvCommand::AttachThisExcept,
                RlvCommand::AttachAllThisExcept,
            ],
            LockFamily::Detach => [
                RlvCommand::DetachThis,
                RlvCommand::DetachAllThis,
                RlvCommand::DetachThisExcept,
                RlvCommand::DetachAllThisExcept,
            ],
        }
    }
}

/// Lock state of one folder, with the entries that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderLockState {
    /// Folder id
    pub folder_id: Uuid,
    /// Whether items in the folder may be attached or worn
    pub can_attach: bool,
    /// Whether items in the folder may be detached or taken off
    pub can_detach: bool,
    /// Attach locks reaching this folder, excepted or not
    pub attach_restrictions: Vec<Restriction>,
    /// Attach exceptions that cancelled a lock here
    pub attach_exceptions: Vec<Restriction>,
    /// Detach locks reaching this folder, excepted or not
    pub detach_restrictions: Vec<Restriction>,
    /// Detach exceptions that cancelled a lock here
    pub detach_exceptions: Vec<Restriction>,
}

impl FolderLockState {
    fn new(folder_id: Uuid) -> Self {
        Self {
            folder_id,
            can_attach: true,
            can_detach: true,
            attach_restrictions: Vec::new(),
            attach_exceptions: Vec::new(),
            detach_restrictions: Vec::new(),
            detach_exceptions: Vec::new(),
        }
    }

    fn record(&mut self, family: LockFamily, lock: &Restriction, cancelled_by: Option<&Restriction>) {
        let (restrictions, exceptions, allowed) = match family {
            LockFamily::Attach => (
                &mut self.attach_restrictions,
                &mut self.attach_exceptions,
                &mut self.can_attach,
            ),
            LockFamily::Detach => (
                &mut self.detach_restrictions,
                &mut self.detach_exceptions,
                &mut self.can_detach,
            ),
        };

        if !restrictions.iter().any(|r| r.sequence == lock.sequence) {
            restrictions.push(lock.clone());
        }
        match cancelled_by {
            Some(ex) => {
                if !exceptions.iter().any(|e| e.sequence == ex.sequence) {
                    exceptions.push(ex.clone());
                }
            }
            None => *allowed = false,
        }
    }
}

struct FolderException<'a> {
    restriction: &'a Restriction,
    folder: Uuid,
    covered: Vec<Uuid>,
}

/// Per-folder lock states derived from the store and one tree snapshot
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    states: HashMap<Uuid, FolderLockState>,
    shared: HashSet<Uuid>,
}

impl FolderLocks {
    /// No locks and no shared folders
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute lock states for every folder of `tree`
    pub fn compute(tree: &InventoryTree, store: &RestrictionStore) -> Self {
        let mut locks = Self {
            states: HashMap::new(),
            shared: tree.folder_ids().collect(),
        };
        for family in [LockFamily::Attach, LockFamily::Detach] {
            locks.apply_family(tree, store, family);
        }
        locks
    }

    fn apply_family(&mut self, tree: &InventoryTree, store: &RestrictionStore, family: LockFamily) {
        let [this, all_this, this_except, all_this_except] = family.commands();

        let mut exceptions = Vec::new();
        for (command, recursive) in [(this_except, false), (all_this_except, true)] {
            for restriction in store.query(command) {
                let Some(folder) = restriction
                    .param
                    .as_deref()
                    .and_then(|path| tree.resolve_path(path, true))
                else {
                    continue;
                };
                let covered = if recursive {
                    tree.subtree(folder.id)
                } else {
                    vec![folder.id]
                };
                exceptions.push(FolderException {
                    restriction,
                    folder: folder.id,
                    covered,
                });
            }
        }

        for (command, recursive) in [(this, false), (all_this, true)] {
            for lock in store.query(command) {
                for origin in tree.target_folders(lock.param.as_deref(), lock.sender) {
                    let scope = if recursive {
                        tree.subtree(origin)
                    } else {
                        vec![origin]
                    };
                    for folder in scope {
                        let cancelled_by = exceptions
                            .iter()
                            .find(|ex| {
                                ex.restriction.sender == lock.sender
                                    && ex.covered.contains(&folder)
                                    // A lock set strictly inside the excepted subtree is nearer
                                    && !(ex.folder != origin
                                        && tree.is_ancestor_or_self(ex.folder, origin))
                            })
                            .map(|ex| ex.restriction);

                        trace!(
                            "[FolderLocks] {} from {} reaches {} (excepted: {})",
                            lock.status_key(),
                            lock.sender,
                            folder,
                            cancelled_by.is_some()
                        );
                        self.states
                            .entry(folder)
                            .or_insert_with(|| FolderLockState::new(folder))
                            .record(family, lock, cancelled_by);
                    }
                }
            }
        }
    }

    /// Lock state of a folder, if any lock reaches it
    pub fn state(&self, folder: Uuid) -> Option<&FolderLockState> {
        self.states.get(&folder)
    }

    /// Whether items in `folder` may be attached
    pub fn can_attach(&self, folder: Uuid) -> bool {
        self.state(folder).map_or(true, |s| s.can_attach)
    }

    /// Whether items in `folder` may be detached
    pub fn can_detach(&self, folder: Uuid) -> bool {
        self.state(folder).map_or(true, |s| s.can_detach)
    }

    /// Whether `folder` belongs to the shared tree these locks were computed for
    pub fn is_shared(&self, folder: Uuid) -> bool {
        self.shared.contains(&folder)
    }

    /// Every folder some lock reaches
    pub fn states(&self) -> impl Iterator<Item = &FolderLockState> {
        self.states.values()
    }

    /// Number of folders some lock reaches
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no lock reaches any folder
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
