//! Force command resolution
//!
//! Turns a `...=force` command into the concrete attach/detach/remoutfit
//! batches handed to the host. Restrictions are never consulted here; only
//! the command shape and the inventory snapshot decide the result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::command::RlvCommand;
use crate::core::{AttachmentPoint, WearableType};
use crate::inventory::{InventoryItem, InventoryTree, Selector};

/// One item to attach or wear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRequest {
    /// Inventory item id
    pub item_id: Uuid,
    /// Target point; `None` for wearables or when nothing names a point
    pub attachment_point: Option<AttachmentPoint>,
    /// Whether whatever occupies the point is replaced
    pub replace_existing: bool,
}

/// Concrete batches produced by one force command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForceResolution {
    /// Items to attach or wear
    pub attach: Vec<AttachmentRequest>,
    /// Attachments to detach
    pub detach: Vec<Uuid>,
    /// Worn clothing to take off
    pub rem_outfit: Vec<Uuid>,
}

impl ForceResolution {
    /// Whether nothing needs to happen
    pub fn is_empty(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty() && self.rem_outfit.is_empty()
    }
}

/// How attached items treat whatever already occupies their point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachMode {
    /// Replace, unless a `+` folder makes it additive
    Replace,
    /// Always add
    Over,
    /// Add inside `+` folders, replace elsewhere
    OverOrReplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Option is a folder path
    Path,
    /// Option is a selector, or absent for the sender's own folder
    This,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForceKind {
    Attach {
        mode: AttachMode,
        scope: Scope,
        recursive: bool,
    },
    DetachFolder {
        scope: Scope,
        recursive: bool,
    },
    DetachPoint,
    DetachMe,
    RemOutfit,
}

impl ForceKind {
    fn of(command: RlvCommand) -> Option<Self> {
        use AttachMode::*;
        use RlvCommand as C;

        let attach = |mode, scope, recursive| ForceKind::Attach {
            mode,
            scope,
            recursive,
        };
        Some(match command {
            C::Attach => attach(Replace, Scope::Path, false),
            C::AttachOver => attach(Over, Scope::Path, false),
            C::AttachOverOrReplace => attach(OverOrReplace, Scope::Path, false),
            C::AttachAll => attach(Replace, Scope::Path, true),
            C::AttachAllOver => attach(Over, Scope::Path, true),
            C::AttachAllOverOrReplace => attach(OverOrReplace, Scope::Path, true),
            C::AttachThis => attach(Replace, Scope::This, false),
            C::AttachThisOver => attach(Over, Scope::This, false),
            C::AttachThisOverOrReplace => attach(OverOrReplace, Scope::This, false),
            C::AttachAllThis => attach(Replace, Scope::This, true),
            C::AttachAllThisOver => attach(Over, Scope::This, true),
            C::AttachAllThisOverOrReplace => attach(OverOrReplace, Scope::This, true),
            C::DetachAll => ForceKind::DetachFolder {
                scope: Scope::Path,
                recursive: true,
            },
            C::DetachThis => ForceKind::DetachFolder {
                scope: Scope::This,
                recursive: false,
            },
            C::DetachAllThis => ForceKind::DetachFolder {
                scope: Scope::This,
                recursive: true,
            },
            C::Detach | C::RemAttach => ForceKind::DetachPoint,
            C::DetachMe => ForceKind::DetachMe,
            C::RemOutfit => ForceKind::RemOutfit,
            _ => return None,
        })
    }
}

/// Resolves force commands against one inventory and outfit snapshot
#[derive(Debug, Clone, Copy)]
pub struct ForceResolver<'a> {
    tree: Option<&'a InventoryTree>,
    outfit: &'a [InventoryItem],
}

impl<'a> ForceResolver<'a> {
    /// Create a resolver. `tree` is `None` when no shared folder is available.
    pub fn new(tree: Option<&'a InventoryTree>, outfit: &'a [InventoryItem]) -> Self {
        Self { tree, outfit }
    }

    /// Whether `command` is resolved into inventory batches
    pub fn handles(command: RlvCommand) -> bool {
        ForceKind::of(command).is_some()
    }

    /// Resolve a force command issued by `sender`
    pub fn resolve(
        &self,
        command: RlvCommand,
        option: Option<&str>,
        sender: Uuid,
    ) -> ForceResolution {
        let option = option.map(str::trim).filter(|o| !o.is_empty());
        let mut resolution = ForceResolution::default();
        let Some(kind) = ForceKind::of(command) else {
            return resolution;
        };

        match kind {
            ForceKind::Attach {
                mode,
                scope,
                recursive,
            } => {
                for item in self.candidates(scope, recursive, option, sender) {
                    if item.is_worn() {
                        continue;
                    }
                    resolution.attach.push(AttachmentRequest {
                        item_id: item.id,
                        attachment_point: self.attach_point(item),
                        replace_existing: match mode {
                            AttachMode::Over => false,
                            AttachMode::Replace | AttachMode::OverOrReplace => {
                                !self.is_additive(item)
                            }
                        },
                    });
                }
            }
            ForceKind::DetachFolder { scope, recursive } => {
                let items = self.candidates(scope, recursive, option, sender);
                push_removals(&mut resolution, items);
            }
            ForceKind::DetachPoint => {
                let items = self.detach_candidates(option);
                push_removals(&mut resolution, items);
            }
            ForceKind::DetachMe => {
                let own = self
                    .worn_items()
                    .into_iter()
                    .filter(|i| i.attached_prim_id == Some(sender))
                    .collect();
                push_removals(&mut resolution, own);
            }
            ForceKind::RemOutfit => {
                let items = self
                    .remoutfit_candidates(option)
                    .into_iter()
                    .filter(|i| i.worn_on.is_some())
                    .collect();
                push_removals(&mut resolution, items);
            }
        }

        debug!(
            "[ForceResolver] {} resolved to {} attach, {} detach, {} remoutfit",
            command,
            resolution.attach.len(),
            resolution.detach.len(),
            resolution.rem_outfit.len()
        );
        resolution
    }

    /// Item tag, then nearest folder tag, then the item's default point
    fn attach_point(&self, item: &InventoryItem) -> Option<AttachmentPoint> {
        item.attach_point_in(self.tree)
    }

    fn is_additive(&self, item: &InventoryItem) -> bool {
        self.tree
            .map(|t| t.is_additive_scope(item.folder_id))
            .unwrap_or(false)
    }

    /// An item known to the shared tree or the current outfit
    fn known_item(&self, id: Uuid) -> Option<&'a InventoryItem> {
        self.tree
            .and_then(|t| t.find_item(id))
            .or_else(|| self.outfit.iter().find(|i| i.id == id))
    }

    /// Worn items from the outfit, then worn tree items the outfit missed
    fn worn_items(&self) -> Vec<&'a InventoryItem> {
        let mut seen = HashSet::new();
        let tree_items = self.tree.into_iter().flat_map(|t| t.items());
        self.outfit
            .iter()
            .chain(tree_items)
            .filter(|i| i.is_worn() && seen.insert(i.id))
            .collect()
    }

    fn folder_items(&self, folders: Vec<Uuid>, recursive: bool) -> Vec<&'a InventoryItem> {
        let Some(tree) = self.tree else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let scope: Vec<Uuid> = if recursive {
            folders.into_iter().flat_map(|f| tree.subtree(f)).collect()
        } else {
            folders
        };
        scope
            .into_iter()
            .filter(|f| seen.insert(*f))
            .filter_map(|f| tree.folder(f))
            .flat_map(|f| f.items.iter())
            .collect()
    }

    fn candidates(
        &self,
        scope: Scope,
        recursive: bool,
        option: Option<&str>,
        sender: Uuid,
    ) -> Vec<&'a InventoryItem> {
        let Some(tree) = self.tree else {
            return self.item_by_text(option);
        };

        let folders = match (scope, option) {
            (Scope::Path, None) => Vec::new(),
            (Scope::Path, Some(path)) => match tree.resolve_path(path, true) {
                Some(folder) if folder.id != tree.root_id() => vec![folder.id],
                _ => return self.item_by_text(option),
            },
            (Scope::This, None) => tree.sender_folder(sender).into_iter().collect(),
            (Scope::This, Some(text)) => match tree.parse_selector(text) {
                Some(Selector::Folder(id)) => vec![id],
                Some(Selector::Point(point)) => tree.folders_with_attached(point),
                Some(Selector::Layer(layer)) => tree.folders_with_worn(layer),
                Some(Selector::Item(id)) => return self.known_item(id).into_iter().collect(),
                None => Vec::new(),
            },
        };
        self.folder_items(folders, recursive)
    }

    fn item_by_text(&self, option: Option<&str>) -> Vec<&'a InventoryItem> {
        option
            .and_then(|o| Uuid::parse_str(o).ok())
            .and_then(|id| self.known_item(id))
            .into_iter()
            .collect()
    }

    /// `detach[:point|path|uuid]`
    fn detach_candidates(&self, option: Option<&str>) -> Vec<&'a InventoryItem> {
        let worn = self.worn_items();
        let Some(text) = option else {
            return worn.into_iter().filter(|i| i.attached_to.is_some()).collect();
        };

        let selector = match self.tree {
            Some(tree) => tree.parse_selector(text),
            None => AttachmentPoint::from_name(text)
                .map(Selector::Point)
                .or_else(|| Uuid::parse_str(text).ok().map(Selector::Item)),
        };
        match selector {
            Some(Selector::Point(point)) => worn
                .into_iter()
                .filter(|i| i.attached_to == Some(point))
                .collect(),
            Some(Selector::Folder(id)) => self.folder_items(vec![id], false),
            Some(Selector::Item(id)) => self.known_item(id).into_iter().collect(),
            Some(Selector::Layer(_)) | None => Vec::new(),
        }
    }

    /// `remoutfit[:layer|path|uuid]`
    fn remoutfit_candidates(&self, option: Option<&str>) -> Vec<&'a InventoryItem> {
        let worn = self.worn_items();
        let Some(text) = option else {
            return worn;
        };

        let selector = match self.tree {
            Some(tree) => tree.parse_selector(text),
            None => WearableType::from_name(text)
                .map(Selector::Layer)
                .or_else(|| Uuid::parse_str(text).ok().map(Selector::Item)),
        };
        match selector {
            Some(Selector::Layer(layer)) => worn
                .into_iter()
                .filter(|i| i.worn_on == Some(layer))
                .collect(),
            Some(Selector::Folder(id)) => self.folder_items(vec![id], false),
            Some(Selector::Item(id)) => self.known_item(id).into_iter().collect(),
            Some(Selector::Point(_)) | None => Vec::new(),
        }
    }
}

/// Split worn candidates into detach and remoutfit batches; body parts stay on
fn push_removals(resolution: &mut ForceResolution, items: Vec<&InventoryItem>) {
    for item in items {
        if item.attached_to.is_some() {
            if !resolution.detach.contains(&item.id) {
                resolution.detach.push(item.id);
            }
        } else if item.worn_on.is_some() && !item.is_body_part() {
            if !resolution.rem_outfit.contains(&item.id) {
                resolution.rem_outfit.push(item.id);
            }
        }
    }
}
