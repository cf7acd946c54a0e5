//! Shared folder tree
//!
//! The host supplies a fresh `InventoryTree` per query. Folders live in an
//! arena keyed by id; children are id lists and the parent link is a plain id,
//! so the tree has no ownership cycles.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::InventoryItem;
use super::name;
use crate::core::{AttachmentPoint, WearableType};

/// A folder of the shared (`#RLV`) inventory subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedFolder {
    /// Folder id
    pub id: Uuid,
    /// Folder name including any `.`/`~`/`+` markers
    pub name: String,
    /// Parent folder id (`None` for the root)
    pub parent: Option<Uuid>,
    /// Child folder ids in display order
    pub children: Vec<Uuid>,
    /// Items directly inside this folder
    pub items: Vec<InventoryItem>,
}

impl SharedFolder {
    fn new(id: Uuid, name: String, parent: Option<Uuid>) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Whether the folder is private (`.` prefix)
    pub fn is_private(&self) -> bool {
        name::is_private(&self.name)
    }

    /// Whether the folder is additive (`+` prefix)
    pub fn is_additive(&self) -> bool {
        name::is_additive(&self.name)
    }
}

/// Arena of shared folders rooted at the `#RLV` folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTree {
    root: Uuid,
    folders: HashMap<Uuid, SharedFolder>,
}

impl InventoryTree {
    /// Create a tree holding only the root folder
    pub fn new(root_id: Uuid, root_name: impl Into<String>) -> Self {
        let mut folders = HashMap::new();
        folders.insert(root_id, SharedFolder::new(root_id, root_name.into(), None));
        Self {
            root: root_id,
            folders,
        }
    }

    /// Add a folder with a fresh id under `parent`
    ///
    /// Returns `None` if the parent does not exist.
    pub fn add_folder(&mut self, parent: Uuid, name: impl Into<String>) -> Option<Uuid> {
        self.add_folder_with_id(parent, Uuid::new_v4(), name)
    }

    /// Add a folder with a known id under `parent`
    pub fn add_folder_with_id(
        &mut self,
        parent: Uuid,
        id: Uuid,
        name: impl Into<String>,
    ) -> Option<Uuid> {
        if self.folders.contains_key(&id) {
            return None;
        }
        let parent_folder = self.folders.get_mut(&parent)?;
        parent_folder.children.push(id);
        self.folders
            .insert(id, SharedFolder::new(id, name.into(), Some(parent)));
        Some(id)
    }

    /// Place an item into `folder`, overwriting its `folder_id`
    pub fn add_item(&mut self, folder: Uuid, mut item: InventoryItem) -> bool {
        match self.folders.get_mut(&folder) {
            Some(f) => {
                item.folder_id = folder;
                f.items.push(item);
                true
            }
            None => false,
        }
    }

    /// The root folder; `None` for a host tree that omits it
    pub fn root(&self) -> Option<&SharedFolder> {
        self.folders.get(&self.root)
    }

    /// Root folder id
    pub fn root_id(&self) -> Uuid {
        self.root
    }

    /// Look up a folder by id
    pub fn folder(&self, id: Uuid) -> Option<&SharedFolder> {
        self.folders.get(&id)
    }

    /// Child folders of `id` in order
    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &SharedFolder> {
        self.folders
            .get(&id)
            .map(|f| f.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.folders.get(c))
    }

    /// `id` followed by each ancestor up to and including the root
    pub fn ancestors(&self, id: Uuid) -> Vec<&SharedFolder> {
        let mut chain = Vec::new();
        let mut current = self.folders.get(&id);
        while let Some(folder) = current {
            chain.push(folder);
            current = folder.parent.and_then(|p| self.folders.get(&p));
        }
        chain
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self, id: Uuid) -> usize {
        self.ancestors(id).len().saturating_sub(1)
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: Uuid, id: Uuid) -> bool {
        self.ancestors(id).iter().any(|f| f.id == ancestor)
    }

    /// Root-relative path of a folder; the root itself is `""`
    pub fn path_of(&self, id: Uuid) -> String {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .iter()
            .filter(|f| f.id != self.root)
            .map(|f| f.name.as_str())
            .collect();
        segments.reverse();
        segments.join("/")
    }

    /// Resolve a `/`-separated path from the root.
    ///
    /// Segments match case-sensitively with `~`/`+` markers ignored. Private
    /// folders only resolve when `allow_private` is set.
    pub fn resolve_path(&self, path: &str, allow_private: bool) -> Option<&SharedFolder> {
        let mut current = self.root()?;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let next = self
                .children(current.id)
                .find(|c| c.name == segment)
                .or_else(|| {
                    self.children(current.id)
                        .find(|c| name::matches_segment(&c.name, segment))
                })?;
            if next.is_private() && !allow_private {
                return None;
            }
            current = next;
        }
        Some(current)
    }

    /// `id` and its descendants in pre-order, never entering a private folder
    pub fn subtree(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        if self.folders.contains_key(&id) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    fn collect_subtree(&self, id: Uuid, out: &mut Vec<Uuid>) {
        out.push(id);
        for child in self.children(id) {
            if !child.is_private() {
                self.collect_subtree(child.id, out);
            }
        }
    }

    /// Non-private folders below the root, breadth-first
    pub fn breadth_first(&self) -> Vec<&SharedFolder> {
        let mut out = Vec::new();
        let mut queue: VecDeque<Uuid> = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            for child in self.children(id) {
                if child.is_private() {
                    continue;
                }
                out.push(child);
                queue.push_back(child.id);
            }
        }
        out
    }

    /// Every folder id including private folders and the root
    pub fn folder_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.folders.keys().copied()
    }

    /// Every item in the tree
    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.folders.values().flat_map(|f| f.items.iter())
    }

    /// Find an item by inventory id
    pub fn find_item(&self, item_id: Uuid) -> Option<&InventoryItem> {
        self.items().find(|i| i.id == item_id)
    }

    /// Find the attached item rezzed as `prim_id`
    pub fn find_item_by_prim(&self, prim_id: Uuid) -> Option<&InventoryItem> {
        self.items().find(|i| i.attached_prim_id == Some(prim_id))
    }

    /// Non-private folders holding an item attached to `point`, in tree order
    pub fn folders_with_attached(&self, point: AttachmentPoint) -> Vec<Uuid> {
        self.folders_where(|i| i.attached_to == Some(point))
    }

    /// Non-private folders holding an item worn on `layer`, in tree order
    pub fn folders_with_worn(&self, layer: WearableType) -> Vec<Uuid> {
        self.folders_where(|i| i.worn_on == Some(layer))
    }

    fn folders_where(&self, predicate: impl Fn(&InventoryItem) -> bool) -> Vec<Uuid> {
        self.subtree(self.root)
            .into_iter()
            .filter(|id| {
                self.folders
                    .get(id)
                    .map(|f| f.items.iter().any(&predicate))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Nearest point tag on `folder` or its ancestors
    pub fn folder_point_tag(&self, folder: Uuid) -> Option<AttachmentPoint> {
        self.ancestors(folder)
            .iter()
            .find_map(|f| name::point_tag(&f.name))
    }

    /// Whether the nearest enclosing `+` folder governs items in `folder`
    pub fn is_additive_scope(&self, folder: Uuid) -> bool {
        self.ancestors(folder).iter().any(|f| f.is_additive())
    }

    /// Number of folders including the root
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the tree holds no folders at all
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
