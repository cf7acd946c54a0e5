//! Folder selectors
//!
//! Commands address shared folders either implicitly (the folder holding the
//! issuing object) or through a selector that is tried as a folder path, then
//! an attachment point, then a wearable type, then an item id.

use uuid::Uuid;

use super::tree::InventoryTree;
use crate::core::{AttachmentPoint, WearableType};

/// How a selector string was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Explicit folder path
    Folder(Uuid),
    /// Attachment point name
    Point(AttachmentPoint),
    /// Wearable type name
    Layer(WearableType),
    /// Inventory item id
    Item(Uuid),
}

impl InventoryTree {
    /// Interpret `text` against this tree.
    ///
    /// Private folders resolve here since the path is explicit.
    pub fn parse_selector(&self, text: &str) -> Option<Selector> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(folder) = self.resolve_path(text, true) {
            if folder.id != self.root_id() {
                return Some(Selector::Folder(folder.id));
            }
        }
        if let Some(point) = AttachmentPoint::from_name(text) {
            return Some(Selector::Point(point));
        }
        if let Some(layer) = WearableType::from_name(text) {
            return Some(Selector::Layer(layer));
        }
        Uuid::parse_str(text).ok().map(Selector::Item)
    }

    /// Folders addressed by a selector, in tree order
    pub fn select_folders(&self, text: &str) -> Vec<Uuid> {
        match self.parse_selector(text) {
            Some(Selector::Folder(id)) => vec![id],
            Some(Selector::Point(point)) => self.folders_with_attached(point),
            Some(Selector::Layer(layer)) => self.folders_with_worn(layer),
            Some(Selector::Item(item)) => self
                .find_item(item)
                .map(|i| vec![i.folder_id])
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Folder holding the attachment rezzed as `sender`
    pub fn sender_folder(&self, sender: Uuid) -> Option<Uuid> {
        self.find_item_by_prim(sender).map(|i| i.folder_id)
    }

    /// Folders addressed by an optional selector, falling back to the sender's folder
    pub fn target_folders(&self, selector: Option<&str>, sender: Uuid) -> Vec<Uuid> {
        match selector {
            Some(text) => self.select_folders(text),
            None => self.sender_folder(sender).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryItem;

    #[test]
    fn test_selector_precedence() {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let spine_folder = tree.add_folder(root, "spine").unwrap();
        let hats = tree.add_folder(root, "Hats").unwrap();
        let prim = Uuid::new_v4();
        let hat = InventoryItem::object(Uuid::new_v4(), "Top Hat")
            .attached(AttachmentPoint::Skull, prim);
        let hat_id = hat.id;
        tree.add_item(hats, hat);

        assert_eq!(tree.parse_selector("spine"), Some(Selector::Folder(spine_folder)));
        assert_eq!(tree.select_folders("skull"), vec![hats]);
        assert_eq!(tree.select_folders(&hat_id.to_string()), vec![hats]);
        assert!(tree.select_folders("shirt").is_empty());
        assert!(tree.select_folders("Nowhere").is_empty());

        assert_eq!(tree.target_folders(None, prim), vec![hats]);
        assert!(tree.target_folders(None, Uuid::new_v4()).is_empty());
    }
}
