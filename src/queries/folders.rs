//! Shared folder replies: getinv, getinvworn, getpath(new), findfolder(s)

use uuid::Uuid;

use crate::inventory::{name, InventoryTree, SharedFolder};

/// Worn status of a set of items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WornStatus {
    /// No items
    Empty = 0,
    /// Items, none worn
    NoneWorn = 1,
    /// Items, some worn
    SomeWorn = 2,
    /// Items, all worn
    AllWorn = 3,
}

impl WornStatus {
    fn from_counts(total: usize, worn: usize) -> Self {
        match (total, worn) {
            (0, _) => WornStatus::Empty,
            (_, 0) => WornStatus::NoneWorn,
            (t, w) if t == w => WornStatus::AllWorn,
            _ => WornStatus::SomeWorn,
        }
    }

    /// Reply digit
    pub fn digit(self) -> char {
        char::from(b'0' + self as u8)
    }
}

fn counts(folder: &SharedFolder) -> (usize, usize) {
    let worn = folder.items.iter().filter(|i| i.is_worn()).count();
    (folder.items.len(), worn)
}

/// `XY` code of a folder: direct items, then the folder with its descendants
pub fn worn_code(tree: &InventoryTree, folder: &SharedFolder) -> String {
    let (total, worn) = counts(folder);
    let (deep_total, deep_worn) = tree
        .subtree(folder.id)
        .into_iter()
        .filter_map(|id| tree.folder(id))
        .map(counts)
        .fold((0, 0), |(t, w), (ft, fw)| (t + ft, w + fw));

    [
        WornStatus::from_counts(total, worn).digit(),
        WornStatus::from_counts(deep_total, deep_worn).digit(),
    ]
    .iter()
    .collect()
}

fn resolve<'t>(tree: &'t InventoryTree, path: Option<&str>) -> Option<&'t SharedFolder> {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => tree.resolve_path(p, false),
        None => tree.root(),
    }
}

fn visible_children<'t>(
    tree: &'t InventoryTree,
    folder: &SharedFolder,
) -> impl Iterator<Item = &'t SharedFolder> {
    tree.children(folder.id).filter(|c| !c.is_private())
}

/// `getinv[:path]`: non-private child folder names, comma-joined
pub fn get_inv(tree: &InventoryTree, path: Option<&str>) -> String {
    resolve(tree, path)
        .map(|folder| {
            visible_children(tree, folder)
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

/// `getinvworn[:path]`: `|XY,child|XY,...`
pub fn get_inv_worn(tree: &InventoryTree, path: Option<&str>) -> String {
    let Some(folder) = resolve(tree, path) else {
        return String::new();
    };

    let mut parts = vec![format!("|{}", worn_code(tree, folder))];
    parts.extend(
        visible_children(tree, folder).map(|c| format!("{}|{}", c.name, worn_code(tree, c))),
    );
    parts.join(",")
}

/// Root-relative paths of the folders a selector (or the sender) addresses
pub fn get_paths(tree: &InventoryTree, selector: Option<&str>, sender: Uuid) -> Vec<String> {
    let selector = selector.map(str::trim).filter(|s| !s.is_empty());
    tree.target_folders(selector, sender)
        .into_iter()
        .map(|id| tree.path_of(id))
        .collect()
}

/// Parsed `findfolder` option: `term1[&&term2...][;separator]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSearch {
    /// Lowercased terms; every one must match
    pub terms: Vec<String>,
    /// Separator for `findfolders`
    pub separator: String,
}

impl FolderSearch {
    /// Parse a search option
    pub fn parse(option: &str) -> Self {
        let (terms, separator) = match option.split_once(';') {
            Some((t, s)) if !s.is_empty() => (t, s.to_string()),
            Some((t, _)) => (t, ",".to_string()),
            None => (option, ",".to_string()),
        };
        Self {
            terms: terms
                .split("&&")
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            separator,
        }
    }

    fn matches(&self, folder: &SharedFolder) -> bool {
        let name = name::strip_ignored(&folder.name).to_lowercase();
        !self.terms.is_empty() && self.terms.iter().all(|t| name.contains(t.as_str()))
    }

    /// Paths of every matching folder, shallowest first
    pub fn run(&self, tree: &InventoryTree) -> Vec<String> {
        tree.breadth_first()
            .into_iter()
            .filter(|f| self.matches(f))
            .map(|f| tree.path_of(f.id))
            .collect()
    }
}

/// `findfolder:terms`: path of the shallowest match
pub fn find_folder(tree: &InventoryTree, option: &str) -> String {
    FolderSearch::parse(option)
        .run(tree)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// `findfolders:terms[;sep]`: every match joined by the separator
pub fn find_folders(tree: &InventoryTree, option: &str) -> String {
    let search = FolderSearch::parse(option);
    search.run(tree).join(&search.separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttachmentPoint, WearableType};
    use crate::inventory::InventoryItem;

    fn worn(name: &str) -> InventoryItem {
        InventoryItem::object(Uuid::new_v4(), name).attached(AttachmentPoint::Chest, Uuid::new_v4())
    }

    //  #RLV
    //  ├── Outfit          a (worn)
    //  │   ├── Top         b (worn)
    //  │   └── Bottom      c (worn), d (worn)
    //  ├── .private
    //  └── ~Hats
    //      └── Sub Hats
    fn tree() -> (InventoryTree, Uuid, Uuid) {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let outfit = tree.add_folder(root, "Outfit").unwrap();
        let top = tree.add_folder(outfit, "Top").unwrap();
        let bottom = tree.add_folder(outfit, "Bottom").unwrap();
        tree.add_folder(root, ".private").unwrap();
        let hats = tree.add_folder(root, "~Hats").unwrap();
        tree.add_folder(hats, "Sub Hats").unwrap();

        tree.add_item(outfit, worn("a"));
        tree.add_item(top, worn("b"));
        tree.add_item(bottom, worn("c"));
        tree.add_item(bottom, worn("d"));
        (tree, outfit, bottom)
    }

    #[test]
    fn test_get_inv() {
        let (tree, _, _) = tree();
        assert_eq!(get_inv(&tree, None), "Outfit,~Hats");
        assert_eq!(get_inv(&tree, Some("Outfit")), "Top,Bottom");
        assert_eq!(get_inv(&tree, Some("Hats")), "Sub Hats");
        assert_eq!(get_inv(&tree, Some(".private")), "");
        assert_eq!(get_inv(&tree, Some("Missing")), "");
    }

    #[test]
    fn test_get_inv_worn_all_worn() {
        let (tree, _, _) = tree();
        assert_eq!(get_inv_worn(&tree, Some("Outfit")), "|33,Top|33,Bottom|33");
    }

    #[test]
    fn test_get_inv_worn_partial_leaf() {
        let (mut tree, _, bottom) = tree();
        tree.add_item(bottom, InventoryItem::object(Uuid::new_v4(), "e"));
        assert_eq!(get_inv_worn(&tree, Some("Outfit")), "|32,Top|33,Bottom|22");
    }

    #[test]
    fn test_additive_folder_matches_without_marker() {
        let (mut tree, _, _) = tree();
        let root = tree.root_id();
        let jewelry = tree.add_folder(root, "+Jewelry").unwrap();
        tree.add_folder(jewelry, "Rings").unwrap();
        tree.add_item(jewelry, worn("Necklace"));
        tree.add_item(jewelry, InventoryItem::object(Uuid::new_v4(), "Anklet"));

        assert_eq!(get_inv(&tree, Some("Jewelry")), "Rings");
        assert_eq!(get_inv_worn(&tree, Some("Jewelry")), "|22,Rings|00");
        assert_eq!(get_inv_worn(&tree, Some("+Jewelry")), "|22,Rings|00");
    }

    #[test]
    fn test_tree_without_root_replies_empty() {
        let json = format!("{{\"root\":\"{}\",\"folders\":{{}}}}", Uuid::new_v4());
        let tree: InventoryTree = serde_json::from_str(&json).unwrap();
        assert_eq!(get_inv(&tree, None), "");
        assert_eq!(get_inv_worn(&tree, Some("Outfit")), "");
        assert_eq!(find_folder(&tree, "o"), "");
    }

    #[test]
    fn test_get_inv_worn_root_and_empty() {
        let (tree, _, _) = tree();
        assert_eq!(get_inv_worn(&tree, None), "|03,Outfit|33,~Hats|00");
    }

    #[test]
    fn test_worn_codes_for_wearables() {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let clothes = tree.add_folder(root, "Clothes").unwrap();
        tree.add_item(
            clothes,
            InventoryItem::wearable(Uuid::new_v4(), "Shirt", WearableType::Shirt),
        );
        assert_eq!(get_inv_worn(&tree, Some("Clothes")), "|11");
    }

    #[test]
    fn test_find_folder_prefers_shallow() {
        let (tree, _, _) = tree();
        assert_eq!(find_folder(&tree, "at"), "~Hats");
        assert_eq!(find_folder(&tree, "at&&ub"), "~Hats/Sub Hats");
        assert_eq!(find_folder(&tree, "HATS"), "~Hats");
        assert_eq!(find_folder(&tree, "priv"), "");
        assert_eq!(find_folders(&tree, "o"), "Outfit,Outfit/Top,Outfit/Bottom");
        assert_eq!(find_folders(&tree, "t;|"), "Outfit|~Hats|Outfit/Top|Outfit/Bottom|~Hats/Sub Hats");
    }

    #[test]
    fn test_search_parse() {
        let search = FolderSearch::parse("Red&&Dress;|");
        assert_eq!(search.terms, vec!["red", "dress"]);
        assert_eq!(search.separator, "|");
        assert_eq!(FolderSearch::parse("x;").separator, ",");
    }

    #[test]
    fn test_get_paths() {
        let (tree, _, _) = tree();
        let sender = Uuid::new_v4();
        assert_eq!(get_paths(&tree, Some("chest"), sender).len(), 3);
        assert_eq!(get_paths(&tree, Some("Outfit/Top"), sender), vec!["Outfit/Top"]);
        assert!(get_paths(&tree, None, sender).is_empty());
    }

    #[test]
    fn test_get_paths_skips_private_folders() {
        let (mut tree, _, _) = tree();
        let root = tree.root_id();
        let secret = tree.add_folder(root, ".secret").unwrap();
        tree.add_item(
            secret,
            InventoryItem::object(Uuid::new_v4(), "Hat").attached(AttachmentPoint::Skull, Uuid::new_v4()),
        );
        tree.add_item(secret, InventoryItem::object(Uuid::new_v4(), "Spare"));

        assert!(get_paths(&tree, Some("skull"), Uuid::new_v4()).is_empty());
        assert_eq!(get_paths(&tree, Some(".secret"), Uuid::new_v4()), vec![".secret"]);
    }
}
