//! Inventory model
//!
//! The shared-folder tree and its items as supplied by the host. This layer
//! has no logic beyond lookups and the folder naming conventions.

mod item;
pub mod name;
mod selector;
mod tree;

pub use item::InventoryItem;
pub use selector::Selector;
pub use tree::{InventoryTree, SharedFolder};
