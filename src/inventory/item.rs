//! Inventory items

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::name;
use super::tree::InventoryTree;
use crate::core::{AttachmentPoint, WearableType};

/// A single inventory item inside a shared folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Inventory item id
    pub id: Uuid,
    /// Display name, may carry a `(point)` tag
    pub name: String,
    /// Folder that directly contains this item
    #[serde(default = "Uuid::nil")]
    pub folder_id: Uuid,
    /// Attachment point the item is currently attached to
    #[serde(default)]
    pub attached_to: Option<AttachmentPoint>,
    /// In-world object id of the attachment while attached
    #[serde(default)]
    pub attached_prim_id: Option<Uuid>,
    /// Layer the item is currently worn on
    #[serde(default)]
    pub worn_on: Option<WearableType>,
    /// Point the item attaches to when nothing else says otherwise
    #[serde(default)]
    pub default_attach_point: Option<AttachmentPoint>,
    /// Declared clothing layer; `Some` marks a wearable rather than an attachment
    #[serde(default)]
    pub wearable_type: Option<WearableType>,
}

impl InventoryItem {
    /// Create an attachable object item
    pub fn object(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            folder_id: Uuid::nil(),
            attached_to: None,
            attached_prim_id: None,
            worn_on: None,
            default_attach_point: None,
            wearable_type: None,
        }
    }

    /// Create a clothing/body-part item
    pub fn wearable(id: Uuid, name: impl Into<String>, kind: WearableType) -> Self {
        Self {
            wearable_type: Some(kind),
            ..Self::object(id, name)
        }
    }

    /// Mark the item as attached to `point`, rezzed as `prim_id`
    pub fn attached(mut self, point: AttachmentPoint, prim_id: Uuid) -> Self {
        self.attached_to = Some(point);
        self.attached_prim_id = Some(prim_id);
        self
    }

    /// Mark a wearable as currently worn on its declared layer
    pub fn worn(mut self) -> Self {
        self.worn_on = self.wearable_type;
        self
    }

    /// Set the point used when neither name nor folder carries a tag
    pub fn with_default_point(mut self, point: AttachmentPoint) -> Self {
        self.default_attach_point = Some(point);
        self
    }

    /// Point this object goes to when no explicit point is requested.
    ///
    /// The name tag wins over the nearest folder tag, which wins over the
    /// default point. Wearables have none.
    pub fn attach_point_in(&self, tree: Option<&InventoryTree>) -> Option<AttachmentPoint> {
        if self.is_wearable() {
            return None;
        }
        name::point_tag(&self.name)
            .or_else(|| tree.and_then(|t| t.folder_point_tag(self.folder_id)))
            .or(self.default_attach_point)
    }

    /// Whether the item is attached or worn
    pub fn is_worn(&self) -> bool {
        self.attached_to.is_some() || self.worn_on.is_some()
    }

    /// Whether the item is clothing or a body part
    pub fn is_wearable(&self) -> bool {
        self.wearable_type.is_some() || self.worn_on.is_some()
    }

    /// Whether removing this item would strip a body part
    pub fn is_body_part(&self) -> bool {
        self.worn_on
            .or(self.wearable_type)
            .map(|w| w.is_body_part())
            .unwrap_or(false)
    }
}
