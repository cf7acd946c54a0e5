//! Attach, detach and outfit checks
//!
//! Point and layer restrictions, the shared/unshared wear families and the
//! folder locks all have to agree before an item may go on or come off.

use super::evaluator::PermissionEvaluator;
use crate::command::RlvCommand;
use crate::core::{AttachmentPoint, WearableType};
use crate::inventory::InventoryItem;
use crate::locks::FolderLocks;

impl PermissionEvaluator<'_> {
    /// Whether `command` restricts `scope`, either blanket or scoped to it
    fn scoped(&self, command: RlvCommand, scope: &str) -> bool {
        self.store
            .query(command)
            .iter()
            .any(|r| r.param.as_deref().map_or(true, |p| p == scope))
    }

    /// Whether `@detach:<point>=n` locks the point
    fn point_locked(&self, point: AttachmentPoint) -> bool {
        self.store
            .query(RlvCommand::Detach)
            .iter()
            .any(|r| r.param.as_deref() == Some(point.name()))
    }

    /// Whether something may be attached to `point`
    pub fn can_attach_point(&self, point: AttachmentPoint) -> bool {
        !self.scoped(RlvCommand::AddAttach, point.name()) && !self.point_locked(point)
    }

    /// Whether whatever is on `point` may be detached
    pub fn can_detach_point(&self, point: AttachmentPoint) -> bool {
        !self.scoped(RlvCommand::RemAttach, point.name()) && !self.point_locked(point)
    }

    /// Whether clothing may be put on `layer`
    pub fn can_add_outfit(&self, layer: WearableType) -> bool {
        !self.scoped(RlvCommand::AddOutfit, layer.name())
    }

    /// Whether clothing on `layer` may be taken off; body parts never can
    pub fn can_remove_outfit(&self, layer: WearableType) -> bool {
        !layer.is_body_part() && !self.scoped(RlvCommand::RemOutfit, layer.name())
    }

    /// Whether `item` may be attached (to `point`, if given) or worn.
    ///
    /// Without `point` the item's name tag or default point is checked; pass
    /// the folder-tag point explicitly when the tree is known.
    pub fn can_attach_item(
        &self,
        item: &InventoryItem,
        point: Option<AttachmentPoint>,
        locks: &FolderLocks,
    ) -> bool {
        if item.is_wearable() {
            if let Some(layer) = item.wearable_type.or(item.worn_on) {
                if !self.can_add_outfit(layer) {
                    return false;
                }
            }
        } else {
            match point.or_else(|| item.attach_point_in(None)) {
                Some(point) => {
                    if !self.can_attach_point(point) {
                        return false;
                    }
                }
                None => {
                    if self
                        .store
                        .query(RlvCommand::AddAttach)
                        .iter()
                        .any(|r| r.param.is_none())
                    {
                        return false;
                    }
                }
            }
        }

        if locks.is_shared(item.folder_id) {
            !self.store.has(RlvCommand::SharedWear) && locks.can_attach(item.folder_id)
        } else {
            !self.store.has(RlvCommand::UnsharedWear)
        }
    }

    /// Whether `item` may be detached or taken off
    pub fn can_detach_item(&self, item: &InventoryItem, locks: &FolderLocks) -> bool {
        if item.is_wearable() {
            if let Some(layer) = item.worn_on.or(item.wearable_type) {
                if !self.can_remove_outfit(layer) {
                    return false;
                }
            }
        } else {
            if let Some(prim) = item.attached_prim_id {
                let self_locked = self
                    .store
                    .query(RlvCommand::Detach)
                    .iter()
                    .any(|r| r.param.is_none() && r.sender == prim);
                if self_locked {
                    return false;
                }
            }
            match item.attached_to {
                Some(point) => {
                    if !self.can_detach_point(point) {
                        return false;
                    }
                }
                None => {
                    if self
                        .store
                        .query(RlvCommand::RemAttach)
                        .iter()
                        .any(|r| r.param.is_none())
                    {
                        return false;
                    }
                }
            }
        }

        if locks.is_shared(item.folder_id) {
            !self.store.has(RlvCommand::SharedUnwear) && locks.can_detach(item.folder_id)
        } else {
            !self.store.has(RlvCommand::UnsharedUnwear)
        }
    }
}
