//! Inventory, editing, touch, display and avatar-state checks

use uuid::Uuid;

use super::evaluator::PermissionEvaluator;
use crate::command::{RlvCommand, DEFAULT_TOUCH_DISTANCE};

/// What kind of object is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// An object rezzed in-world
    World,
    /// An attachment
    Attachment,
}

/// What kind of object is being touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTarget {
    /// An object rezzed in-world
    World,
    /// One of the avatar's own attachments
    OwnAttachment,
    /// An attachment worn by another avatar
    OtherAttachment(Uuid),
    /// One of the avatar's HUD attachments
    Hud,
}

/// Where hover text is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTextLocation {
    /// Over an in-world object
    World,
    /// On a HUD
    Hud,
}

impl PermissionEvaluator<'_> {
    /// Whether the inventory window may be opened
    pub fn can_show_inventory(&self) -> bool {
        !self.store.has(RlvCommand::ShowInv)
    }

    /// Whether notecards may be opened
    pub fn can_view_note(&self) -> bool {
        !self.store.has(RlvCommand::ViewNote)
    }

    /// Whether scripts may be opened
    pub fn can_view_script(&self) -> bool {
        !self.store.has(RlvCommand::ViewScript)
    }

    /// Whether textures may be opened
    pub fn can_view_texture(&self) -> bool {
        !self.store.has(RlvCommand::ViewTexture)
    }

    /// Whether objects may be rezzed
    pub fn can_rez(&self) -> bool {
        !self.store.has(RlvCommand::Rez)
    }

    /// Whether `object` may be edited
    pub fn can_edit(&self, object: Uuid, target: EditTarget) -> bool {
        let keys = [object.to_string()];
        if self.denied_by(RlvCommand::Edit, &keys) || self.targeted(RlvCommand::EditObj, &keys) {
            return false;
        }
        match target {
            EditTarget::World => !self.store.has(RlvCommand::EditWorld),
            EditTarget::Attachment => !self.store.has(RlvCommand::EditAttach),
        }
    }

    /// Whether inventory may be given to `to`
    pub fn can_share(&self, to: Uuid) -> bool {
        !self.denied_by(RlvCommand::Share, &[to.to_string()])
    }

    /// Touching distant objects: `(unrestricted, max distance)`
    pub fn can_fartouch(&self) -> (bool, f32) {
        self.threshold(RlvCommand::FarTouch, DEFAULT_TOUCH_DISTANCE)
    }

    /// Whether `object` may be touched, distance aside
    pub fn can_touch(&self, object: Uuid, target: TouchTarget) -> bool {
        if self
            .store
            .query(RlvCommand::TouchMe)
            .iter()
            .any(|r| r.sender == object)
        {
            return true;
        }

        let keys = [object.to_string()];
        if self.store.has(RlvCommand::TouchAll) || self.targeted(RlvCommand::TouchThis, &keys) {
            return false;
        }

        match target {
            TouchTarget::World => !self.denied_by(RlvCommand::TouchWorld, &keys),
            TouchTarget::Hud => !self.denied_by(RlvCommand::TouchHud, &keys),
            TouchTarget::OwnAttachment => {
                !self.store.has(RlvCommand::TouchAttach)
                    && !self.store.has(RlvCommand::TouchAttachSelf)
            }
            TouchTarget::OtherAttachment(avatar) => {
                !self.store.has(RlvCommand::TouchAttach)
                    && !self.targeted(RlvCommand::TouchAttachOther, &[avatar.to_string()])
            }
        }
    }

    /// Whether the avatar may interact with the world at all
    pub fn can_interact(&self) -> bool {
        !self.store.has(RlvCommand::Interact)
    }

    // Display

    /// Whether the world map may be opened
    pub fn can_show_world_map(&self) -> bool {
        !self.store.has(RlvCommand::ShowWorldMap)
    }

    /// Whether the mini-map may be opened
    pub fn can_show_mini_map(&self) -> bool {
        !self.store.has(RlvCommand::ShowMiniMap)
    }

    /// Whether the current location may be shown
    pub fn can_show_location(&self) -> bool {
        !self.store.has(RlvCommand::ShowLoc)
    }

    /// Whether `avatar`'s name may be shown in chat and lists
    pub fn can_show_names(&self, avatar: Uuid) -> bool {
        !self.denied_by(RlvCommand::ShowNames, &[avatar.to_string()])
    }

    /// Whether `avatar`'s name tag may be shown
    pub fn can_show_name_tags(&self, avatar: Uuid) -> bool {
        !self.denied_by(RlvCommand::ShowNameTags, &[avatar.to_string()])
    }

    /// Whether hover text of `object` may be shown
    pub fn can_show_hover_text(&self, object: Uuid, location: HoverTextLocation) -> bool {
        if self.store.has(RlvCommand::ShowHoverTextAll)
            || self.targeted(RlvCommand::ShowHoverText, &[object.to_string()])
        {
            return false;
        }
        match location {
            HoverTextLocation::World => !self.store.has(RlvCommand::ShowHoverTextWorld),
            HoverTextLocation::Hud => !self.store.has(RlvCommand::ShowHoverTextHud),
        }
    }

    // Avatar state

    /// Whether the avatar may fly
    pub fn can_fly(&self) -> bool {
        !self.store.has(RlvCommand::Fly)
    }

    /// Whether the avatar may jump
    pub fn can_jump(&self) -> bool {
        !self.store.has(RlvCommand::Jump)
    }

    /// Whether the avatar may run temporarily
    pub fn can_temp_run(&self) -> bool {
        !self.store.has(RlvCommand::TempRun)
    }

    /// Whether always-run may be toggled on
    pub fn can_always_run(&self) -> bool {
        !self.store.has(RlvCommand::AlwaysRun)
    }

    /// Whether the avatar may sit down
    pub fn can_sit(&self) -> bool {
        !self.store.has(RlvCommand::Sit)
    }

    /// Whether the avatar may stand up
    pub fn can_unsit(&self) -> bool {
        !self.store.has(RlvCommand::Unsit)
    }

    /// Whether the active group may be changed
    pub fn can_set_group(&self) -> bool {
        !self.store.has(RlvCommand::SetGroup)
    }

    /// Whether debug settings may be changed by the user
    pub fn can_set_debug(&self) -> bool {
        !self.store.has(RlvCommand::SetDebug)
    }

    /// Whether environment settings may be changed by the user
    pub fn can_set_env(&self) -> bool {
        !self.store.has(RlvCommand::SetEnv)
    }

    /// Whether the avatar may be reported as away when idle
    pub fn can_go_idle(&self) -> bool {
        !self.store.has(RlvCommand::AllowIdle)
    }

    /// Whether "wear" may replace existing items
    pub fn can_default_wear(&self) -> bool {
        !self.store.has(RlvCommand::DefaultWear)
    }
}
