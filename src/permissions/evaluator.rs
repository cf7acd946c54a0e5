//! Permission evaluator core, chat, instant messages and teleports

use uuid::Uuid;

use crate::command::{RlvCommand, DEFAULT_TOUCH_DISTANCE, DEFAULT_TPLOCAL_DISTANCE};
use crate::restrictions::{Restriction, RestrictionStore};

/// Read-only view answering `can_*` questions against a store
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    pub(super) store: &'a RestrictionStore,
}

/// Shape of a chat line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    /// Plain spoken text
    Text,
    /// `/me ` or `/me'` line
    Emote,
    /// Any other line starting with `/` (gesture triggers, OOC)
    Slash,
}

impl ChatKind {
    /// Classify a chat line
    pub fn of(message: &str) -> Self {
        if message.starts_with("/me ") || message.starts_with("/me'") {
            ChatKind::Emote
        } else if message.starts_with('/') {
            ChatKind::Slash
        } else {
            ChatKind::Text
        }
    }
}

/// Chat volume requested for a line on channel 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVolume {
    /// Whisper range
    Whisper,
    /// Normal range
    Normal,
    /// Shout range
    Shout,
}

/// Recipient of an instant message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImTarget<'s> {
    /// A single avatar
    Avatar(Uuid),
    /// A group session, by group name
    Group(&'s str),
}

impl ImTarget<'_> {
    fn keys(&self) -> Vec<String> {
        match self {
            ImTarget::Avatar(id) => vec![id.to_string()],
            ImTarget::Group(name) => vec![name.to_lowercase(), "allgroups".to_string()],
        }
    }
}

fn matches_key(param: &str, keys: &[String]) -> bool {
    keys.iter().any(|k| k.eq_ignore_ascii_case(param))
}

impl<'a> PermissionEvaluator<'a> {
    /// Create an evaluator over `store`
    pub fn new(store: &'a RestrictionStore) -> Self {
        Self { store }
    }

    /// `false` while any `@permissive=n` is active
    pub fn is_permissive(&self) -> bool {
        !self.store.has(RlvCommand::Permissive)
    }

    /// Whether the command's family blocks an action with no discriminator
    pub fn is_restricted(&self, command: RlvCommand) -> bool {
        self.denied_by(command, &[])
    }

    /// Whether a non-excepted restriction of `command`'s family applies.
    ///
    /// `keys` are the discriminators of the action (user id, group name,
    /// channel, object id). An exception matching a key cancels a restriction
    /// from any sender, unless the restriction is secure (or permissive mode
    /// is off), in which case only an exception from the same sender counts.
    pub(super) fn denied_by(&self, command: RlvCommand, keys: &[String]) -> bool {
        let family = command.family();
        let all_secure = !self.is_permissive();
        let exceptions: Vec<&Restriction> = self
            .store
            .query(family)
            .iter()
            .filter(|r| r.is_exception)
            .filter(|r| r.param.as_deref().is_some_and(|p| matches_key(p, keys)))
            .collect();

        self.store
            .family(family)
            .filter(|r| !r.is_exception)
            .any(|r| {
                let secure = r.is_secure || all_secure;
                !exceptions
                    .iter()
                    .any(|ex| !secure || ex.sender == r.sender)
            })
    }

    /// Whether a target-scoped command names one of `keys` (or has no target)
    pub(super) fn targeted(&self, command: RlvCommand, keys: &[String]) -> bool {
        self.store
            .query(command)
            .iter()
            .any(|r| r.param.as_deref().map_or(true, |p| matches_key(p, keys)))
    }

    /// Threshold restriction as `(unrestricted, active limit)`
    pub(super) fn threshold(&self, command: RlvCommand, default: f32) -> (bool, f32) {
        match self.store.aggregate_extremum(command) {
            Some(limit) => (false, limit),
            None => (true, default),
        }
    }

    // Chat

    /// Whether `message` may be said on `channel`
    pub fn can_chat(&self, channel: i32, message: &str) -> bool {
        if channel != 0 {
            return self.can_send_channel(channel);
        }
        match ChatKind::of(message) {
            ChatKind::Text => !self.is_restricted(RlvCommand::SendChat),
            ChatKind::Emote | ChatKind::Slash => true,
        }
    }

    /// Whether chat on a non-zero channel is allowed
    pub fn can_send_channel(&self, channel: i32) -> bool {
        let keys = [channel.to_string()];
        !self.denied_by(RlvCommand::SendChannel, &keys)
            && !self
                .store
                .query(RlvCommand::SendChannelExcept)
                .iter()
                .any(|r| r.param.as_deref() == Some(keys[0].as_str()))
    }

    /// Whether chat at `volume` is allowed
    pub fn can_chat_at(&self, volume: ChatVolume) -> bool {
        match volume {
            ChatVolume::Shout => !self.store.has(RlvCommand::ChatShout),
            ChatVolume::Normal => !self.store.has(RlvCommand::ChatNormal),
            ChatVolume::Whisper => !self.store.has(RlvCommand::ChatWhisper),
        }
    }

    /// Channels a line is redirected to instead of being spoken
    pub fn redirect_channels(&self, message: &str) -> Vec<i32> {
        match ChatKind::of(message) {
            ChatKind::Emote => self.store.channels(RlvCommand::RedirEmote),
            ChatKind::Text => self.store.channels(RlvCommand::RedirChat),
            ChatKind::Slash => Vec::new(),
        }
    }

    /// Whether emotes are cut short while `sendchat` is active
    pub fn is_emote_truncated(&self) -> bool {
        self.store.has(RlvCommand::SendChat) && !self.store.has(RlvCommand::Emote)
    }

    /// Whether gestures may be played
    pub fn can_send_gesture(&self) -> bool {
        !self.store.has(RlvCommand::SendGesture)
    }

    /// Whether a line heard from `from` is shown
    pub fn can_receive_chat(&self, message: &str, from: Uuid) -> bool {
        let keys = [from.to_string()];
        match ChatKind::of(message) {
            ChatKind::Emote => {
                !self.denied_by(RlvCommand::RecvEmote, &keys)
                    && !self.targeted(RlvCommand::RecvEmoteFrom, &keys)
            }
            ChatKind::Text | ChatKind::Slash => {
                !self.denied_by(RlvCommand::RecvChat, &keys)
                    && !self.targeted(RlvCommand::RecvChatFrom, &keys)
            }
        }
    }

    // Instant messages

    /// Whether an IM may be sent to `to`
    pub fn can_send_im(&self, to: ImTarget<'_>) -> bool {
        let keys = to.keys();
        !self.denied_by(RlvCommand::SendIm, &keys) && !self.targeted(RlvCommand::SendImTo, &keys)
    }

    /// Whether a new IM session with `to` may be opened
    pub fn can_start_im(&self, to: ImTarget<'_>) -> bool {
        let keys = to.keys();
        !self.denied_by(RlvCommand::StartIm, &keys) && !self.targeted(RlvCommand::StartImTo, &keys)
    }

    /// Whether an IM from `from` is shown
    pub fn can_receive_im(&self, from: ImTarget<'_>) -> bool {
        let keys = from.keys();
        !self.denied_by(RlvCommand::RecvIm, &keys) && !self.targeted(RlvCommand::RecvImFrom, &keys)
    }

    // Teleport

    /// Whether landmarks may be used to teleport
    pub fn can_tp_landmark(&self) -> bool {
        !self.store.has(RlvCommand::TpLm)
    }

    /// Whether map/location teleports are allowed
    pub fn can_tp_location(&self) -> bool {
        !self.store.has(RlvCommand::TpLoc)
    }

    /// Local (double-click) teleports: `(unrestricted, max distance)`
    pub fn can_tp_local(&self) -> (bool, f32) {
        self.threshold(RlvCommand::TpLocal, DEFAULT_TPLOCAL_DISTANCE)
    }

    /// Whether a teleport offer from `from` may be accepted
    pub fn can_tp_lure(&self, from: Uuid) -> bool {
        !self.denied_by(RlvCommand::TpLure, &[from.to_string()])
    }

    /// Whether a teleport request from `from` may be accepted
    pub fn can_tp_request(&self, from: Uuid) -> bool {
        !self.denied_by(RlvCommand::TpRequest, &[from.to_string()])
    }

    /// Sitting on distant objects: `(unrestricted, max distance)`
    pub fn can_sit_tp(&self) -> (bool, f32) {
        self.threshold(RlvCommand::SitTp, DEFAULT_TOUCH_DISTANCE)
    }

    /// Whether standing up may move the avatar back
    pub fn can_stand_tp(&self) -> bool {
        !self.store.has(RlvCommand::StandTp)
    }

    /// Whether teleport offers from `from` are accepted automatically
    pub fn is_auto_accept_tp(&self, from: Uuid) -> bool {
        self.targeted(RlvCommand::AcceptTp, &[from.to_string()])
    }

    /// Whether teleport requests from `from` are accepted automatically
    pub fn is_auto_accept_tp_request(&self, from: Uuid) -> bool {
        self.targeted(RlvCommand::AcceptTpRequest, &[from.to_string()])
    }
}
