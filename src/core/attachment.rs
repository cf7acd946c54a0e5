//! Attachment point enumeration

use serde::{Deserialize, Serialize};

/// An enumerated body location an object can be attached to.
///
/// Discriminants are the protocol's numeric point ids; `getattach` replies
/// list one digit per point in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AttachmentPoint {
    Chest = 1,
    Skull = 2,
    LeftShoulder = 3,
    RightShoulder = 4,
    LeftHand = 5,
    RightHand = 6,
    LeftFoot = 7,
    RightFoot = 8,
    Spine = 9,
    Pelvis = 10,
    Mouth = 11,
    Chin = 12,
    LeftEar = 13,
    RightEar = 14,
    LeftEyeball = 15,
    RightEyeball = 16,
    Nose = 17,
    RightUpperArm = 18,
    RightForearm = 19,
    LeftUpperArm = 20,
    LeftForearm = 21,
    RightHip = 22,
    RightUpperLeg = 23,
    RightLowerLeg = 24,
    LeftHip = 25,
    LeftUpperLeg = 26,
    LeftLowerLeg = 27,
    Stomach = 28,
    LeftPec = 29,
    RightPec = 30,
    HudCenter2 = 31,
    HudTopRight = 32,
    HudTop = 33,
    HudTopLeft = 34,
    HudCenter = 35,
    HudBottomLeft = 36,
    HudBottom = 37,
    HudBottomRight = 38,
    Neck = 39,
    AvatarCenter = 40,
    LeftRingFinger = 41,
    RightRingFinger = 42,
    TailBase = 43,
    TailTip = 44,
    LeftWing = 45,
    RightWing = 46,
    Jaw = 47,
    AltLeftEar = 48,
    AltRightEar = 49,
    AltLeftEye = 50,
    AltRightEye = 51,
    Tongue = 52,
    Groin = 53,
    LeftHindFoot = 54,
    RightHindFoot = 55,
}

use AttachmentPoint::*;

/// Protocol names, canonical spelling first for each point
const NAMES: &[(&str, AttachmentPoint)] = &[
    ("chest", Chest),
    ("skull", Skull),
    ("left shoulder", LeftShoulder),
    ("right shoulder", RightShoulder),
    ("left hand", LeftHand),
    ("right hand", RightHand),
    ("left foot", LeftFoot),
    ("right foot", RightFoot),
    ("spine", Spine),
    ("pelvis", Pelvis),
    ("mouth", Mouth),
    ("chin", Chin),
    ("left ear", LeftEar),
    ("right ear", RightEar),
    ("left eyeball", LeftEyeball),
    ("right eyeball", RightEyeball),
    ("nose", Nose),
    ("r upper arm", RightUpperArm),
    ("r forearm", RightForearm),
    ("l upper arm", LeftUpperArm),
    ("l forearm", LeftForearm),
    ("right hip", RightHip),
    ("r upper leg", RightUpperLeg),
    ("r lower leg", RightLowerLeg),
    ("left hip", LeftHip),
    ("l upper leg", LeftUpperLeg),
    ("l lower leg", LeftLowerLeg),
    ("stomach", Stomach),
    ("left pec", LeftPec),
    ("right pec", RightPec),
    ("center 2", HudCenter2),
    ("top right", HudTopRight),
    ("top", HudTop),
    ("top left", HudTopLeft),
    ("center", HudCenter),
    ("bottom left", HudBottomLeft),
    ("bottom", HudBottom),
    ("bottom right", HudBottomRight),
    ("neck", Neck),
    ("avatar center", AvatarCenter),
    ("root", AvatarCenter),
    ("left ring finger", LeftRingFinger),
    ("right ring finger", RightRingFinger),
    ("tail base", TailBase),
    ("tail tip", TailTip),
    ("left wing", LeftWing),
    ("right wing", RightWing),
    ("jaw", Jaw),
    ("alt left ear", AltLeftEar),
    ("alt right ear", AltRightEar),
    ("alt left eye", AltLeftEye),
    ("alt right eye", AltRightEye),
    ("tongue", Tongue),
    ("groin", Groin),
    ("left hind foot", LeftHindFoot),
    ("right hind foot", RightHindFoot),
];

impl AttachmentPoint {
    /// Every point in numeric id order
    pub const ALL: [AttachmentPoint; 55] = [
        Chest, Skull, LeftShoulder, RightShoulder, LeftHand, RightHand, LeftFoot, RightFoot,
        Spine, Pelvis, Mouth, Chin, LeftEar, RightEar, LeftEyeball, RightEyeball, Nose,
        RightUpperArm, RightForearm, LeftUpperArm, LeftForearm, RightHip, RightUpperLeg,
        RightLowerLeg, LeftHip, LeftUpperLeg, LeftLowerLeg, Stomach, LeftPec, RightPec,
        HudCenter2, HudTopRight, HudTop, HudTopLeft, HudCenter, HudBottomLeft, HudBottom,
        HudBottomRight, Neck, AvatarCenter, LeftRingFinger, RightRingFinger, TailBase, TailTip,
        LeftWing, RightWing, Jaw, AltLeftEar, AltRightEar, AltLeftEye, AltRightEye, Tongue,
        Groin, LeftHindFoot, RightHindFoot,
    ];

    /// Parse a protocol point name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, p)| *p)
    }

    /// Canonical protocol name
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(n, _)| *n)
            .unwrap_or("")
    }

    /// Numeric protocol id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Whether this is one of the screen-space HUD points
    pub fn is_hud(self) -> bool {
        (HudCenter2.id()..=HudBottomRight.id()).contains(&self.id())
    }

    /// Find the first parenthesized point tag in an item or folder name,
    /// e.g. `"Collar (neck)"` → `Neck`
    pub fn from_name_tag(text: &str) -> Option<Self> {
        let mut rest = text;
        while let Some(open) = rest.find('(') {
            let after = &rest[open + 1..];
            let close = after.find(')')?;
            if let Some(point) = Self::from_name(&after[..close]) {
                return Some(point);
            }
            rest = &after[close + 1..];
        }
        None
    }
}

impl std::fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
