//! Values exchanged with the host

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::force::AttachmentRequest;

/// Camera limits as configured in the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Minimum camera-to-avatar distance
    pub av_dist_min: f32,
    /// Maximum camera-to-avatar distance
    pub av_dist_max: f32,
    /// Minimum field of view, radians
    pub fov_min: f32,
    /// Maximum field of view, radians
    pub fov_max: f32,
    /// Minimum zoom factor
    pub zoom_min: f32,
    /// Current field of view, radians
    pub current_fov: f32,
}

/// Destination of a forced teleport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleportRequest {
    /// Region name; `None` means global coordinates
    pub region: Option<String>,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Facing after arrival, radians
    pub lookat: Option<f32>,
}

impl TeleportRequest {
    /// Parse `x/y/z[;lookat]` or `region/x/y/z[;lookat]`
    pub fn parse(option: &str) -> Option<Self> {
        let (position, lookat) = match option.split_once(';') {
            Some((p, l)) => (p, Some(l.trim().parse::<f32>().ok()?)),
            None => (option, None),
        };
        let parts: Vec<&str> = position.split('/').map(str::trim).collect();
        let (region, coords) = match parts.as_slice() {
            [x, y, z] => (None, [*x, *y, *z]),
            [region, x, y, z] if !region.is_empty() => (Some(region.to_string()), [*x, *y, *z]),
            _ => return None,
        };
        let [x, y, z] = coords;
        Some(Self {
            region,
            x: x.parse().ok()?,
            y: y.parse().ok()?,
            z: z.parse().ok()?,
            lookat,
        })
    }
}

/// Forced hover-height change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightAdjustment {
    /// Pelvis-to-foot distance, metres
    pub distance: f32,
    /// Scale factor applied to the distance
    pub factor: f32,
    /// Extra offset, metres
    pub delta: f32,
}

impl HeightAdjustment {
    /// Parse `distance[;factor[;delta]]`
    pub fn parse(option: &str) -> Option<Self> {
        let mut parts = option.split(';').map(str::trim);
        let distance = parts.next()?.parse().ok()?;
        let factor = match parts.next() {
            Some(f) => f.parse().ok()?,
            None => 1.0,
        };
        let delta = match parts.next() {
            Some(d) => d.parse().ok()?,
            None => 0.0,
        };
        Some(Self {
            distance,
            factor,
            delta,
        })
    }
}

/// Group to activate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSelector {
    /// By group id
    Id(Uuid),
    /// By group name
    Name(String),
}

impl GroupSelector {
    /// A UUID selects by id, anything else by name
    pub fn parse(text: &str) -> Self {
        match Uuid::parse_str(text.trim()) {
            Ok(id) => GroupSelector::Id(id),
            Err(_) => GroupSelector::Name(text.trim().to_string()),
        }
    }
}

/// Which settings store a `set*_` command writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// Debug settings (`setdebug_`)
    Debug,
    /// Environment settings (`setenv_`)
    Environment,
}

/// A host action, as recorded by `MemoryHost`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
    /// Chat reply on a channel
    Reply { channel: i32, text: String },
    /// Instant message
    InstantMessage { to: Uuid, text: String },
    /// Turn to face a direction
    SetRot { angle: f32 },
    /// Change hover height
    AdjustHeight(HeightAdjustment),
    /// Set the camera field of view
    SetCamFov { fov: f32 },
    /// Teleport
    TpTo(TeleportRequest),
    /// Sit on an object
    Sit { target: Uuid },
    /// Stand up
    Unsit,
    /// Sit on the ground
    SitGround,
    /// Take off clothing
    RemOutfit { items: Vec<Uuid> },
    /// Attach or wear items
    Attach { requests: Vec<AttachmentRequest> },
    /// Detach items
    Detach { items: Vec<Uuid> },
    /// Activate a group
    SetGroup {
        group: GroupSelector,
        role: Option<String>,
    },
    /// Write a setting
    SetSetting {
        kind: SettingKind,
        name: String,
        value: String,
    },
}
