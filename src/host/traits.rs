//! Collaborator traits implemented by the host

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::types::{CameraSettings, GroupSelector, HeightAdjustment, SettingKind, TeleportRequest};
use crate::force::AttachmentRequest;
use crate::inventory::{InventoryItem, InventoryTree};

/// Read access to the avatar's state
///
/// Errors and `None` are treated by the engine as "nothing found".
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Whether an in-world object exists
    async fn object_exists(&self, object: Uuid, cancel: &CancellationToken) -> Result<bool>;

    /// Whether the avatar is sitting
    async fn is_sitting(&self, cancel: &CancellationToken) -> Result<bool>;

    /// Object the avatar sits on, if any
    async fn sit_target(&self, cancel: &CancellationToken) -> Result<Option<Uuid>>;

    /// Snapshot of the shared (`#RLV`) folder tree
    async fn shared_folder(&self, cancel: &CancellationToken) -> Result<Option<InventoryTree>>;

    /// Items currently attached or worn
    async fn current_outfit(&self, cancel: &CancellationToken) -> Result<Vec<InventoryItem>>;

    /// Name of the active group
    async fn active_group_name(&self, cancel: &CancellationToken) -> Result<Option<String>>;

    /// Current camera limits
    async fn camera_settings(&self, cancel: &CancellationToken) -> Result<Option<CameraSettings>>;

    /// Value of a debug setting
    async fn debug_setting(&self, name: &str, cancel: &CancellationToken)
        -> Result<Option<String>>;

    /// Value of an environment setting
    async fn environment_setting(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>>;
}

/// Side effects the engine asks the host to perform
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Say `text` on `channel`
    async fn send_reply(&self, channel: i32, text: &str, cancel: &CancellationToken)
        -> Result<()>;

    /// Send an instant message
    async fn send_instant_message(
        &self,
        to: Uuid,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Turn the avatar to face `angle` radians
    async fn set_rot(&self, angle: f32, cancel: &CancellationToken) -> Result<()>;

    /// Change the avatar's hover height
    async fn adjust_height(
        &self,
        adjustment: HeightAdjustment,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Set the camera field of view
    async fn set_cam_fov(&self, fov: f32, cancel: &CancellationToken) -> Result<()>;

    /// Teleport the avatar
    async fn tp_to(&self, request: TeleportRequest, cancel: &CancellationToken) -> Result<()>;

    /// Sit on `target`
    async fn sit(&self, target: Uuid, cancel: &CancellationToken) -> Result<()>;

    /// Stand up
    async fn unsit(&self, cancel: &CancellationToken) -> Result<()>;

    /// Sit on the ground
    async fn sit_ground(&self, cancel: &CancellationToken) -> Result<()>;

    /// Take off worn clothing
    async fn rem_outfit(&self, items: &[Uuid], cancel: &CancellationToken) -> Result<()>;

    /// Attach or wear items
    async fn attach(&self, requests: &[AttachmentRequest], cancel: &CancellationToken)
        -> Result<()>;

    /// Detach attachments
    async fn detach(&self, items: &[Uuid], cancel: &CancellationToken) -> Result<()>;

    /// Activate a group, optionally with a role
    async fn set_group(
        &self,
        group: GroupSelector,
        role: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Write a debug or environment setting
    async fn set_setting(
        &self,
        kind: SettingKind,
        name: &str,
        value: &str,
        cancel: &CancellationToken,
    ) -> Result<()>;
}
