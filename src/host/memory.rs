//! In-memory host
//!
//! Serves a fixed avatar state and records every action instead of performing
//! it. Useful for tests and for hosts that apply actions in batches.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::traits::{ActionSink, QueryProvider};
use super::types::{
    CameraSettings, GroupSelector, HeightAdjustment, HostAction, SettingKind, TeleportRequest,
};
use crate::force::AttachmentRequest;
use crate::inventory::{InventoryItem, InventoryTree};

#[derive(Debug, Default)]
struct MemoryState {
    tree: Option<InventoryTree>,
    outfit: Vec<InventoryItem>,
    objects: Vec<Uuid>,
    sit_target: Option<Uuid>,
    group: Option<String>,
    camera: Option<CameraSettings>,
    debug: HashMap<String, String>,
    environment: HashMap<String, String>,
    actions: Vec<HostAction>,
    fail_actions: bool,
}

/// `QueryProvider` and `ActionSink` backed by memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<MemoryState>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `tree` as the shared folder
    pub fn with_tree(mut self, tree: InventoryTree) -> Self {
        self.state.get_mut().tree = Some(tree);
        self
    }

    /// Serve `outfit` as the current outfit
    pub fn with_outfit(mut self, outfit: Vec<InventoryItem>) -> Self {
        self.state.get_mut().outfit = outfit;
        self
    }

    /// Report `object` as existing in-world
    pub fn with_object(mut self, object: Uuid) -> Self {
        self.state.get_mut().objects.push(object);
        self
    }

    /// Report the avatar as sitting on `target`
    pub fn with_sit_target(mut self, target: Uuid) -> Self {
        self.state.get_mut().sit_target = Some(target);
        self
    }

    /// Report `name` as the active group
    pub fn with_group(mut self, name: impl Into<String>) -> Self {
        self.state.get_mut().group = Some(name.into());
        self
    }

    /// Serve camera limits
    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.state.get_mut().camera = Some(camera);
        self
    }

    /// Serve a debug setting
    pub fn with_debug(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.get_mut().debug.insert(name.into(), value.into());
        self
    }

    /// Serve an environment setting
    pub fn with_environment(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .environment
            .insert(name.into(), value.into());
        self
    }

    /// Make every action fail
    pub fn failing(mut self) -> Self {
        self.state.get_mut().fail_actions = true;
        self
    }

    /// Replace the shared folder snapshot
    pub async fn set_tree(&self, tree: Option<InventoryTree>) {
        self.state.lock().await.tree = tree;
    }

    /// Actions recorded so far
    pub async fn actions(&self) -> Vec<HostAction> {
        self.state.lock().await.actions.clone()
    }

    /// Replies recorded so far as `(channel, text)`
    pub async fn replies(&self) -> Vec<(i32, String)> {
        self.state
            .lock()
            .await
            .actions
            .iter()
            .filter_map(|a| match a {
                HostAction::Reply { channel, text } => Some((*channel, text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded actions
    pub async fn clear_actions(&self) {
        self.state.lock().await.actions.clear();
    }

    async fn record(&self, action: HostAction) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_actions {
            bail!("action rejected: {:?}", action);
        }
        state.actions.push(action);
        Ok(())
    }
}

#[async_trait]
impl QueryProvider for MemoryHost {
    async fn object_exists(&self, object: Uuid, _cancel: &CancellationToken) -> Result<bool> {
        Ok(self.state.lock().await.objects.contains(&object))
    }

    async fn is_sitting(&self, _cancel: &CancellationToken) -> Result<bool> {
        Ok(self.state.lock().await.sit_target.is_some())
    }

    async fn sit_target(&self, _cancel: &CancellationToken) -> Result<Option<Uuid>> {
        Ok(self.state.lock().await.sit_target)
    }

    async fn shared_folder(&self, _cancel: &CancellationToken) -> Result<Option<InventoryTree>> {
        Ok(self.state.lock().await.tree.clone())
    }

    async fn current_outfit(&self, _cancel: &CancellationToken) -> Result<Vec<InventoryItem>> {
        Ok(self.state.lock().await.outfit.clone())
    }

    async fn active_group_name(&self, _cancel: &CancellationToken) -> Result<Option<String>> {
        Ok(self.state.lock().await.group.clone())
    }

    async fn camera_settings(&self, _cancel: &CancellationToken) -> Result<Option<CameraSettings>> {
        Ok(self.state.lock().await.camera)
    }

    async fn debug_setting(
        &self,
        name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        Ok(self.state.lock().await.debug.get(name).cloned())
    }

    async fn environment_setting(
        &self,
        name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        Ok(self.state.lock().await.environment.get(name).cloned())
    }
}

#[async_trait]
impl ActionSink for MemoryHost {
    async fn send_reply(&self, channel: i32, text: &str, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::Reply {
            channel,
            text: text.to_string(),
        })
        .await
    }

    async fn send_instant_message(
        &self,
        to: Uuid,
        text: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(HostAction::InstantMessage {
            to,
            text: text.to_string(),
        })
        .await
    }

    async fn set_rot(&self, angle: f32, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::SetRot { angle }).await
    }

    async fn adjust_height(
        &self,
        adjustment: HeightAdjustment,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(HostAction::AdjustHeight(adjustment)).await
    }

    async fn set_cam_fov(&self, fov: f32, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::SetCamFov { fov }).await
    }

    async fn tp_to(&self, request: TeleportRequest, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::TpTo(request)).await
    }

    async fn sit(&self, target: Uuid, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::Sit { target }).await?;
        self.state.lock().await.sit_target = Some(target);
        Ok(())
    }

    async fn unsit(&self, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::Unsit).await?;
        self.state.lock().await.sit_target = None;
        Ok(())
    }

    async fn sit_ground(&self, _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::SitGround).await
    }

    async fn rem_outfit(&self, items: &[Uuid], _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::RemOutfit {
            items: items.to_vec(),
        })
        .await
    }

    async fn attach(
        &self,
        requests: &[AttachmentRequest],
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(HostAction::Attach {
            requests: requests.to_vec(),
        })
        .await
    }

    async fn detach(&self, items: &[Uuid], _cancel: &CancellationToken) -> Result<()> {
        self.record(HostAction::Detach {
            items: items.to_vec(),
        })
        .await
    }

    async fn set_group(
        &self,
        group: GroupSelector,
        role: Option<String>,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(HostAction::SetGroup { group, role }).await
    }

    async fn set_setting(
        &self,
        kind: SettingKind,
        name: &str,
        value: &str,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(HostAction::SetSetting {
            kind,
            name: name.to_string(),
            value: value.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_actions() {
        let host = MemoryHost::new().with_group("Builders");
        let cancel = CancellationToken::new();

        host.send_reply(2222, "hello", &cancel).await.unwrap();
        host.unsit(&cancel).await.unwrap();

        assert_eq!(host.replies().await, vec![(2222, "hello".to_string())]);
        assert_eq!(host.actions().await.len(), 2);
        assert_eq!(
            host.active_group_name(&cancel).await.unwrap().as_deref(),
            Some("Builders")
        );
    }

    #[tokio::test]
    async fn test_failing_host() {
        let host = MemoryHost::new().failing();
        let cancel = CancellationToken::new();
        assert!(host.sit_ground(&cancel).await.is_err());
        assert!(host.actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_sit_updates_state() {
        let chair = Uuid::new_v4();
        let host = MemoryHost::new().with_object(chair);
        let cancel = CancellationToken::new();

        assert!(host.object_exists(chair, &cancel).await.unwrap());
        assert!(!host.is_sitting(&cancel).await.unwrap());
        host.sit(chair, &cancel).await.unwrap();
        assert_eq!(host.sit_target(&cancel).await.unwrap(), Some(chair));
    }
}
