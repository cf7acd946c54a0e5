//! `=force` dispatch

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::rlv_engine::RlvEngine;
use crate::command::{ParsedCommand, RlvCommand};
use crate::core::{RlvError, RlvResult};
use crate::force::ForceResolver;
use crate::host::{GroupSelector, HeightAdjustment, SettingKind, TeleportRequest};

impl RlvEngine {
    pub(super) async fn force(
        &self,
        cmd: &ParsedCommand,
        sender: Uuid,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        use RlvCommand as C;

        if ForceResolver::handles(cmd.command) {
            return self.force_inventory(cmd, sender, cancel).await;
        }

        let option = cmd.option().map(str::trim);
        let invalid = |o: Option<&str>| RlvError::invalid_option(cmd.command.name(), o.unwrap_or(""));
        let number = |o: Option<&str>| -> RlvResult<f32> {
            o.and_then(|v| v.parse::<f32>().ok()).ok_or_else(|| invalid(o))
        };

        let result = match cmd.command {
            C::Sit => {
                let target = option
                    .and_then(|o| Uuid::parse_str(o).ok())
                    .ok_or_else(|| invalid(option))?;
                let exists = match self.queries.object_exists(target, cancel).await {
                    Ok(exists) => exists,
                    Err(e) => {
                        tracing::warn!("[RlvEngine] Object query for {} failed: {}", target, e);
                        false
                    }
                };
                if !exists {
                    return Err(RlvError::Unresolved(target.to_string()));
                }
                self.actions.sit(target, cancel).await
            }
            C::Unsit => {
                let sitting = match self.queries.is_sitting(cancel).await {
                    Ok(sitting) => sitting,
                    Err(e) => {
                        tracing::warn!("[RlvEngine] Sit state query failed: {}", e);
                        false
                    }
                };
                if !sitting {
                    tracing::debug!("[RlvEngine] unsit=force while standing, nothing to do");
                    return Ok(());
                }
                self.actions.unsit(cancel).await
            }
            C::SitGround => self.actions.sit_ground(cancel).await,
            C::TpTo => {
                let request = option
                    .and_then(TeleportRequest::parse)
                    .ok_or_else(|| invalid(option))?;
                self.actions.tp_to(request, cancel).await
            }
            C::SetRot => self.actions.set_rot(number(option)?, cancel).await,
            C::AdjustHeight => {
                let adjustment = option
                    .and_then(HeightAdjustment::parse)
                    .ok_or_else(|| invalid(option))?;
                self.actions.adjust_height(adjustment, cancel).await
            }
            C::SetCamFov => self.actions.set_cam_fov(number(option)?, cancel).await,
            C::SetGroup => {
                let text = option.ok_or_else(|| invalid(option))?;
                let (group, role) = match text.split_once(';') {
                    Some((g, r)) => (g, Some(r.trim()).filter(|r| !r.is_empty())),
                    None => (text, None),
                };
                if group.trim().is_empty() {
                    return Err(invalid(option));
                }
                self.actions
                    .set_group(GroupSelector::parse(group), role.map(str::to_string), cancel)
                    .await
            }
            C::SetDebug | C::SetEnv => {
                let name = cmd
                    .setting
                    .as_deref()
                    .ok_or_else(|| RlvError::malformed(cmd.key()))?;
                let kind = if cmd.command == C::SetDebug {
                    SettingKind::Debug
                } else {
                    SettingKind::Environment
                };
                self.actions
                    .set_setting(kind, name, option.unwrap_or(""), cancel)
                    .await
            }
            other => return Err(RlvError::invalid_behavior(other.name(), cmd.behavior.clone())),
        };
        result.map_err(RlvError::action)
    }

    /// Attach, detach and remoutfit: resolve against one snapshot, then act
    async fn force_inventory(
        &self,
        cmd: &ParsedCommand,
        sender: Uuid,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        let tree = self.fetch_tree(cancel).await;
        let outfit = self.fetch_outfit(cancel).await;
        let resolution =
            ForceResolver::new(tree.as_ref(), &outfit).resolve(cmd.command, cmd.option(), sender);

        if !resolution.rem_outfit.is_empty() {
            self.actions
                .rem_outfit(&resolution.rem_outfit, cancel)
                .await
                .map_err(RlvError::action)?;
        }
        if !resolution.detach.is_empty() {
            self.actions
                .detach(&resolution.detach, cancel)
                .await
                .map_err(RlvError::action)?;
        }
        if !resolution.attach.is_empty() {
            self.actions
                .attach(&resolution.attach, cancel)
                .await
                .map_err(RlvError::action)?;
        }
        Ok(())
    }
}
