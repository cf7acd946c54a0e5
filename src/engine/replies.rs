//! `=<channel>` replies and instant-message queries

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::rlv_engine::RlvEngine;
use crate::command::{ParsedCommand, RlvCommand};
use crate::core::{AttachmentPoint, RlvError, RlvResult, WearableType, NULL_KEY};
use crate::host::CameraSettings;
use crate::queries;

impl RlvEngine {
    pub(super) async fn reply(
        &self,
        cmd: &ParsedCommand,
        channel: i32,
        sender: Uuid,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        let text = self.reply_text(cmd, sender, cancel).await?;
        tracing::debug!("[RlvEngine] {} -> {}: {}", cmd.key(), channel, text);
        self.actions
            .send_reply(channel, &text, cancel)
            .await
            .map_err(RlvError::action)
    }

    async fn reply_text(
        &self,
        cmd: &ParsedCommand,
        sender: Uuid,
        cancel: &CancellationToken,
    ) -> RlvResult<String> {
        use RlvCommand as C;

        let option = cmd.option().map(str::trim);
        let invalid = |o: &str| RlvError::invalid_option(cmd.command.name(), o);

        let text = match cmd.command {
            C::Version => self.config.version.clone(),
            C::VersionNew => self.config.version_new.clone(),
            C::VersionNum => self.config.version_num.clone(),
            C::VersionNumBl => self.config.version_num_bl(),
            C::GetBlacklist => queries::get_blacklist(&self.config.blacklist, option),
            C::GetStatus => queries::get_status(&self.store, Some(sender), cmd.option()),
            C::GetStatusAll => queries::get_status(&self.store, None, cmd.option()),
            C::GetSitId => match self.queries.sit_target(cancel).await {
                Ok(Some(target)) => target.to_string(),
                Ok(None) => NULL_KEY.to_string(),
                Err(e) => {
                    tracing::warn!("[RlvEngine] Sit target query failed: {}", e);
                    NULL_KEY.to_string()
                }
            },
            C::GetOutfit => {
                let layer = option
                    .map(|o| WearableType::from_name(o).ok_or_else(|| invalid(o)))
                    .transpose()?;
                queries::get_outfit(&self.fetch_outfit(cancel).await, layer)
            }
            C::GetAttach => {
                let point = option
                    .map(|o| AttachmentPoint::from_name(o).ok_or_else(|| invalid(o)))
                    .transpose()?;
                queries::get_attach(&self.fetch_outfit(cancel).await, point)
            }
            C::GetInv | C::GetInvWorn | C::GetPath | C::GetPathNew | C::FindFolder
            | C::FindFolders => {
                let Some(tree) = self.fetch_tree(cancel).await else {
                    return Ok(String::new());
                };
                match cmd.command {
                    C::GetInv => queries::get_inv(&tree, option),
                    C::GetInvWorn => queries::get_inv_worn(&tree, option),
                    C::GetPath => queries::get_paths(&tree, option, sender)
                        .into_iter()
                        .next()
                        .unwrap_or_default(),
                    C::GetPathNew => queries::get_paths(&tree, option, sender).join(","),
                    C::FindFolder => queries::find_folder(&tree, option.unwrap_or("")),
                    _ => queries::find_folders(&tree, option.unwrap_or("")),
                }
            }
            C::GetGroup => match self.queries.active_group_name(cancel).await {
                Ok(Some(name)) if !name.is_empty() => name,
                Ok(_) => "none".to_string(),
                Err(e) => {
                    tracing::warn!("[RlvEngine] Group query failed: {}", e);
                    "none".to_string()
                }
            },
            C::GetCamAvDistMin
            | C::GetCamAvDistMax
            | C::GetCamFovMin
            | C::GetCamFovMax
            | C::GetCamZoomMin
            | C::GetCamFov => self.camera_reply(cmd.command, cancel).await,
            C::GetDebug | C::GetEnv => {
                let name = cmd
                    .setting
                    .as_deref()
                    .ok_or_else(|| RlvError::malformed(cmd.key()))?;
                let value = if cmd.command == C::GetDebug {
                    self.queries.debug_setting(name, cancel).await
                } else {
                    self.queries.environment_setting(name, cancel).await
                };
                match value {
                    Ok(v) => v.unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!("[RlvEngine] Setting query '{}' failed: {}", name, e);
                        String::new()
                    }
                }
            }
            other => return Err(RlvError::invalid_behavior(other.name(), cmd.behavior.clone())),
        };
        Ok(text)
    }

    /// Restriction aggregate if one is active, else the host's current value
    async fn camera_reply(&self, command: RlvCommand, cancel: &CancellationToken) -> String {
        use RlvCommand as C;

        let restricted = match command {
            C::GetCamAvDistMin => self.store.aggregate_extremum(C::CamAvDistMin),
            C::GetCamAvDistMax => self.store.aggregate_extremum(C::CamAvDistMax),
            C::GetCamFovMin => self.store.aggregate_extremum(C::CamFovMin),
            C::GetCamFovMax => self.store.aggregate_extremum(C::CamFovMax),
            C::GetCamZoomMin => self.store.aggregate_extremum(C::CamZoomMin),
            _ => None,
        };
        if let Some(value) = restricted {
            return value.to_string();
        }

        let settings = match self.queries.camera_settings(cancel).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("[RlvEngine] Camera query failed: {}", e);
                None
            }
        };
        let pick = |s: CameraSettings| match command {
            C::GetCamAvDistMin => s.av_dist_min,
            C::GetCamAvDistMax => s.av_dist_max,
            C::GetCamFovMin => s.fov_min,
            C::GetCamFovMax => s.fov_max,
            C::GetCamZoomMin => s.zoom_min,
            _ => s.current_fov,
        };
        settings
            .map(|s| pick(s).to_string())
            .unwrap_or_else(|| "0".to_string())
    }

    /// Process an instant message from `sender`.
    ///
    /// Only `@version` and `@getblacklist[:filter]` are answered, and only
    /// when instant-message processing is enabled. The reply goes back to
    /// `sender` as an instant message echoing the command:
    /// `/version=<version string>`.
    pub async fn process_instant_message(
        &self,
        message: &str,
        sender: Uuid,
        cancel: &CancellationToken,
    ) -> bool {
        if let Err(e) = self.ensure_enabled() {
            tracing::debug!("[RlvEngine] Ignoring instant message from {}: {}", sender, e);
            return false;
        }
        if !self.config.enable_instant_message_processing {
            return false;
        }
        let Some(body) = message.trim().strip_prefix('@').map(str::trim) else {
            return false;
        };
        let (name, option) = match body.split_once(':') {
            Some((n, o)) => (n, Some(o.trim()).filter(|o| !o.is_empty())),
            None => (body, None),
        };

        let value = match name.trim().to_lowercase().as_str() {
            "version" => self.config.version.clone(),
            "getblacklist" => queries::get_blacklist(&self.config.blacklist, option),
            _ => return false,
        };
        let text = format!("/{}={}", body, value);

        match self.actions.send_instant_message(sender, &text, cancel).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[RlvEngine] Instant message reply to {} failed: {}", sender, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::EngineConfig;
    use crate::host::{HostAction, MemoryHost};
    use crate::inventory::{InventoryItem, InventoryTree};

    fn engine(host: &Arc<MemoryHost>, config: EngineConfig) -> RlvEngine {
        RlvEngine::new(config, host.clone(), host.clone()).unwrap()
    }

    async fn ask(engine: &mut RlvEngine, host: &MemoryHost, message: &str) -> String {
        host.clear_actions().await;
        let cancel = CancellationToken::new();
        assert!(engine.process_message(message, Uuid::nil(), "", &cancel).await);
        let replies = host.replies().await;
        assert_eq!(replies.len(), 1, "{}", message);
        replies[0].1.clone()
    }

    #[tokio::test]
    async fn test_version_replies() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine(&host, EngineConfig::new().with_blacklist(["sendim"]));

        assert!(ask(&mut engine, &host, "@version=2222").await.starts_with("RestrainedLife"));
        assert_eq!(ask(&mut engine, &host, "@versionnum=2222").await, "3040300");
        assert_eq!(ask(&mut engine, &host, "@versionnumbl=2222").await, "3040300,sendim");
        assert_eq!(ask(&mut engine, &host, "@getblacklist=2222").await, "sendim");
        assert_eq!(ask(&mut engine, &host, "@getblacklist:tp=2222").await, "");
    }

    #[tokio::test]
    async fn test_reply_goes_to_requested_channel() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();

        engine.process_message("@versionnum=-42", Uuid::nil(), "", &cancel).await;
        assert_eq!(host.replies().await, vec![(-42, "3040300".to_string())]);
    }

    #[tokio::test]
    async fn test_bad_channel_has_no_side_effect() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();

        assert!(!engine.process_message("@version=0", Uuid::nil(), "", &cancel).await);
        assert!(!engine.process_message("@version=2147483648", Uuid::nil(), "", &cancel).await);
        assert!(host.actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_status_is_per_sender() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();
        let other = Uuid::new_v4();

        engine.process_message("@fly=n,sendim:friend=add", Uuid::nil(), "", &cancel).await;
        engine.process_message("@tplm=n", other, "", &cancel).await;

        assert_eq!(ask(&mut engine, &host, "@getstatus=1").await, "/fly/sendim:friend");
        assert_eq!(ask(&mut engine, &host, "@getstatusall=1").await, "/fly/sendim:friend/tplm");
        assert_eq!(ask(&mut engine, &host, "@getstatusall:;#=1").await, "#fly#sendim:friend#tplm");
    }

    #[tokio::test]
    async fn test_sit_and_group_replies() {
        let chair = Uuid::new_v4();
        let host = Arc::new(MemoryHost::new().with_sit_target(chair).with_group("Builders"));
        let mut engine = engine(&host, EngineConfig::default());

        assert_eq!(ask(&mut engine, &host, "@getsitid=5").await, chair.to_string());
        assert_eq!(ask(&mut engine, &host, "@getgroup=5").await, "Builders");

        let host = Arc::new(MemoryHost::new());
        let mut engine = self::engine(&host, EngineConfig::default());
        assert_eq!(ask(&mut engine, &host, "@getsitid=5").await, NULL_KEY);
        assert_eq!(ask(&mut engine, &host, "@getgroup=5").await, "none");
    }

    #[tokio::test]
    async fn test_outfit_replies() {
        let outfit = vec![
            InventoryItem::wearable(Uuid::new_v4(), "Socks", WearableType::Socks).worn(),
            InventoryItem::object(Uuid::new_v4(), "Hat")
                .attached(AttachmentPoint::Chest, Uuid::new_v4()),
        ];
        let host = Arc::new(MemoryHost::new().with_outfit(outfit));
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();

        assert_eq!(ask(&mut engine, &host, "@getoutfit:socks=9").await, "1");
        assert_eq!(ask(&mut engine, &host, "@getoutfit=9").await, "00000010000000000");
        assert_eq!(ask(&mut engine, &host, "@getattach:chest=9").await, "1");
        assert!(ask(&mut engine, &host, "@getattach=9").await.starts_with("10"));

        assert!(!engine.process_message("@getoutfit:cape=9", Uuid::nil(), "", &cancel).await);
    }

    #[tokio::test]
    async fn test_inventory_replies() {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let clothes = tree.add_folder(root, "Clothes").unwrap();
        tree.add_folder(clothes, "Red Dress").unwrap();
        tree.add_item(
            clothes,
            InventoryItem::object(Uuid::new_v4(), "Belt")
                .attached(AttachmentPoint::Pelvis, Uuid::new_v4()),
        );

        let host = Arc::new(MemoryHost::new().with_tree(tree));
        let mut engine = engine(&host, EngineConfig::default());

        assert_eq!(ask(&mut engine, &host, "@getinv=3").await, "Clothes");
        assert_eq!(ask(&mut engine, &host, "@getinvworn:Clothes=3").await, "|33,Red Dress|00");
        assert_eq!(ask(&mut engine, &host, "@getpath:pelvis=3").await, "Clothes");
        assert_eq!(ask(&mut engine, &host, "@getpathnew:pelvis=3").await, "Clothes");
        assert_eq!(ask(&mut engine, &host, "@findfolder:dress=3").await, "Clothes/Red Dress");
        assert_eq!(ask(&mut engine, &host, "@findfolders:e;|=3").await, "Clothes|Clothes/Red Dress");
        assert_eq!(ask(&mut engine, &host, "@getinv:Nowhere=3").await, "");

        host.set_tree(None).await;
        assert_eq!(ask(&mut engine, &host, "@getinv=3").await, "");
    }

    #[tokio::test]
    async fn test_camera_replies() {
        let host = Arc::new(MemoryHost::new().with_camera(CameraSettings {
            av_dist_min: 0.5,
            av_dist_max: 20.0,
            fov_min: 0.2,
            fov_max: 2.0,
            zoom_min: 1.0,
            current_fov: 1.25,
        }));
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();

        assert_eq!(ask(&mut engine, &host, "@getcam_avdistmax=4").await, "20");
        assert_eq!(ask(&mut engine, &host, "@getcam_fov=4").await, "1.25");

        engine.process_message("@camdistmax:5=n", Uuid::new_v4(), "", &cancel).await;
        engine.process_message("@setcam_avdistmax:3=n", Uuid::new_v4(), "", &cancel).await;
        assert_eq!(ask(&mut engine, &host, "@getcam_avdistmax=4").await, "3");

        let host = Arc::new(MemoryHost::new());
        let mut engine = self::engine(&host, EngineConfig::default());
        assert_eq!(ask(&mut engine, &host, "@getcam_zoommin=4").await, "0");
    }

    #[tokio::test]
    async fn test_setting_replies() {
        let host = Arc::new(
            MemoryHost::new()
                .with_debug("renderresolutiondivisor", "4")
                .with_environment("daytime", "0.5"),
        );
        let mut engine = engine(&host, EngineConfig::default());

        assert_eq!(ask(&mut engine, &host, "@getdebug_renderresolutiondivisor=8").await, "4");
        assert_eq!(ask(&mut engine, &host, "@getenv_daytime=8").await, "0.5");
        assert_eq!(ask(&mut engine, &host, "@getenv_haze=8").await, "");
    }

    #[tokio::test]
    async fn test_failed_reply_fails_command() {
        let host = Arc::new(MemoryHost::new().failing());
        let mut engine = engine(&host, EngineConfig::default());
        let cancel = CancellationToken::new();
        assert!(!engine.process_message("@version=2222", Uuid::nil(), "", &cancel).await);
    }

    #[tokio::test]
    async fn test_instant_messages() {
        let host = Arc::new(MemoryHost::new());
        let sender = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let engine_off = engine(&host, EngineConfig::default());
        assert!(!engine_off.process_instant_message("@version", sender, &cancel).await);

        let engine_on = engine(
            &host,
            EngineConfig::new()
                .with_instant_messages(true)
                .with_blacklist(["sendim", "fly"]),
        );
        assert!(engine_on.process_instant_message("@version", sender, &cancel).await);
        assert!(engine_on.process_instant_message("@getblacklist:im", sender, &cancel).await);
        assert!(!engine_on.process_instant_message("@fly=n", sender, &cancel).await);
        assert!(!engine_on.process_instant_message("hello", sender, &cancel).await);

        let actions = host.actions().await;
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], HostAction::InstantMessage { to, text }
            if *to == sender && text.starts_with("/version=RestrainedLife")));
        assert!(matches!(&actions[1], HostAction::InstantMessage { text, .. }
            if text == "/getblacklist:im=sendim"));
    }
}
