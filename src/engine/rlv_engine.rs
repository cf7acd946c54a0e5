//! The engine: message dispatch and restriction bookkeeping

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::config::EngineConfig;
use crate::command::{CommandAction, CommandParser, ParsedCommand, RlvCommand};
use crate::core::{AttachmentPoint, RlvError, RlvResult};
use crate::host::{ActionSink, QueryProvider};
use crate::inventory::{InventoryItem, InventoryTree};
use crate::locks::FolderLocks;
use crate::permissions::PermissionEvaluator;
use crate::restrictions::{NotifyTarget, Restriction, RestrictionEvent, RestrictionStore};

/// Restriction engine for one avatar
///
/// Feed it chat messages with [`RlvEngine::process_message`] and ask it
/// questions through [`RlvEngine::permissions`]. Calls must be serialized by
/// the host; every receiver that mutates state takes `&mut self`.
pub struct RlvEngine {
    pub(super) config: EngineConfig,
    parser: CommandParser,
    pub(super) store: RestrictionStore,
    pub(super) queries: Arc<dyn QueryProvider>,
    pub(super) actions: Arc<dyn ActionSink>,
}

impl RlvEngine {
    /// Create an engine with an empty store
    pub fn new(
        config: EngineConfig,
        queries: Arc<dyn QueryProvider>,
        actions: Arc<dyn ActionSink>,
    ) -> RlvResult<Self> {
        Ok(Self {
            config,
            parser: CommandParser::new()?,
            store: RestrictionStore::new(),
            queries,
            actions,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active restrictions
    pub fn restrictions(&self) -> &RestrictionStore {
        &self.store
    }

    /// Permission queries against the current store
    pub fn permissions(&self) -> PermissionEvaluator<'_> {
        PermissionEvaluator::new(&self.store)
    }

    /// Take the add/remove events queued since the last call
    pub fn drain_events(&mut self) -> Vec<RestrictionEvent> {
        self.store.drain_events()
    }

    /// Folder locks for a fresh shared-folder snapshot
    pub async fn folder_locks(&self, cancel: &CancellationToken) -> FolderLocks {
        match self.fetch_tree(cancel).await {
            Some(tree) => FolderLocks::compute(&tree, &self.store),
            None => FolderLocks::empty(),
        }
    }

    /// Whether `item` may be attached (to `point`, if given) right now
    pub async fn can_attach_item(
        &self,
        item: &InventoryItem,
        point: Option<AttachmentPoint>,
        cancel: &CancellationToken,
    ) -> bool {
        let tree = self.fetch_tree(cancel).await;
        let locks = match &tree {
            Some(tree) => FolderLocks::compute(tree, &self.store),
            None => FolderLocks::empty(),
        };
        let point = point.or_else(|| item.attach_point_in(tree.as_ref()));
        self.permissions().can_attach_item(item, point, &locks)
    }

    /// Whether `item` may be detached or taken off right now
    pub async fn can_detach_item(&self, item: &InventoryItem, cancel: &CancellationToken) -> bool {
        let locks = self.folder_locks(cancel).await;
        self.permissions().can_detach_item(item, &locks)
    }

    /// Process one chat message from `sender`.
    ///
    /// Returns `true` iff every command in the message parsed and executed.
    /// Commands run in order; a failing command does not undo earlier ones.
    pub async fn process_message(
        &mut self,
        message: &str,
        sender: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> bool {
        if let Err(e) = self.ensure_enabled() {
            tracing::debug!("[RlvEngine] Ignoring message from {}: {}", sender, e);
            return false;
        }

        let Some(texts) = self.parser.split(message) else {
            return false;
        };
        let mut all_ok = true;
        for text in texts {
            if cancel.is_cancelled() {
                tracing::info!("[RlvEngine] Cancelled before '{}'", text);
                return false;
            }

            let result = match self.parser.parse(text) {
                Ok(cmd) => self.execute(&cmd, sender, sender_name, cancel).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                if e.is_parse_error() {
                    tracing::debug!("[RlvEngine] Rejected '{}' from {}: {}", text, sender, e);
                } else {
                    tracing::warn!("[RlvEngine] '{}' from {} failed: {}", text, sender, e);
                }
                all_ok = false;
            }
        }
        all_ok
    }

    pub(super) fn ensure_enabled(&self) -> RlvResult<()> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(RlvError::Disabled)
        }
    }

    async fn execute(
        &mut self,
        cmd: &ParsedCommand,
        sender: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        if self.config.is_blacklisted(cmd.command.name())
            || self.config.is_blacklisted(&cmd.display_name())
        {
            return Err(RlvError::Blacklisted(cmd.display_name()));
        }

        match &cmd.action {
            CommandAction::Add => self.add(cmd, sender, sender_name, cancel).await,
            CommandAction::Remove => self.remove(cmd, sender, sender_name, cancel).await,
            CommandAction::Clear(filter) => {
                self.clear(sender, filter.as_deref(), cancel).await;
                Ok(())
            }
            CommandAction::Force => self.force(cmd, sender, cancel).await,
            CommandAction::Reply(channel) => self.reply(cmd, *channel, sender, cancel).await,
        }
    }

    async fn add(
        &mut self,
        cmd: &ParsedCommand,
        sender: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        let entry = Restriction::from_command(cmd, sender, sender_name)?;
        let echo = format!("/{}={}", entry.status_key(), cmd.behavior);
        if self.store.apply(entry) {
            self.notify(&self.notify_targets(), &[echo], cancel).await;
        }
        Ok(())
    }

    async fn remove(
        &mut self,
        cmd: &ParsedCommand,
        sender: Uuid,
        sender_name: &str,
        cancel: &CancellationToken,
    ) -> RlvResult<()> {
        let identity = Restriction::from_command(cmd, sender, sender_name)?;
        if let Some(removed) =
            self.store
                .remove(identity.command, sender, identity.param.as_deref())
        {
            tracing::debug!("[RlvEngine] Removed {}", removed.status_key());
            let echo = format!("/{}={}", identity.status_key(), cmd.behavior);
            self.notify(&self.notify_targets(), &[echo], cancel).await;
        }
        Ok(())
    }

    async fn clear(&mut self, sender: Uuid, filter: Option<&str>, cancel: &CancellationToken) {
        let targets = self.notify_targets();
        let removed = self.store.clear_sender(sender, filter);
        tracing::debug!(
            "[RlvEngine] Cleared {} entries from {}",
            removed.len(),
            sender
        );

        let mut echoes: Vec<String> = removed
            .iter()
            .map(|r| format!("/{}=y", r.status_key()))
            .collect();
        echoes.push(match filter {
            Some(f) => format!("/clear:{}", f),
            None => "/clear".to_string(),
        });
        self.notify(&targets, &echoes, cancel).await;
    }

    /// Notify channels currently registered, from any sender
    fn notify_targets(&self) -> Vec<NotifyTarget> {
        self.store
            .query(RlvCommand::Notify)
            .iter()
            .filter_map(|r| r.param.as_deref().and_then(NotifyTarget::parse))
            .collect()
    }

    async fn notify(&self, targets: &[NotifyTarget], echoes: &[String], cancel: &CancellationToken) {
        for target in targets {
            for echo in echoes.iter().filter(|e| target.accepts(e)) {
                if let Err(e) = self.actions.send_reply(target.channel, echo, cancel).await {
                    tracing::warn!(
                        "[RlvEngine] Notify on channel {} failed: {}",
                        target.channel,
                        e
                    );
                }
            }
        }
    }

    /// Shared folder snapshot; query failures count as "no folder"
    pub(super) async fn fetch_tree(&self, cancel: &CancellationToken) -> Option<InventoryTree> {
        match self.queries.shared_folder(cancel).await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("[RlvEngine] Shared folder query failed: {}", e);
                None
            }
        }
    }

    /// Current outfit; query failures count as "nothing worn"
    pub(super) async fn fetch_outfit(&self, cancel: &CancellationToken) -> Vec<InventoryItem> {
        match self.queries.current_outfit(cancel).await {
            Ok(outfit) => outfit,
            Err(e) => {
                tracing::warn!("[RlvEngine] Outfit query failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostAction, MemoryHost};

    fn engine_with(config: EngineConfig, host: &Arc<MemoryHost>) -> RlvEngine {
        RlvEngine::new(config, host.clone(), host.clone()).unwrap()
    }

    fn setup() -> (RlvEngine, Arc<MemoryHost>, CancellationToken) {
        let host = Arc::new(MemoryHost::new());
        (
            engine_with(EngineConfig::default(), &host),
            host,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let (mut engine, _, cancel) = setup();
        let collar = Uuid::new_v4();

        assert!(engine.process_message("@fly=n,tplm=add", collar, "Collar", &cancel).await);
        assert!(!engine.permissions().can_fly());
        assert!(!engine.permissions().can_tp_landmark());
        assert_eq!(engine.restrictions().for_sender(collar)[0].sender_name, "Collar");

        assert!(engine.process_message("@fly=y,tplm=rem", collar, "Collar", &cancel).await);
        assert!(engine.permissions().can_fly());
        assert!(engine.restrictions().is_empty());
    }

    #[tokio::test]
    async fn test_removal_from_other_sender_is_noop() {
        let (mut engine, _, cancel) = setup();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        engine.process_message("@fly=n", a, "A", &cancel).await;
        assert!(engine.process_message("@fly=y", b, "B", &cancel).await);
        assert!(!engine.permissions().can_fly());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_earlier_commands() {
        let (mut engine, _, cancel) = setup();
        let sender = Uuid::new_v4();

        let ok = engine
            .process_message("@fly=n,levitate=n,detach:nowhere=n,jump=n", sender, "", &cancel)
            .await;
        assert!(!ok);
        assert!(!engine.permissions().can_fly());
        assert!(!engine.permissions().can_jump());
        assert_eq!(engine.restrictions().len(), 2);
    }

    #[tokio::test]
    async fn test_not_a_command() {
        let (mut engine, host, cancel) = setup();
        assert!(!engine.process_message("hello", Uuid::new_v4(), "", &cancel).await);
        assert!(host.actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_notify_echoes_changes_only() {
        let (mut engine, host, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@notify:2222=add", sender, "", &cancel).await;
        host.clear_actions().await;

        engine.process_message("@fly=n", sender, "", &cancel).await;
        engine.process_message("@fly=n", sender, "", &cancel).await;
        engine.process_message("@fly=y", sender, "", &cancel).await;
        engine.process_message("@fly=y", sender, "", &cancel).await;

        assert_eq!(
            host.replies().await,
            vec![(2222, "/fly=n".to_string()), (2222, "/fly=y".to_string())]
        );
    }

    #[tokio::test]
    async fn test_echo_keeps_option_case() {
        let (mut engine, host, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@notify:2222=add", sender, "", &cancel).await;
        host.clear_actions().await;

        assert!(engine.process_message("@sendim:Builders=add", sender, "", &cancel).await);
        assert!(engine.process_message("@sendim:BUILDERS=add", sender, "", &cancel).await);
        assert_eq!(engine.restrictions().all().len(), 2);
        assert!(engine.process_message("@sendim:builders=rem", sender, "", &cancel).await);
        assert_eq!(engine.restrictions().all().len(), 1);

        assert_eq!(
            host.replies().await,
            vec![
                (2222, "/sendim:Builders=add".to_string()),
                (2222, "/sendim:builders=rem".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_notify_filter() {
        let (mut engine, host, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@notify:-7;tp=add", sender, "", &cancel).await;
        engine.process_message("@fly=n,tplm=n,tploc=n", sender, "", &cancel).await;

        assert_eq!(
            host.replies().await,
            vec![(-7, "/tplm=n".to_string()), (-7, "/tploc=n".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unparsable_commands_are_not_echoed() {
        let (mut engine, host, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@notify:2222=add", sender, "", &cancel).await;
        host.clear_actions().await;

        assert!(!engine.process_message("@fly=maybe", sender, "", &cancel).await);
        assert!(host.actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_with_filter() {
        let (mut engine, host, cancel) = setup();
        let (sender, other) = (Uuid::new_v4(), Uuid::new_v4());

        engine
            .process_message("@notify:2222=add,detach:spine=n,fly=n", sender, "", &cancel)
            .await;
        engine.process_message("@fly=n", other, "", &cancel).await;
        host.clear_actions().await;

        assert!(engine.process_message("@clear=fl", sender, "", &cancel).await);
        assert_eq!(
            host.replies().await,
            vec![(2222, "/fly=y".to_string()), (2222, "/clear:fl".to_string())]
        );
        assert_eq!(engine.restrictions().for_sender(sender).len(), 2);
        assert!(!engine.permissions().can_fly());
    }

    #[tokio::test]
    async fn test_clear_echoes_to_channels_registered_before() {
        let (mut engine, host, cancel) = setup();
        let sender = Uuid::new_v4();

        engine
            .process_message("@notify:2222=add,detach:spine=n", sender, "", &cancel)
            .await;
        host.clear_actions().await;

        assert!(engine.process_message("@clear", sender, "", &cancel).await);
        assert_eq!(
            host.replies().await,
            vec![
                (2222, "/notify:2222=y".to_string()),
                (2222, "/detach:spine=y".to_string()),
                (2222, "/clear".to_string()),
            ]
        );
        assert!(engine.restrictions().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_then_clear_then_readd() {
        let (mut engine, _, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@detach=n", sender, "", &cancel).await;
        engine.process_message("@detach=n", sender, "", &cancel).await;
        assert_eq!(engine.restrictions().len(), 1);

        engine.process_message("@clear", sender, "", &cancel).await;
        assert!(engine.restrictions().is_empty());

        engine.process_message("@detach=n", sender, "", &cancel).await;
        assert_eq!(engine.restrictions().query(RlvCommand::Detach).len(), 1);
        assert_eq!(engine.restrictions().len(), 1);
    }

    #[tokio::test]
    async fn test_camera_aggregate_through_messages() {
        let (mut engine, _, cancel) = setup();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        engine.process_message("@camzoommin:3.5=n", a, "", &cancel).await;
        engine.process_message("@camzoommin:4.5=n", b, "", &cancel).await;
        engine.process_message("@camzoommin:1.5=n", c, "", &cancel).await;
        assert_eq!(engine.permissions().camera_restrictions().zoom_min, Some(4.5));

        engine.process_message("@camzoommin:8.5=n", c, "", &cancel).await;
        assert_eq!(engine.permissions().camera_restrictions().zoom_min, Some(8.5));
        engine.process_message("@camzoommin:8.5=y", c, "", &cancel).await;
        assert_eq!(engine.permissions().camera_restrictions().zoom_min, Some(4.5));
    }

    #[tokio::test]
    async fn test_blacklisted_command_fails() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine_with(EngineConfig::new().with_blacklist(["fly"]), &host);
        let cancel = CancellationToken::new();

        assert!(!engine.process_message("@fly=n", Uuid::new_v4(), "", &cancel).await);
        assert!(engine.permissions().can_fly());
        assert!(engine.process_message("@jump=n", Uuid::new_v4(), "", &cancel).await);
    }

    #[tokio::test]
    async fn test_disabled_engine_ignores_everything() {
        let host = Arc::new(MemoryHost::new());
        let mut engine = engine_with(EngineConfig::new().with_enabled(false), &host);
        let cancel = CancellationToken::new();

        assert!(matches!(engine.ensure_enabled(), Err(RlvError::Disabled)));
        assert!(!engine.process_message("@fly=n", Uuid::new_v4(), "", &cancel).await);
        assert!(engine.restrictions().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_message_stops() {
        let (mut engine, _, cancel) = setup();
        cancel.cancel();
        assert!(!engine.process_message("@fly=n", Uuid::new_v4(), "", &cancel).await);
        assert!(engine.restrictions().is_empty());
    }

    #[tokio::test]
    async fn test_drain_events() {
        let (mut engine, _, cancel) = setup();
        let sender = Uuid::new_v4();

        engine.process_message("@fly=n,fly=y", sender, "", &cancel).await;
        let events = engine.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], RestrictionEvent::Added(r) if r.command == RlvCommand::Fly));
        assert!(matches!(&events[1], RestrictionEvent::Removed(_)));
        assert!(engine.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_folder_locks_follow_snapshot() {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let outfit = tree.add_folder(root, "Outfit").unwrap();
        let collar_item = InventoryItem::object(Uuid::new_v4(), "Collar");
        let sender = Uuid::new_v4();
        tree.add_item(
            outfit,
            collar_item
                .clone()
                .attached(AttachmentPoint::Neck, sender),
        );

        let host = Arc::new(MemoryHost::new().with_tree(tree));
        let mut engine = engine_with(EngineConfig::default(), &host);
        let cancel = CancellationToken::new();

        engine.process_message("@detachthis=n", sender, "", &cancel).await;
        let locks = engine.folder_locks(&cancel).await;
        assert!(!locks.can_detach(outfit));
        assert!(locks.can_attach(outfit));

        host.set_tree(None).await;
        assert!(engine.folder_locks(&cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_attach_check_uses_folder_point_tag() {
        let root = Uuid::new_v4();
        let mut tree = InventoryTree::new(root, "#RLV");
        let hats = tree.add_folder(root, "Hats (skull)").unwrap();
        let mut cap = InventoryItem::object(Uuid::new_v4(), "Cap");
        tree.add_item(hats, cap.clone());
        cap.folder_id = hats;

        let host = Arc::new(MemoryHost::new().with_tree(tree));
        let mut engine = engine_with(EngineConfig::default(), &host);
        let cancel = CancellationToken::new();

        assert!(engine.can_attach_item(&cap, None, &cancel).await);
        engine
            .process_message("@addattach:skull=n", Uuid::new_v4(), "", &cancel)
            .await;
        assert!(!engine.can_attach_item(&cap, None, &cancel).await);
        assert!(
            engine
                .can_attach_item(&cap, Some(AttachmentPoint::Spine), &cancel)
                .await
        );
    }

    #[tokio::test]
    async fn test_failing_notify_does_not_fail_command() {
        let host = Arc::new(MemoryHost::new().failing());
        let mut engine = engine_with(EngineConfig::default(), &host);
        let cancel = CancellationToken::new();
        let sender = Uuid::new_v4();

        assert!(engine.process_message("@notify:2222=add,fly=n", sender, "", &cancel).await);
        assert!(!host
            .actions()
            .await
            .iter()
            .any(|a| matches!(a, HostAction::Reply { .. })));
    }
}
