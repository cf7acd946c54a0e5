//! Sender-scoped restriction storage

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::entry::{ExtremumKind, Restriction, RestrictionBehavior};
use crate::command::RlvCommand;

/// A change to the store, queued for the host to drain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "restriction")]
pub enum RestrictionEvent {
    /// An entry was added
    Added(Restriction),
    /// An entry was removed
    Removed(Restriction),
}

/// Active restrictions keyed by canonical command
///
/// No two entries share `(command, sender, param)`.
#[derive(Debug, Default)]
pub struct RestrictionStore {
    entries: HashMap<RlvCommand, Vec<Restriction>>,
    sequence: u64,
    events: Vec<RestrictionEvent>,
}

impl RestrictionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `false` if an identical entry already exists.
    pub fn apply(&mut self, mut restriction: Restriction) -> bool {
        let list = self.entries.entry(restriction.command).or_default();
        if list.iter().any(|r| {
            r.matches(
                restriction.command,
                restriction.sender,
                restriction.param.as_deref(),
            )
        }) {
            return false;
        }

        self.sequence += 1;
        restriction.sequence = self.sequence;
        debug!(
            "[RestrictionStore] + {} from {}",
            restriction.status_key(),
            restriction.sender
        );
        list.push(restriction.clone());
        self.events.push(RestrictionEvent::Added(restriction));
        true
    }

    /// Remove the entry with this identity, if present
    pub fn remove(
        &mut self,
        command: RlvCommand,
        sender: Uuid,
        param: Option<&str>,
    ) -> Option<Restriction> {
        let list = self.entries.get_mut(&command)?;
        let index = list.iter().position(|r| r.matches(command, sender, param))?;
        let removed = list.remove(index);
        if list.is_empty() {
            self.entries.remove(&command);
        }

        debug!(
            "[RestrictionStore] - {} from {}",
            removed.status_key(),
            removed.sender
        );
        self.events.push(RestrictionEvent::Removed(removed.clone()));
        Some(removed)
    }

    /// Entries for exactly this command, in insertion order
    pub fn query(&self, command: RlvCommand) -> &[Restriction] {
        self.entries.get(&command).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entries for a command and its `_sec` variant
    pub fn family(&self, command: RlvCommand) -> impl Iterator<Item = &Restriction> {
        let base = command.family();
        self.query(base)
            .iter()
            .chain(base.secure_variant().into_iter().flat_map(|v| self.query(v)))
    }

    /// Whether any entry exists for this command
    pub fn has(&self, command: RlvCommand) -> bool {
        !self.query(command).is_empty()
    }

    /// Most restrictive live value of a numeric command.
    ///
    /// Min families take the largest value, Max families the smallest.
    pub fn aggregate_extremum(&self, command: RlvCommand) -> Option<f32> {
        self.query(command)
            .iter()
            .filter_map(|r| match r.behavior {
                RestrictionBehavior::NumericExtremum { kind, value } => Some((kind, value)),
                _ => None,
            })
            .fold(None, |acc: Option<f32>, (kind, value)| {
                Some(match (acc, kind) {
                    (None, _) => value,
                    (Some(a), ExtremumKind::Min) => a.max(value),
                    (Some(a), ExtremumKind::Max) => a.min(value),
                })
            })
    }

    /// Values of the most recently added `ScalarSet` entry
    pub fn latest_values(&self, command: RlvCommand) -> Option<&[f32]> {
        self.query(command)
            .iter()
            .filter_map(|r| match &r.behavior {
                RestrictionBehavior::ScalarSet { values } => Some((r.sequence, values)),
                _ => None,
            })
            .max_by_key(|(seq, _)| *seq)
            .map(|(_, values)| values.as_slice())
    }

    /// Union of all channels held by a channel-list command
    pub fn channels(&self, command: RlvCommand) -> Vec<i32> {
        let mut channels: Vec<i32> = Vec::new();
        for r in self.query(command) {
            if let RestrictionBehavior::ChannelList { channels: list } = &r.behavior {
                for ch in list {
                    if !channels.contains(ch) {
                        channels.push(*ch);
                    }
                }
            }
        }
        channels
    }

    /// Remove every entry from `sender` whose command name contains `filter`.
    ///
    /// Returns the removed entries in insertion order.
    pub fn clear_sender(&mut self, sender: Uuid, filter: Option<&str>) -> Vec<Restriction> {
        let doomed: Vec<(RlvCommand, Option<String>)> = self
            .for_sender(sender)
            .into_iter()
            .filter(|r| filter.map_or(true, |f| r.command.name().contains(f)))
            .map(|r| (r.command, r.param.clone()))
            .collect();

        doomed
            .into_iter()
            .filter_map(|(command, param)| self.remove(command, sender, param.as_deref()))
            .collect()
    }

    /// Distinct senders with at least one entry
    pub fn senders(&self) -> Vec<Uuid> {
        let mut senders: Vec<Uuid> = Vec::new();
        for r in self.all() {
            if !senders.contains(&r.sender) {
                senders.push(r.sender);
            }
        }
        senders
    }

    /// Every entry in insertion order
    pub fn all(&self) -> Vec<&Restriction> {
        let mut all: Vec<&Restriction> = self.entries.values().flatten().collect();
        all.sort_by_key(|r| r.sequence);
        all
    }

    /// Entries from one sender in insertion order
    pub fn for_sender(&self, sender: Uuid) -> Vec<&Restriction> {
        self.all()
            .into_iter()
            .filter(|r| r.sender == sender)
            .collect()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the store holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take all queued change events
    pub fn drain_events(&mut self) -> Vec<RestrictionEvent> {
        std::mem::take(&mut self.events)
    }
}
