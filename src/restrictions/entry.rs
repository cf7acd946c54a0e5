//! Restriction entries
//!
//! A `Restriction` is one `@cmd[:param]=n` (or `=add`) from one sender. Its
//! identity is `(command, sender, param)`; the parsed `behavior` is derived
//! from the option once, when the entry is built.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{parse_channel, OptionKind, ParsedCommand, RlvCommand};
use crate::core::{AttachmentPoint, RlvError, RlvResult, WearableType};

/// Which end of a numeric range a restriction bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremumKind {
    /// Lower bound; the largest value is the most restrictive
    Min,
    /// Upper bound; the smallest value is the most restrictive
    Max,
}

/// Parsed value carried by a restriction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RestrictionBehavior {
    /// Plain presence check
    Blanket,
    /// Numeric bound aggregated across senders
    NumericExtremum {
        /// Bound direction
        kind: ExtremumKind,
        /// Bound value
        value: f32,
    },
    /// Several numbers (e.g. an RGB color)
    ScalarSet {
        /// The values in option order
        values: Vec<f32>,
    },
    /// Chat channels (redirects, channel exceptions)
    ChannelList {
        /// Channel numbers
        channels: Vec<i32>,
    },
}

/// One active restriction or exception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    /// Canonical command id
    pub command: RlvCommand,
    /// Parsed option value
    pub behavior: RestrictionBehavior,
    /// Object that issued the command
    pub sender: Uuid,
    /// Display name of the issuing object
    pub sender_name: String,
    /// Normalized option text; part of the identity
    pub param: Option<String>,
    /// Option text as sent, echoed back by status queries and notify
    #[serde(default)]
    pub option_text: Option<String>,
    /// Whether this entry lifts a restriction rather than imposing one
    pub is_exception: bool,
    /// Whether exceptions only count from this entry's own sender
    pub is_secure: bool,
    /// Insertion sequence assigned by the store
    #[serde(default)]
    pub sequence: u64,
}

impl Restriction {
    /// Create a blanket restriction
    pub fn blanket(command: RlvCommand, sender: Uuid) -> Self {
        Self {
            command,
            behavior: RestrictionBehavior::Blanket,
            sender,
            sender_name: String::new(),
            param: None,
            option_text: None,
            is_exception: false,
            is_secure: command.is_secure(),
            sequence: 0,
        }
    }

    /// Build an entry from a parsed `=n|y|add|rem` command.
    ///
    /// Removal commands are built the same way so their identity matches.
    pub fn from_command(cmd: &ParsedCommand, sender: Uuid, sender_name: &str) -> RlvResult<Self> {
        let name = cmd.command.name();
        let option = cmd.option().map(str::trim);
        let invalid = |o: &str| RlvError::invalid_option(name, o);

        let mut entry = Self::blanket(cmd.command, sender);
        entry.sender_name = sender_name.to_string();
        entry.param = option.map(str::to_string);
        entry.option_text = entry.param.clone();

        match cmd.command.option_kind() {
            OptionKind::None | OptionKind::Value | OptionKind::Folder => {}
            OptionKind::Exception => {
                entry.param = option.map(str::to_lowercase);
                entry.is_exception = option.is_some();
            }
            OptionKind::Target => {
                entry.param = option.map(str::to_lowercase);
            }
            OptionKind::ChannelException => {
                if let Some(o) = option {
                    let channel: i32 = o.parse().map_err(|_| invalid(o))?;
                    entry.behavior = RestrictionBehavior::ChannelList {
                        channels: vec![channel],
                    };
                    entry.param = Some(channel.to_string());
                    entry.is_exception = true;
                }
            }
            OptionKind::Point => {
                if let Some(o) = option {
                    let point = AttachmentPoint::from_name(o).ok_or_else(|| invalid(o))?;
                    entry.param = Some(point.name().to_string());
                }
            }
            OptionKind::Layer => {
                if let Some(o) = option {
                    let layer = WearableType::from_name(o).ok_or_else(|| invalid(o))?;
                    entry.param = Some(layer.name().to_string());
                }
            }
            kind @ (OptionKind::Min | OptionKind::Max) => {
                let o = option.ok_or_else(|| invalid(""))?;
                let value: f32 = o.parse().map_err(|_| invalid(o))?;
                entry.behavior = RestrictionBehavior::NumericExtremum {
                    kind: if kind == OptionKind::Min {
                        ExtremumKind::Min
                    } else {
                        ExtremumKind::Max
                    },
                    value,
                };
            }
            OptionKind::Threshold(default) => {
                let value = match option {
                    Some(o) => o.parse::<f32>().map_err(|_| invalid(o))?,
                    None => default,
                };
                entry.behavior = RestrictionBehavior::NumericExtremum {
                    kind: ExtremumKind::Max,
                    value,
                };
            }
            OptionKind::Color => {
                let o = option.ok_or_else(|| invalid(""))?;
                let values = o
                    .split(';')
                    .map(|v| v.trim().parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid(o))?;
                if values.len() != 3 {
                    return Err(invalid(o));
                }
                entry.behavior = RestrictionBehavior::ScalarSet { values };
            }
            OptionKind::Channel => {
                let o = option.ok_or_else(|| invalid(""))?;
                let channel = parse_channel(o).map_err(|_| invalid(o))?;
                entry.behavior = RestrictionBehavior::ChannelList {
                    channels: vec![channel],
                };
                entry.param = Some(channel.to_string());
            }
            OptionKind::FolderException => {
                let o = option.ok_or_else(|| invalid(""))?;
                entry.param = Some(o.to_string());
                entry.is_exception = true;
            }
            OptionKind::Notify => {
                let o = option.ok_or_else(|| invalid(""))?;
                NotifyTarget::parse(o).ok_or_else(|| invalid(o))?;
            }
        }

        Ok(entry)
    }

    /// Set the sender display name
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// Set the param
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// Mark as an exception
    pub fn as_exception(mut self) -> Self {
        self.is_exception = true;
        self
    }

    /// `name[:option]` as reported by status queries and notify echoes
    pub fn status_key(&self) -> String {
        match self.option_text.as_ref().or(self.param.as_ref()) {
            Some(param) => format!("{}:{}", self.command.name(), param),
            None => self.command.name().to_string(),
        }
    }

    /// Whether this entry has the identity `(command, sender, param)`
    pub fn matches(&self, command: RlvCommand, sender: Uuid, param: Option<&str>) -> bool {
        self.command == command && self.sender == sender && self.param.as_deref() == param
    }

    /// Numeric value of an extremum entry
    pub fn numeric_value(&self) -> Option<f32> {
        match self.behavior {
            RestrictionBehavior::NumericExtremum { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A registered `@notify` channel and filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyTarget {
    /// Channel that receives echoes
    pub channel: i32,
    /// Substring an echo must contain (empty = everything)
    pub filter: String,
}

impl NotifyTarget {
    /// Parse `channel[;filter]`
    pub fn parse(option: &str) -> Option<Self> {
        let (channel, filter) = match option.split_once(';') {
            Some((c, f)) => (c, f),
            None => (option, ""),
        };
        let channel = parse_channel(channel).ok()?;
        Some(Self {
            channel,
            filter: filter.to_string(),
        })
    }

    /// Whether `echo` passes the filter
    pub fn accepts(&self, echo: &str) -> bool {
        self.filter.is_empty() || echo.contains(&self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandParser;

    fn build(text: &str) -> RlvResult<Restriction> {
        let cmd = CommandParser::new().unwrap().parse(text).unwrap();
        Restriction::from_command(&cmd, Uuid::nil(), "Collar")
    }

    #[test]
    fn test_blanket() {
        let r = build("sendchat=n").unwrap();
        assert_eq!(r.behavior, RestrictionBehavior::Blanket);
        assert!(!r.is_exception);
        assert_eq!(r.status_key(), "sendchat");
        assert_eq!(r.sender_name, "Collar");
    }

    #[test]
    fn test_exception_and_secure() {
        let r = build("sendim:ABC=add").unwrap();
        assert!(r.is_exception);
        assert_eq!(r.param.as_deref(), Some("abc"));

        let r = build("sendim_sec=n").unwrap();
        assert!(r.is_secure);
        assert!(!r.is_exception);
    }

    #[test]
    fn test_status_key_keeps_sent_text() {
        let r = build("sendim:Builders=add").unwrap();
        assert_eq!(r.param.as_deref(), Some("builders"));
        assert_eq!(r.status_key(), "sendim:Builders");

        let r = Restriction::blanket(RlvCommand::Detach, Uuid::nil()).with_param("spine");
        assert_eq!(r.status_key(), "detach:spine");
    }

    #[test]
    fn test_point_is_normalized() {
        let r = build("detach:Left Hand=n").unwrap();
        assert_eq!(r.param.as_deref(), Some("left hand"));
        assert_eq!(r.status_key(), "detach:Left Hand");
        assert!(build("detach:elbow=n").is_err());
        assert!(build("remoutfit:hat=n").is_err());
    }

    #[test]
    fn test_numeric() {
        let r = build("camzoommin:3.5=n").unwrap();
        assert_eq!(
            r.behavior,
            RestrictionBehavior::NumericExtremum {
                kind: ExtremumKind::Min,
                value: 3.5
            }
        );
        assert!(build("camzoommin=n").is_err());
        assert!(build("camzoommin:wide=n").is_err());

        let r = build("sittp=n").unwrap();
        assert_eq!(r.numeric_value(), Some(1.5));
        assert!(r.param.is_none());
    }

    #[test]
    fn test_color_and_channels() {
        let r = build("camdrawcolor:1;0;0.5=n").unwrap();
        assert_eq!(
            r.behavior,
            RestrictionBehavior::ScalarSet {
                values: vec![1.0, 0.0, 0.5]
            }
        );
        assert!(build("camdrawcolor:1;0=n").is_err());

        let r = build("redirchat:5=n").unwrap();
        assert_eq!(r.behavior, RestrictionBehavior::ChannelList { channels: vec![5] });

        let r = build("sendchannel:7=add").unwrap();
        assert!(r.is_exception);
        let r = build("sendchannel=n").unwrap();
        assert!(!r.is_exception);
    }

    #[test]
    fn test_notify_target() {
        assert!(build("notify:2222;detach=add").is_ok());
        assert!(build("notify:0=add").is_err());
        assert!(build("notify=add").is_err());

        let target = NotifyTarget::parse("2222;detach").unwrap();
        assert_eq!(target.channel, 2222);
        assert!(target.accepts("/detach=n"));
        assert!(!target.accepts("/sendim=n"));
        assert!(NotifyTarget::parse("2222").unwrap().accepts("/anything"));
    }

    #[test]
    fn test_folder_exception_needs_path() {
        let r = build("detachallthis_except:Clothing/Hats=add").unwrap();
        assert!(r.is_exception);
        assert_eq!(r.param.as_deref(), Some("Clothing/Hats"));
        assert!(build("detachallthis_except=add").is_err());
    }
}
