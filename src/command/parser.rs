//! Message parsing
//!
//! A message is `@` followed by comma-separated commands, each of the form
//! `name[:option]=behavior`. Parsing is per command: a malformed command is
//! reported on its own and never affects its neighbours.

use regex::Regex;

use super::kind::RlvCommand;
use crate::core::{RlvError, RlvResult};

/// What the behavior part of a command asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// `n` or `add`
    Add,
    /// `y` or `rem`
    Remove,
    /// `force`
    Force,
    /// Reply on a non-zero channel
    Reply(i32),
    /// `@clear`, with an optional name filter
    Clear(Option<String>),
}

/// One parsed command
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    /// Canonical command id
    pub command: RlvCommand,
    /// Setting name of `getdebug_x`/`setenv_x` style commands
    pub setting: Option<String>,
    /// Text after `:`, if any
    pub option: Option<String>,
    /// Behavior token as written (`n`, `add`, `force`, `2222`, ...)
    pub behavior: String,
    /// Parsed behavior
    pub action: CommandAction,
}

impl ParsedCommand {
    /// Command name as echoed back (`setenv_daytime`, `fartouch`, ...)
    pub fn display_name(&self) -> String {
        match &self.setting {
            Some(setting) => {
                let prefix = match self.command {
                    RlvCommand::GetDebug => "getdebug_",
                    RlvCommand::GetEnv => "getenv_",
                    RlvCommand::SetDebug => "setdebug_",
                    RlvCommand::SetEnv => "setenv_",
                    other => other.name(),
                };
                format!("{}{}", prefix, setting)
            }
            None => self.command.name().to_string(),
        }
    }

    /// `name[:option]` without the behavior
    pub fn key(&self) -> String {
        match &self.option {
            Some(option) if !option.is_empty() => format!("{}:{}", self.display_name(), option),
            _ => self.display_name(),
        }
    }

    /// Option text, treating `:` with nothing after it as absent
    pub fn option(&self) -> Option<&str> {
        self.option.as_deref().filter(|o| !o.is_empty())
    }
}

/// Splits messages into commands and parses each one
#[derive(Debug, Clone)]
pub struct CommandParser {
    grammar: Regex,
}

impl CommandParser {
    /// Create a parser
    pub fn new() -> RlvResult<Self> {
        Ok(Self {
            grammar: Regex::new(r"^(?P<name>[^:=]+)(?::(?P<option>[^=]*))?(?:=(?P<behavior>.*))?$")?,
        })
    }

    /// Split a message into its command texts.
    ///
    /// Returns `None` when the message is not an RLV message at all.
    pub fn split<'a>(&self, message: &'a str) -> Option<Vec<&'a str>> {
        let body = message.trim().strip_prefix('@')?;
        Some(body.split(',').map(str::trim).collect())
    }

    /// Parse a single command text (without the leading `@`)
    pub fn parse(&self, text: &str) -> RlvResult<ParsedCommand> {
        let caps = self
            .grammar
            .captures(text)
            .ok_or_else(|| RlvError::malformed(text))?;

        let raw_name = caps
            .name("name")
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();
        let option = caps.name("option").map(|m| m.as_str().to_string());
        let behavior = caps.name("behavior").map(|m| m.as_str().trim().to_string());

        let name = RlvCommand::lookup(&raw_name)
            .ok_or_else(|| RlvError::UnknownCommand(raw_name.clone()))?;

        if name.command == RlvCommand::Clear {
            let filter = option
                .clone()
                .filter(|o| !o.is_empty())
                .or_else(|| behavior.clone().filter(|b| !b.is_empty()));
            return Ok(ParsedCommand {
                command: name.command,
                setting: None,
                option: filter.clone(),
                behavior: behavior.unwrap_or_default(),
                action: CommandAction::Clear(filter),
            });
        }

        let behavior = behavior.ok_or_else(|| RlvError::malformed(text))?;
        let action = match behavior.as_str() {
            "n" | "add" if name.accepts_restriction() => CommandAction::Add,
            "y" | "rem" if name.accepts_restriction() => CommandAction::Remove,
            "force" if name.accepts_force() => CommandAction::Force,
            token if name.accepts_query() && looks_numeric(token) => {
                CommandAction::Reply(parse_channel(token)?)
            }
            _ => return Err(RlvError::invalid_behavior(raw_name, behavior.clone())),
        };

        Ok(ParsedCommand {
            command: name.command,
            setting: name.setting,
            option,
            behavior,
            action,
        })
    }
}

fn looks_numeric(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Parse a reply channel: a non-zero `i32`
pub fn parse_channel(token: &str) -> RlvResult<i32> {
    match token.trim().parse::<i32>() {
        Ok(0) | Err(_) => Err(RlvError::InvalidChannel(token.to_string())),
        Ok(channel) => Ok(channel),
    }
}
