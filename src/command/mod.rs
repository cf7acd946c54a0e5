//! Command grammar
//!
//! This module provides:
//! - `RlvCommand` - closed set of canonical command ids with a synonym table
//! - `CommandParser` - splits `@a=n,b:opt=2222` messages into `ParsedCommand`s

mod kind;
mod parser;

pub use kind::{
    CommandName, OptionKind, RlvCommand, DEFAULT_TOUCH_DISTANCE, DEFAULT_TPLOCAL_DISTANCE,
};
pub use parser::{parse_channel, CommandAction, CommandParser, ParsedCommand};
