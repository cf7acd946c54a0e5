//! Engine error types

use thiserror::Error;

/// Errors that can occur while parsing or executing RLV commands
#[derive(Error, Debug)]
pub enum RlvError {
    /// Message or command does not follow `@cmd[:param]=behavior`
    #[error("Malformed command: {0}")]
    Malformed(String),

    /// Command name is not part of the protocol
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Behavior token not accepted by the command
    #[error("Invalid behavior '{behavior}' for command {command}")]
    InvalidBehavior {
        /// Canonical command name
        command: String,
        /// The rejected behavior token
        behavior: String,
    },

    /// Reply channel is zero or outside the i32 range
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    /// Option (the part after ':') could not be parsed
    #[error("Invalid option '{option}' for command {command}")]
    InvalidOption {
        /// Canonical command name
        command: String,
        /// The rejected option text
        option: String,
    },

    /// Command is on the configured blacklist
    #[error("Command blacklisted: {0}")]
    Blacklisted(String),

    /// Processing is disabled by configuration
    #[error("RLV processing disabled")]
    Disabled,

    /// A force command could not resolve its target
    #[error("Unresolved target: {0}")]
    Unresolved(String),

    /// The host action sink reported a failure
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Command grammar pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl RlvError {
    /// Create a malformed-command error
    pub fn malformed(msg: impl Into<String>) -> Self {
        RlvError::Malformed(msg.into())
    }

    /// Create an invalid-option error
    pub fn invalid_option(command: impl Into<String>, option: impl Into<String>) -> Self {
        RlvError::InvalidOption {
            command: command.into(),
            option: option.into(),
        }
    }

    /// Create an invalid-behavior error
    pub fn invalid_behavior(command: impl Into<String>, behavior: impl Into<String>) -> Self {
        RlvError::InvalidBehavior {
            command: command.into(),
            behavior: behavior.into(),
        }
    }

    /// Wrap a collaborator failure from the action sink
    pub fn action(err: impl std::fmt::Display) -> Self {
        RlvError::ActionFailed(err.to_string())
    }

    /// Whether this error came from the grammar layer (no side effects happened)
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            RlvError::Malformed(_)
                | RlvError::UnknownCommand(_)
                | RlvError::InvalidBehavior { .. }
                | RlvError::InvalidChannel(_)
                | RlvError::InvalidOption { .. }
        )
    }
}

/// Result type alias for engine operations
pub type RlvResult<T> = Result<T, RlvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RlvError::UnknownCommand("flyy".into());
        assert_eq!(err.to_string(), "Unknown command: flyy");

        let err = RlvError::invalid_behavior("detach", "maybe");
        assert_eq!(err.to_string(), "Invalid behavior 'maybe' for command detach");

        let err = RlvError::Disabled;
        assert_eq!(err.to_string(), "RLV processing disabled");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RlvError = json_err.into();
        assert!(matches!(err, RlvError::Serialization(_)));
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(RlvError::InvalidChannel("0".into()).is_parse_error());
        assert!(RlvError::invalid_option("getoutfit", "hat").is_parse_error());
        assert!(!RlvError::action("boom").is_parse_error());
        assert!(!RlvError::Blacklisted("sendim".into()).is_parse_error());
    }
}
