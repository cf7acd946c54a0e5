//! Engine configuration
//!
//! Process-wide switches and the version strings reported to scripts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::RlvResult;

/// Configuration for an `RlvEngine`
///
/// ```ignore
/// let config = EngineConfig::new()
///     .with_blacklist(["sendim", "recvim"])
///     .with_instant_messages(true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether commands are processed at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Whether `@version` / `@getblacklist` are answered over instant messages
    #[serde(default)]
    pub enable_instant_message_processing: bool,

    /// Command names that are never executed
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// `@version` reply
    #[serde(default = "default_version")]
    pub version: String,

    /// `@versionnew` reply
    #[serde(default = "default_version_new")]
    pub version_new: String,

    /// `@versionnum` reply
    #[serde(default = "default_version_num")]
    pub version_num: String,
}

fn default_enabled() -> bool {
    true
}

fn default_version() -> String {
    "RestrainedLife viewer v3.4.3 (RLVa 2.4.2)".to_string()
}

fn default_version_new() -> String {
    "RestrainedLove viewer v3.4.3 (RLVa 2.4.2)".to_string()
}

fn default_version_num() -> String {
    "3040300".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            enable_instant_message_processing: false,
            blacklist: Vec::new(),
            version: default_version(),
            version_new: default_version_new(),
            version_num: default_version_num(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> RlvResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> RlvResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Enable or disable command processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable instant-message queries
    pub fn with_instant_messages(mut self, enabled: bool) -> Self {
        self.enable_instant_message_processing = enabled;
        self
    }

    /// Replace the blacklist
    pub fn with_blacklist<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = commands
            .into_iter()
            .map(|c| c.into().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Set the `@version` reply
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Whether a command name is blacklisted
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.iter().any(|b| b == name)
    }

    /// `@versionnumbl` reply: the version number, then the blacklist
    pub fn version_num_bl(&self) -> String {
        if self.blacklist.is_empty() {
            self.version_num.clone()
        } else {
            format!("{},{}", self.version_num, self.blacklist.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.enabled);
        assert!(!config.enable_instant_message_processing);
        assert_eq!(config.version_num, "3040300");
        assert_eq!(config.version_num_bl(), "3040300");
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_blacklist(["SendIM", " fly ", ""])
            .with_instant_messages(true)
            .with_enabled(false);
        assert_eq!(config.blacklist, vec!["sendim", "fly"]);
        assert!(config.is_blacklisted("fly"));
        assert!(!config.is_blacklisted("jump"));
        assert_eq!(config.version_num_bl(), "3040300,sendim,fly");
        assert!(config.enable_instant_message_processing);
        assert!(!config.enabled);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"blacklist": ["tplm"]}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.blacklist, vec!["tplm"]);
        assert_eq!(config.version, default_version());

        assert!(EngineConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"enabled": false, "version_num": "2090000"}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.version_num, "2090000");
        assert!(EngineConfig::load("/nonexistent/rlv.json").is_err());
    }
}
