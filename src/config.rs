//! Client configuration
//!
//! Compiled-in defaults, optionally overridden from the environment:
//! - `WORKMIND_BASE_URL` - gateway base URL
//! - `WORKMIND_AGENT_ID` - agent configuration to request
//! - `WORKMIND_LOG_DIR` - directory for log files
//! - `WORKMIND_LOG_FILTER` - tracing filter directive (`RUST_LOG` wins if set)
//! - `WORKMIND_LOG_JSON` - `1`/`true` for JSON log lines

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{ChatError, ChatResult};
use crate::gateway::GatewayConfig;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving the rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Write JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_filter() -> String {
    "workmind_chat=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Full client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gateway configuration
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    /// Set the logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Defaults overridden by `WORKMIND_*` environment variables
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("WORKMIND_BASE_URL") {
            config.gateway.base_url = base_url;
        }
        if let Some(agent_id) = lookup("WORKMIND_AGENT_ID") {
            config.gateway.agent_id = agent_id;
        }
        if let Some(log_dir) = lookup("WORKMIND_LOG_DIR") {
            config.logging.log_dir = PathBuf::from(log_dir);
        }
        if let Some(filter) = lookup("WORKMIND_LOG_FILTER") {
            config.logging.filter = filter;
        }
        if let Some(json) = lookup("WORKMIND_LOG_JSON") {
            config.logging.json = parse_flag(&json).ok_or_else(|| {
                ChatError::InvalidConfig(format!("WORKMIND_LOG_JSON must be a boolean, got '{}'", json))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ChatResult<()> {
        self.gateway.validate()?;
        if self.logging.filter.trim().is_empty() {
            return Err(ChatError::InvalidConfig("log filter is empty".into()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{DEFAULT_AGENT_ID, DEFAULT_BASE_URL};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.gateway.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gateway.agent_id, DEFAULT_AGENT_ID);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("WORKMIND_BASE_URL", "http://localhost:9000"),
            ("WORKMIND_AGENT_ID", "agents/echo.json"),
            ("WORKMIND_LOG_DIR", "/tmp/wm-logs"),
            ("WORKMIND_LOG_FILTER", "debug"),
            ("WORKMIND_LOG_JSON", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.gateway.base_url, "http://localhost:9000");
        assert_eq!(config.gateway.agent_id, "agents/echo.json");
        assert_eq!(config.logging.log_dir, PathBuf::from("/tmp/wm-logs"));
        assert_eq!(config.logging.filter, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let result = ChatConfig::from_lookup(lookup_from(&[("WORKMIND_AGENT_ID", "")]));
        assert!(matches!(result, Err(ChatError::InvalidConfig(_))));

        let result = ChatConfig::from_lookup(lookup_from(&[("WORKMIND_LOG_JSON", "maybe")]));
        assert!(matches!(result, Err(ChatError::InvalidConfig(_))));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: ChatConfig =
            serde_json::from_str(r#"{"logging": {"json": true}}"#).unwrap();
        assert_eq!(config.gateway, GatewayConfig::default());
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "workmind_chat=info");
    }
}
