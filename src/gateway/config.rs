//! Gateway connection configuration

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::core::{ChatError, ChatResult};

/// Gateway used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://wm-gateway-613708618361.us-central1.run.app";

/// Agent configuration requested when nothing else is configured
pub const DEFAULT_AGENT_ID: &str = "agents/adder.json";

/// Where to reach the gateway and which agent to talk to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g., "https://gateway.example.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Agent configuration identifier sent with the handshake
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_agent_id() -> String {
    DEFAULT_AGENT_ID.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            agent_id: default_agent_id(),
        }
    }
}

impl GatewayConfig {
    /// Create a gateway configuration
    pub fn new(base_url: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent_id: agent_id.into(),
        }
    }

    /// Set the gateway base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the agent identifier
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Reject configurations that cannot produce a working session
    pub fn validate(&self) -> ChatResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ChatError::InvalidConfig("gateway base URL is empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatError::InvalidConfig(format!(
                "gateway base URL must be http(s): {}",
                self.base_url
            )));
        }
        self.base()?;
        if self.agent_id.trim().is_empty() {
            return Err(ChatError::InvalidConfig("agent id is empty".into()));
        }
        Ok(())
    }

    /// Build a gateway URL for `path` (which starts with '/')
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Build `{base}/sessions/{session_id}/{leaf}`
    ///
    /// The session ID is opaque, so it is percent-encoded as a single path
    /// segment.
    pub fn session_endpoint(&self, session_id: &str, leaf: &str) -> ChatResult<Url> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| {
                ChatError::InvalidConfig(format!(
                    "gateway base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["sessions", session_id, leaf]);
        Ok(url)
    }

    fn base(&self) -> ChatResult<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            ChatError::InvalidConfig(format!("invalid gateway base URL {}: {}", self.base_url, e))
        })
    }
}
