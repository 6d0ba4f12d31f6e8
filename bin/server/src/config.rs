//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use `__` as the separator, so `POLL__TIMEOUT_MS` sets `poll.timeout_ms`.

use crate::error::StartupError;
use concierge_assistant::AssistantSpec;
use concierge_assistant::openai::DEFAULT_BASE_URL;
use concierge_conversation::{PollPolicy, ToolKind};
use concierge_core::{AssistantId, Result};
use rootcause::prelude::*;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Instructions given to a newly created assistant.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful business assistant. \
Capture lead details with create_lead when a visitor shares their name, email, \
and company, and look up schedules with time_schedule when asked.";

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// API key for the assistant provider. Required.
    #[serde(default)]
    pub openai_key: String,

    /// Previously created assistant, if any.
    #[serde(default)]
    pub assistant_id: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Directory for per-conversation logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// File the created assistant id is written back to.
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    #[serde(default)]
    pub assistant: AssistantSettings,

    #[serde(default)]
    pub poll: PollSettings,
}

/// Settings used when an assistant has to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_assistant_name")]
    pub name: String,

    #[serde(default = "default_assistant_model")]
    pub model: String,

    #[serde(default = "default_assistant_instructions")]
    pub instructions: String,
}

/// Poll window for `/check`, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub max_interval_ms: u64,
}

fn default_openai_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_assistant_name() -> String {
    "MyAssistant".to_string()
}

fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_assistant_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

fn default_poll_timeout_ms() -> u64 {
    8000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            model: default_assistant_model(),
            instructions: default_assistant_instructions(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_poll_timeout_ms(),
            initial_interval_ms: default_poll_interval_ms(),
            max_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AssistantSettings {
    /// Builds the assistant definition, including every supported tool.
    #[must_use]
    pub fn spec(&self) -> AssistantSpec {
        AssistantSpec::new(&self.name, &self.model)
            .with_instructions(&self.instructions)
            .with_tools(ToolKind::definitions())
    }
}

impl PollSettings {
    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_KEY` is missing or a value is invalid.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(source: config::Environment) -> Result<Self, StartupError> {
        let config: Self = config::Config::builder()
            .add_source(source.separator("__").try_parsing(true))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| StartupError::InvalidConfig {
                reason: e.to_string(),
            })?;

        if config.openai_key.trim().is_empty() {
            return Err(StartupError::ConfigMissing { key: "OPENAI_KEY" }.into());
        }
        Ok(config)
    }

    /// Returns the configured assistant id, ignoring blank values.
    #[must_use]
    pub fn configured_assistant(&self) -> Option<AssistantId> {
        self.assistant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(AssistantId::new)
    }
}
