//! Startup sequence: everything that must succeed before the listener opens.

use crate::config::ServerConfig;
use crate::error::StartupError;
use concierge_assistant::{
    AssistantProvider, AssistantRegistry, EnvFileStore, OpenAiConfig, OpenAiProvider,
};
use concierge_conversation::{ANONYMOUS_USER, ConversationGateway, SessionLogger};
use concierge_core::Result;
use rootcause::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Builds the provider client from configuration.
///
/// # Errors
///
/// Returns an error if the API key cannot be used as a header value.
pub fn openai_provider(config: &ServerConfig) -> Result<Arc<dyn AssistantProvider>, StartupError> {
    let provider = OpenAiProvider::new(
        OpenAiConfig::new(&config.openai_key).with_base_url(&config.openai_base_url),
    )
    .context(StartupError::Provider)?;
    Ok(Arc::new(provider))
}

/// Prepares the log directory, resolves the assistant, and builds the gateway.
///
/// The assistant is resolved exactly once here; the gateway receives the
/// id as a plain value.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the
/// assistant cannot be resolved.
pub async fn build_gateway(
    config: &ServerConfig,
    provider: Arc<dyn AssistantProvider>,
) -> Result<ConversationGateway, StartupError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|e| StartupError::LogDir {
        path: config.log_dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let registry = AssistantRegistry::new(
        provider.clone(),
        Box::new(EnvFileStore::new(&config.env_file)),
        config.assistant.spec(),
        config.configured_assistant(),
    );
    let assistant_id = registry
        .resolve_or_create()
        .await
        .context(StartupError::Assistant)?;
    info!(assistant_id = %assistant_id, "Assistant ready");

    Ok(ConversationGateway::new(
        provider,
        assistant_id,
        SessionLogger::new(&config.log_dir, ANONYMOUS_USER),
    )
    .with_poll_policy(config.poll.policy()))
}
