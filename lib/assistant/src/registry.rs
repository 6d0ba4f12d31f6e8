//! Resolution of the single persistent assistant identity.
//!
//! Exactly one assistant exists per deployment. Its id comes from
//! configuration when present; otherwise one is created with the provider
//! and written back to the durable store so the next start reuses it.

use crate::error::RegistryError;
use crate::provider::{AssistantProvider, AssistantSpec};
use crate::store::ConfigStore;
use concierge_core::{AssistantId, Result};
use rootcause::prelude::*;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Configuration key the assistant id is persisted under.
pub const ASSISTANT_ID_KEY: &str = "ASSISTANT_ID";

/// Resolves or lazily creates the assistant identity.
pub struct AssistantRegistry {
    provider: Arc<dyn AssistantProvider>,
    store: Box<dyn ConfigStore>,
    spec: AssistantSpec,
    configured: Option<AssistantId>,
    resolved: OnceCell<AssistantId>,
}

impl AssistantRegistry {
    /// Creates a registry.
    ///
    /// `configured` is the id already present in configuration, if any.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        store: Box<dyn ConfigStore>,
        spec: AssistantSpec,
        configured: Option<AssistantId>,
    ) -> Self {
        Self {
            provider,
            store,
            spec,
            configured: configured.filter(|id| !id.is_empty()),
            resolved: OnceCell::new(),
        }
    }

    /// Returns the assistant id, creating and persisting one if needed.
    ///
    /// The result is cached; the provider is asked to create an assistant
    /// at most once for the lifetime of the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if creation or persistence fails. Callers treat
    /// this as fatal.
    pub async fn resolve_or_create(&self) -> Result<AssistantId, RegistryError> {
        let id = self.resolved.get_or_try_init(|| self.initial_id()).await?;
        Ok(id.clone())
    }

    async fn initial_id(&self) -> Result<AssistantId, RegistryError> {
        if let Some(id) = &self.configured {
            info!(assistant_id = %id, "Assistant ID found in configuration");
            return Ok(id.clone());
        }

        info!(name = %self.spec.name, "No assistant ID found, creating a new assistant");
        let id = self
            .provider
            .create_assistant(&self.spec)
            .await
            .context(RegistryError::AssistantCreationFailed)?;

        self.store
            .set(ASSISTANT_ID_KEY, id.as_str())
            .context(RegistryError::PersistFailed {
                assistant_id: id.to_string(),
            })?;

        info!(assistant_id = %id, "New assistant created and saved");
        Ok(id)
    }
}
