//! Assistant provider access for concierge.
//!
//! This crate provides:
//!
//! - **Provider**: the [`AssistantProvider`] trait over the remote
//!   thread/run/message API, with an OpenAI Assistants implementation
//! - **Registry**: resolution of the single persistent assistant identity
//! - **Store**: durable key-value configuration the registry writes back to

pub mod error;
pub mod openai;
pub mod provider;
pub mod registry;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{ProviderError, RegistryError, StoreError};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{
    Annotation, AssistantProvider, AssistantSpec, FunctionCall, FunctionTool, MessageContent,
    MessageRole, Run, RunStatus, TextContent, ThreadMessage, ToolCall, ToolOutput,
};
pub use registry::{ASSISTANT_ID_KEY, AssistantRegistry};
pub use store::{ConfigStore, EnvFileStore};
