//! Error types for the assistant crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProviderError`: Low-level provider API operations
//! - `StoreError`: Durable configuration store operations
//! - `RegistryError`: Assistant identity resolution (fatal at startup)

use std::fmt;

/// Errors from assistant provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The client could not be built from its configuration.
    InvalidConfig { reason: String },
    /// The request never produced a response.
    Transport {
        operation: &'static str,
        reason: String,
    },
    /// The provider answered with a non-success status.
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// The response body could not be decoded.
    Decode {
        operation: &'static str,
        reason: String,
    },
}

impl ProviderError {
    /// Returns the provider operation that failed, if known.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { .. } => None,
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(operation),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => {
                write!(f, "invalid assistant provider configuration: {reason}")
            }
            Self::Transport { operation, reason } => {
                write!(f, "assistant provider unavailable during {operation}: {reason}")
            }
            Self::Status {
                operation,
                status,
                body,
            } => {
                write!(f, "assistant provider returned {status} for {operation}: {body}")
            }
            Self::Decode { operation, reason } => {
                write!(f, "failed to decode {operation} response: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors from the durable configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io { path: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "config store '{path}' unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors resolving the assistant identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The provider refused or failed to create the assistant.
    AssistantCreationFailed,
    /// The assistant was created but its id could not be written back.
    PersistFailed { assistant_id: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssistantCreationFailed => write!(f, "error creating assistant"),
            Self::PersistFailed { assistant_id } => {
                write!(f, "failed to persist assistant id {assistant_id}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
