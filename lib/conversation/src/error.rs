//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ToolError`: Errors from local tool execution
//! - `GatewayError`: Errors surfaced by gateway operations

use std::fmt;

/// Errors from tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The JSON arguments did not match the tool's parameters.
    InvalidArguments { name: String, reason: String },
    /// The tool ran but its result could not be encoded.
    ExecutionFailed { name: String, reason: String },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArguments { name, reason } => {
                write!(f, "invalid arguments for tool '{name}': {reason}")
            }
            Self::ExecutionFailed { name, reason } => {
                write!(f, "tool '{name}' execution failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ToolError {}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// A required request field was missing or empty.
    InvalidRequest { field: &'static str },
    /// A call to the assistant provider failed.
    ProviderUnavailable,
    /// A tool requested by the run could not be executed.
    ToolFailed { name: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { field } => write!(f, "missing {field}"),
            Self::ProviderUnavailable => write!(f, "assistant provider unavailable"),
            Self::ToolFailed { name } => write!(f, "tool '{name}' failed"),
        }
    }
}

impl std::error::Error for GatewayError {}
