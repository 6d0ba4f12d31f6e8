//! Core types shared across the concierge workspace.
//!
//! Identifiers issued by the assistant provider and the common `Result`
//! alias live here so every crate agrees on them.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AssistantId, MessageId, RunId, ThreadId, ToolCallId};
