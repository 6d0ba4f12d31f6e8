//! Conversation service for concierge.
//!
//! This crate provides:
//!
//! - **Gateway**: start a thread, submit a message, poll a run to completion
//! - **Tool Dispatcher**: local execution of tool calls requested by a run
//! - **Session Log**: per-conversation append-only log files

pub mod error;
pub mod gateway;
pub mod message;
pub mod poll;
pub mod session_log;
pub mod tool;

pub use error::{GatewayError, ToolError};
pub use gateway::{ConversationGateway, PollOutcome};
pub use message::{latest_reply, strip_annotations};
pub use poll::{Backoff, PollPolicy};
pub use session_log::{ANONYMOUS_USER, SessionLog, SessionLogger};
pub use tool::{
    Lead, Schedule, ScheduleEntry, ToolDispatcher, ToolInvocation, ToolKind, ToolOutcome,
};
