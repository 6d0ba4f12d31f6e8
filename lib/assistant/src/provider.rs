//! Assistant provider abstraction.
//!
//! The provider owns threads, runs, and messages. This module describes the
//! slice of its data model we observe and the operations we call; it does
//! not attempt to model the run lifecycle itself.

use crate::error::ProviderError;
use async_trait::async_trait;
use concierge_core::{AssistantId, MessageId, Result, RunId, ThreadId, ToolCallId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Status of a run as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status this client does not know about.
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assistant turn over a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub status: RunStatus,
    /// Present while the run is waiting on tool outputs.
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
}

impl Run {
    /// Creates a run with no pending action.
    #[must_use]
    pub fn new(id: impl Into<RunId>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            status,
            required_action: None,
        }
    }

    /// Creates a run waiting on the given tool calls.
    #[must_use]
    pub fn requiring(id: impl Into<RunId>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: id.into(),
            status: RunStatus::RequiresAction,
            required_action: Some(RequiredAction {
                submit_tool_outputs: SubmitToolOutputs { tool_calls },
            }),
        }
    }

    /// Returns the tool calls the run is waiting on, if any.
    #[must_use]
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.required_action
            .as_ref()
            .map(|action| action.submit_tool_outputs.tool_calls.as_slice())
            .unwrap_or_default()
    }
}

/// Action a run needs before it can continue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputs,
}

/// The batch of tool calls awaiting outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// A function invocation requested by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: ToolCallId,
    pub function: FunctionCall,
}

impl ToolCall {
    /// Creates a function tool call.
    #[must_use]
    pub fn function(
        id: impl Into<ToolCallId>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Name and JSON-encoded arguments of a requested function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Output submitted back for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: ToolCallId,
    /// JSON-encoded result.
    pub output: String,
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: MessageId,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// Creates an assistant message with a single text part.
    #[must_use]
    pub fn assistant_text(
        id: impl Into<MessageId>,
        value: impl Into<String>,
        annotations: Vec<Annotation>,
    ) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: value.into(),
                    annotations,
                },
            }],
        }
    }

    /// Returns the first text part of the message.
    #[must_use]
    pub fn first_text(&self) -> Option<&TextContent> {
        self.content.iter().find_map(|part| match part {
            MessageContent::Text { text } => Some(text),
            MessageContent::Other => None,
        })
    }
}

/// One content part of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    /// Images, refusals and anything else we never display.
    #[serde(other)]
    Other,
}

/// Text value plus the annotations attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A citation-like marker inside a text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// The literal marker text as it appears in the value.
    pub text: String,
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
}

impl Annotation {
    /// Creates an annotation with only its marker text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_index: None,
            end_index: None,
        }
    }
}

/// A function tool the assistant may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    pub description: String,
    /// JSON schema for the arguments.
    pub parameters: JsonValue,
}

impl FunctionTool {
    /// Creates a function tool with an empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Sets the argument schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: JsonValue) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Configuration used when creating the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantSpec {
    pub name: String,
    pub model: String,
    pub instructions: Option<String>,
    pub tools: Vec<FunctionTool>,
}

impl AssistantSpec {
    /// Creates a spec with no instructions and no tools.
    #[must_use]
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions: None,
            tools: Vec::new(),
        }
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Sets the function tools.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<FunctionTool>) -> Self {
        self.tools = tools;
        self
    }
}

/// Trait for assistant providers.
///
/// Every method is a single remote call; nothing is cached locally.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Creates a new assistant and returns its id.
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<AssistantId, ProviderError>;

    /// Creates an empty thread.
    async fn create_thread(&self) -> Result<ThreadId, ProviderError>;

    /// Appends a user message to a thread.
    async fn add_user_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<MessageId, ProviderError>;

    /// Starts a run of the assistant over a thread.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, ProviderError>;

    /// Fetches the current state of a run.
    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId)
    -> Result<Run, ProviderError>;

    /// Lists the messages of a thread, newest first.
    async fn list_messages(&self, thread_id: &ThreadId)
    -> Result<Vec<ThreadMessage>, ProviderError>;

    /// Submits tool outputs for a run waiting on them.
    async fn submit_tool_outputs(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
        outputs: &[ToolOutput],
    ) -> Result<Run, ProviderError>;
}
