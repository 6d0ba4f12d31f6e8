//! The conversation gateway.
//!
//! Three operations over the provider: start a thread, submit a user
//! message (which starts a run), and poll a run until it completes or the
//! poll window runs out. While polling, runs that stop for tool calls have
//! their calls executed locally and the outputs submitted back before the
//! next status check.

use crate::error::GatewayError;
use crate::message::latest_reply;
use crate::poll::PollPolicy;
use crate::session_log::{SessionLog, SessionLogger};
use crate::tool::{ToolDispatcher, ToolKind, ToolOutcome};
use concierge_assistant::{AssistantProvider, Run, RunStatus};
use concierge_core::{AssistantId, Result, RunId, ThreadId};
use rootcause::prelude::*;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Terminal result of polling a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The run finished; `response` is the newest message with annotations removed.
    Completed { response: String },
    /// The poll window elapsed first. Not an error.
    TimedOut,
}

/// Request-facing façade over the assistant provider.
pub struct ConversationGateway {
    provider: Arc<dyn AssistantProvider>,
    assistant_id: AssistantId,
    dispatcher: ToolDispatcher,
    logger: SessionLogger,
    policy: PollPolicy,
}

impl ConversationGateway {
    /// Creates a gateway bound to an already-resolved assistant.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        assistant_id: AssistantId,
        logger: SessionLogger,
    ) -> Self {
        Self {
            provider,
            assistant_id,
            dispatcher: ToolDispatcher::new(),
            logger,
            policy: PollPolicy::default(),
        }
    }

    /// Replaces the default poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the assistant this gateway runs.
    #[must_use]
    pub fn assistant_id(&self) -> &AssistantId {
        &self.assistant_id
    }

    /// Starts a new conversation thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot create the thread.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<ThreadId, GatewayError> {
        let thread_id = self
            .provider
            .create_thread()
            .await
            .context(GatewayError::ProviderUnavailable)?;

        let mut log = self.logger.open(thread_id.as_str());
        log.info(format!("New conversation started with thread ID: {thread_id}"));
        Ok(thread_id)
    }

    /// Appends a user message and starts a run over the thread.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty thread id (without contacting
    /// the provider), or an error if a provider call fails.
    #[instrument(skip(self, text), fields(thread_id = %thread_id))]
    pub async fn submit(&self, thread_id: &ThreadId, text: &str) -> Result<RunId, GatewayError> {
        if thread_id.is_empty() {
            return Err(GatewayError::InvalidRequest { field: "thread_id" }.into());
        }

        let mut log = self.logger.open(thread_id.as_str());
        log.info(format!("Received message for thread ID {thread_id}: {text}"));

        self.provider
            .add_user_message(thread_id, text)
            .await
            .context(GatewayError::ProviderUnavailable)?;
        let run = self
            .provider
            .create_run(thread_id, &self.assistant_id)
            .await
            .context(GatewayError::ProviderUnavailable)?;

        log.info(format!("Run started with ID {}", run.id));
        Ok(run.id)
    }

    /// Polls a run until it completes or the poll window elapses.
    ///
    /// Returns within the policy timeout plus one provider call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an empty id (without contacting the
    /// provider), `ProviderUnavailable` if a provider call fails, or
    /// `ToolFailed` if a requested tool cannot run.
    #[instrument(skip(self), fields(thread_id = %thread_id, run_id = %run_id))]
    pub async fn poll_and_resolve(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<PollOutcome, GatewayError> {
        if thread_id.is_empty() {
            return Err(GatewayError::InvalidRequest { field: "thread_id" }.into());
        }
        if run_id.is_empty() {
            return Err(GatewayError::InvalidRequest { field: "run_id" }.into());
        }

        let mut log = self.logger.open(thread_id.as_str());
        log.info(format!(
            "Checking run status for thread ID {thread_id} and run ID {run_id}"
        ));

        let deadline = Instant::now() + self.policy.timeout;
        let mut backoff = self.policy.backoff();

        while Instant::now() < deadline {
            let run = self
                .provider
                .retrieve_run(thread_id, run_id)
                .await
                .context(GatewayError::ProviderUnavailable)?;

            match run.status {
                RunStatus::Completed => {
                    let response = self.completed_response(thread_id, &mut log).await?;
                    return Ok(PollOutcome::Completed { response });
                }
                RunStatus::RequiresAction => {
                    log.info(format!("Run requires action for thread ID {thread_id}."));
                    self.resolve_required_action(thread_id, &run, &mut log)
                        .await?;
                }
                status => debug!(%status, "Run still pending"),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(backoff.next_interval().min(remaining)).await;
        }

        log.warn("Run timed out.");
        Ok(PollOutcome::TimedOut)
    }

    async fn completed_response(
        &self,
        thread_id: &ThreadId,
        log: &mut SessionLog,
    ) -> Result<String, GatewayError> {
        let messages = self
            .provider
            .list_messages(thread_id)
            .await
            .context(GatewayError::ProviderUnavailable)?;

        let response = latest_reply(&messages).unwrap_or_else(|| {
            log.warn("Run completed without a text reply.");
            String::new()
        });
        log.info(format!("Run completed. Response: {response}"));
        Ok(response)
    }

    /// Executes every pending tool call and submits the outputs.
    async fn resolve_required_action(
        &self,
        thread_id: &ThreadId,
        run: &Run,
        log: &mut SessionLog,
    ) -> Result<(), GatewayError> {
        let mut outputs = Vec::with_capacity(run.pending_tool_calls().len());

        for call in run.pending_tool_calls() {
            let outcome = self.dispatcher.dispatch(call).context(GatewayError::ToolFailed {
                name: call.function.name.clone(),
            })?;

            match &outcome {
                ToolOutcome::Output {
                    kind: ToolKind::CreateLead,
                    ..
                } => log.info(format!("Lead created for thread ID {thread_id}.")),
                ToolOutcome::Output {
                    kind: ToolKind::TimeSchedule,
                    ..
                } => log.info(format!("Time schedule processed for thread ID {thread_id}.")),
                ToolOutcome::UnknownTool { name, .. } => log.warn(format!(
                    "Unknown tool '{name}' requested for thread ID {thread_id}."
                )),
            }
            outputs.push(outcome.into_output());
        }

        if outputs.is_empty() {
            return Ok(());
        }

        self.provider
            .submit_tool_outputs(thread_id, &run.id, &outputs)
            .await
            .context(GatewayError::ProviderUnavailable)?;
        Ok(())
    }
}
