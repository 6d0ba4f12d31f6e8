//! In-memory provider for tests.
//!
//! Runs are replayed from a scripted status sequence; the last scripted run
//! repeats once the script is exhausted.

use crate::error::ProviderError;
use crate::provider::{AssistantProvider, AssistantSpec, Run, RunStatus, ThreadMessage, ToolOutput};
use async_trait::async_trait;
use concierge_core::{AssistantId, MessageId, Result, RunId, ThreadId};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    script: VecDeque<Run>,
    last_run: Option<Run>,
    messages: Vec<ThreadMessage>,
    calls: usize,
    assistant_creations: usize,
    retrieve_calls: usize,
    next_id: usize,
    user_messages: Vec<(ThreadId, String)>,
    created_runs: Vec<(ThreadId, AssistantId)>,
    submissions: Vec<(RunId, Vec<ToolOutput>)>,
}

/// Scripted [`AssistantProvider`].
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
    fail: bool,
}

impl MockProvider {
    /// Creates a provider whose runs stay `in_progress` forever.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with a transport error.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Scripts the runs returned by successive `retrieve_run` calls.
    #[must_use]
    pub fn with_runs(self, runs: Vec<Run>) -> Self {
        self.lock().script = runs.into();
        self
    }

    /// Scripts a status sequence for run `run_1` with no pending actions.
    #[must_use]
    pub fn with_statuses(self, statuses: &[RunStatus]) -> Self {
        let runs = statuses.iter().map(|s| Run::new("run_1", *s)).collect();
        self.with_runs(runs)
    }

    /// Sets the thread messages, newest first.
    #[must_use]
    pub fn with_messages(self, messages: Vec<ThreadMessage>) -> Self {
        self.lock().messages = messages;
        self
    }

    /// Total number of provider calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// Number of `create_assistant` calls.
    #[must_use]
    pub fn assistant_creations(&self) -> usize {
        self.lock().assistant_creations
    }

    /// Number of `retrieve_run` calls.
    #[must_use]
    pub fn retrieve_calls(&self) -> usize {
        self.lock().retrieve_calls
    }

    /// User messages appended, in order.
    #[must_use]
    pub fn user_messages(&self) -> Vec<(ThreadId, String)> {
        self.lock().user_messages.clone()
    }

    /// Runs started, in order.
    #[must_use]
    pub fn created_runs(&self) -> Vec<(ThreadId, AssistantId)> {
        self.lock().created_runs.clone()
    }

    /// Tool output submissions, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<(RunId, Vec<ToolOutput>)> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a call and fails it if the provider is failing.
    fn enter(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::MutexGuard<'_, MockState>, ProviderError> {
        let mut state = self.lock();
        state.calls += 1;
        if self.fail {
            return Err(ProviderError::Transport {
                operation,
                reason: "mock provider is down".to_string(),
            }
            .into());
        }
        Ok(state)
    }
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_mock_{}", self.next_id)
    }
}

#[async_trait]
impl AssistantProvider for MockProvider {
    async fn create_assistant(&self, _spec: &AssistantSpec) -> Result<AssistantId, ProviderError> {
        let mut state = self.enter("create_assistant")?;
        state.assistant_creations += 1;
        Ok(AssistantId::new(state.next_id("asst")))
    }

    async fn create_thread(&self) -> Result<ThreadId, ProviderError> {
        let mut state = self.enter("create_thread")?;
        Ok(ThreadId::new(state.next_id("thread")))
    }

    async fn add_user_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<MessageId, ProviderError> {
        let mut state = self.enter("add_user_message")?;
        state
            .user_messages
            .push((thread_id.clone(), text.to_string()));
        Ok(MessageId::new(state.next_id("msg")))
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, ProviderError> {
        let mut state = self.enter("create_run")?;
        state
            .created_runs
            .push((thread_id.clone(), assistant_id.clone()));
        Ok(Run::new(state.next_id("run"), RunStatus::Queued))
    }

    async fn retrieve_run(
        &self,
        _thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, ProviderError> {
        let mut state = self.enter("retrieve_run")?;
        state.retrieve_calls += 1;
        let run = match state.script.pop_front() {
            Some(run) => run,
            None => state
                .last_run
                .clone()
                .unwrap_or_else(|| Run::new(run_id.clone(), RunStatus::InProgress)),
        };
        state.last_run = Some(run.clone());
        Ok(run)
    }

    async fn list_messages(
        &self,
        _thread_id: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, ProviderError> {
        let state = self.enter("list_messages")?;
        Ok(state.messages.clone())
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &ThreadId,
        run_id: &RunId,
        outputs: &[ToolOutput],
    ) -> Result<Run, ProviderError> {
        let mut state = self.enter("submit_tool_outputs")?;
        state.submissions.push((run_id.clone(), outputs.to_vec()));
        Ok(Run::new(run_id.clone(), RunStatus::Queued))
    }
}
