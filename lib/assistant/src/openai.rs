//! OpenAI Assistants API client.

use crate::error::ProviderError;
use crate::provider::{AssistantProvider, AssistantSpec, Run, ThreadMessage, ToolOutput};
use async_trait::async_trait;
use concierge_core::{AssistantId, MessageId, Result, RunId, ThreadId};
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a configuration against the public API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Objects we only need the id of.
#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

/// [`AssistantProvider`] backed by the OpenAI Assistants v2 HTTP API.
///
/// Ids are appended to the base URL as percent-encoded path segments, so an
/// id can never address a different resource than the one it names.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl OpenAiProvider {
    /// Builds the HTTP client with authentication headers installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value, the base
    /// URL cannot carry a path, or the client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ProviderError::InvalidConfig {
            reason: format!("invalid base url '{}': {e}", config.base_url),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidConfig {
                reason: format!("base url '{}' cannot carry a path", config.base_url),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static("assistants=v2"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
            |e| ProviderError::InvalidConfig {
                reason: format!("invalid api key: {e}"),
            },
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::InvalidConfig {
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<R, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                operation,
                reason: e.to_string(),
            })?;
        Self::decode(operation, response).await
    }

    async fn post<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
        body: serde_json::Value,
    ) -> Result<R, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                operation,
                reason: e.to_string(),
            })?;
        Self::decode(operation, response).await
    }

    async fn decode<R: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<R, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                operation,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let decoded = response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::Decode {
                operation,
                reason: e.to_string(),
            })?;
        Ok(decoded)
    }
}

#[async_trait]
impl AssistantProvider for OpenAiProvider {
    #[instrument(skip(self, spec), fields(name = %spec.name, model = %spec.model))]
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<AssistantId, ProviderError> {
        let tools: Vec<_> = spec
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        let mut body = json!({
            "name": spec.name,
            "model": spec.model,
            "tools": tools,
        });
        if let Some(instructions) = &spec.instructions {
            body["instructions"] = json!(instructions);
        }

        let created: Created = self
            .post("create_assistant", self.endpoint(&["assistants"]), body)
            .await?;
        debug!(assistant_id = %created.id, "assistant created");
        Ok(AssistantId::new(created.id))
    }

    async fn create_thread(&self) -> Result<ThreadId, ProviderError> {
        let created: Created = self
            .post("create_thread", self.endpoint(&["threads"]), json!({}))
            .await?;
        Ok(ThreadId::new(created.id))
    }

    async fn add_user_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<MessageId, ProviderError> {
        let created: Created = self
            .post(
                "add_user_message",
                self.endpoint(&["threads", thread_id.as_str(), "messages"]),
                json!({ "role": "user", "content": text }),
            )
            .await?;
        Ok(MessageId::new(created.id))
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, ProviderError> {
        self.post(
            "create_run",
            self.endpoint(&["threads", thread_id.as_str(), "runs"]),
            json!({ "assistant_id": assistant_id }),
        )
        .await
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, ProviderError> {
        let url = self.endpoint(&["threads", thread_id.as_str(), "runs", run_id.as_str()]);
        self.get("retrieve_run", url).await
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, ProviderError> {
        let mut url = self.endpoint(&["threads", thread_id.as_str(), "messages"]);
        url.query_pairs_mut().append_pair("order", "desc");
        let list: MessageList = self.get("list_messages", url).await?;
        Ok(list.data)
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
        outputs: &[ToolOutput],
    ) -> Result<Run, ProviderError> {
        self.post(
            "submit_tool_outputs",
            self.endpoint(&[
                "threads",
                thread_id.as_str(),
                "runs",
                run_id.as_str(),
                "submit_tool_outputs",
            ]),
            json!({ "tool_outputs": outputs }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FunctionTool, MessageRole, RunStatus, ToolCall};
    use concierge_core::ToolCallId;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig::new("sk-test").with_base_url(server.uri()))
            .expect("build provider")
    }

    fn authenticated(verb: &str, route: &str) -> MockBuilder {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-beta", "assistants=v2"))
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiProvider::new(
            OpenAiConfig::new("sk-test").with_base_url("http://localhost:9999/v1/"),
        )
        .expect("build provider");
        assert_eq!(
            provider.endpoint(&["threads"]).as_str(),
            "http://localhost:9999/v1/threads"
        );
    }

    #[test]
    fn ids_are_encoded_as_single_segments() {
        let provider =
            OpenAiProvider::new(OpenAiConfig::new("sk-test").with_base_url("http://localhost/v1"))
                .expect("build provider");
        let url = provider.endpoint(&["threads", "thread_1/runs/run_9/cancel?", "messages"]);
        assert_eq!(
            url.path(),
            "/v1/threads/thread_1%2Fruns%2Frun_9%2Fcancel%3F/messages"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn api_key_with_newline_is_rejected() {
        let result = OpenAiProvider::new(OpenAiConfig::new("sk-bad\nkey"));
        assert!(result.is_err());
    }

    #[test]
    fn base_url_without_path_support_is_rejected() {
        let err = OpenAiProvider::new(OpenAiConfig::new("sk-test").with_base_url("mailto:ops"))
            .err()
            .expect("should fail");
        assert!(matches!(
            err.current_context(),
            ProviderError::InvalidConfig { .. }
        ));
    }

    #[tokio::test]
    async fn create_assistant_posts_function_tools() {
        let server = MockServer::start().await;
        authenticated("POST", "/assistants")
            .and(body_partial_json(json!({
                "name": "Concierge",
                "model": "gpt-4o",
                "instructions": "Be brief.",
                "tools": [{
                    "type": "function",
                    "function": { "name": "create_lead", "description": "Save a lead" }
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "asst_1", "object": "assistant" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let spec = AssistantSpec::new("Concierge", "gpt-4o")
            .with_instructions("Be brief.")
            .with_tools(vec![FunctionTool::new("create_lead", "Save a lead")]);
        let id = provider(&server)
            .create_assistant(&spec)
            .await
            .expect("create assistant");

        assert_eq!(id, AssistantId::new("asst_1"));
    }

    #[tokio::test]
    async fn create_thread_returns_new_id() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "thread_1",
                "object": "thread",
                "created_at": 1_700_000_000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = provider(&server)
            .create_thread()
            .await
            .expect("create thread");

        assert_eq!(id, ThreadId::new("thread_1"));
    }

    #[tokio::test]
    async fn add_user_message_posts_user_role() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads/thread_1/messages")
            .and(body_partial_json(json!({ "role": "user", "content": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let id = provider(&server)
            .add_user_message(&ThreadId::new("thread_1"), "hello")
            .await
            .expect("add message");

        assert_eq!(id, MessageId::new("msg_1"));
    }

    #[tokio::test]
    async fn hostile_thread_id_stays_inside_its_segment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .mount(&server)
            .await;

        provider(&server)
            .add_user_message(&ThreadId::new("thread_victim/runs/run_9/cancel?"), "hi")
            .await
            .expect("add message");

        let requests = server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url.path(),
            "/threads/thread_victim%2Fruns%2Frun_9%2Fcancel%3F/messages"
        );
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn create_run_names_the_assistant() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads/thread_1/runs")
            .and(body_partial_json(json!({ "assistant_id": "asst_1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "object": "thread.run",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let run = provider(&server)
            .create_run(&ThreadId::new("thread_1"), &AssistantId::new("asst_1"))
            .await
            .expect("create run");

        assert_eq!(run.id, RunId::new("run_1"));
        assert_eq!(run.status, RunStatus::Queued);
        assert!(run.pending_tool_calls().is_empty());
    }

    #[tokio::test]
    async fn retrieve_run_decodes_required_action() {
        let server = MockServer::start().await;
        authenticated("GET", "/threads/thread_1/runs/run_1")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": "requires_action",
                "required_action": {
                    "type": "submit_tool_outputs",
                    "submit_tool_outputs": {
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "create_lead",
                                "arguments": r#"{"name":"Ada"}"#
                            }
                        }]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let run = provider(&server)
            .retrieve_run(&ThreadId::new("thread_1"), &RunId::new("run_1"))
            .await
            .expect("retrieve run");

        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(
            run.pending_tool_calls(),
            &[ToolCall::function("call_1", "create_lead", r#"{"name":"Ada"}"#)]
        );
    }

    #[tokio::test]
    async fn list_messages_asks_for_newest_first() {
        let server = MockServer::start().await;
        authenticated("GET", "/threads/thread_1/messages")
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {
                        "id": "msg_2",
                        "role": "assistant",
                        "content": [
                            { "type": "image_file", "image_file": { "file_id": "file_1" } },
                            {
                                "type": "text",
                                "text": {
                                    "value": "See [1]",
                                    "annotations": [{ "type": "file_citation", "text": "[1]" }]
                                }
                            }
                        ]
                    },
                    {
                        "id": "msg_1",
                        "role": "user",
                        "content": [
                            { "type": "text", "text": { "value": "hi", "annotations": [] } }
                        ]
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let messages = provider(&server)
            .list_messages(&ThreadId::new("thread_1"))
            .await
            .expect("list messages");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, MessageId::new("msg_2"));
        assert_eq!(messages[0].role, MessageRole::Assistant);
        let text = messages[0].first_text().expect("text part");
        assert_eq!(text.value, "See [1]");
        assert_eq!(text.annotations[0].text, "[1]");
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[tokio::test]
    async fn submit_tool_outputs_wraps_outputs() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads/thread_1/runs/run_1/submit_tool_outputs")
            .and(body_partial_json(json!({
                "tool_outputs": [{ "tool_call_id": "call_1", "output": r#"{"ok":true}"# }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "run_1", "status": "in_progress" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outputs = [ToolOutput {
            tool_call_id: ToolCallId::new("call_1"),
            output: r#"{"ok":true}"#.to_string(),
        }];
        let run = provider(&server)
            .submit_tool_outputs(&ThreadId::new("thread_1"), &RunId::new("run_1"), &outputs)
            .await
            .expect("submit outputs");

        assert_eq!(run.status, RunStatus::InProgress);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads/thread_1/runs")
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server)
            .create_run(&ThreadId::new("thread_1"), &AssistantId::new("asst_1"))
            .await
            .expect_err("request should fail");

        assert_eq!(
            err.current_context(),
            &ProviderError::Status {
                operation: "create_run",
                status: 429,
                body: "rate limited".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unexpected_body_is_a_decode_error() {
        let server = MockServer::start().await;
        authenticated("POST", "/threads")
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .create_thread()
            .await
            .expect_err("request should fail");

        assert!(matches!(
            err.current_context(),
            ProviderError::Decode {
                operation: "create_thread",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let provider = OpenAiProvider::new(
            OpenAiConfig::new("sk-test")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        )
        .expect("build provider");

        let err = provider
            .create_thread()
            .await
            .expect_err("request should fail");
        assert!(matches!(
            err.current_context(),
            ProviderError::Transport {
                operation: "create_thread",
                ..
            }
        ));
    }
}
