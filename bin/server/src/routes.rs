//! HTTP routes: `/start`, `/chat`, and `/check`.
//!
//! Request bodies are parsed leniently. Each field is read on its own: a
//! missing or non-string field counts as empty, and a body that is not JSON
//! counts as an empty object. Either way the request reaches the gateway,
//! which answers a missing id with the documented 400.

use crate::error::{ApiError, Endpoint};
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use concierge_conversation::{ConversationGateway, PollOutcome};
use concierge_core::{RunId, ThreadId};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub type AppState = Arc<ConversationGateway>;

fn lenient_json(body: &Bytes) -> JsonValue {
    serde_json::from_slice(body).unwrap_or_default()
}

fn string_field(body: &JsonValue, key: &str) -> String {
    body.get(key)
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Builds the application router.
pub fn build_router(gateway: AppState) -> Router {
    Router::new()
        .route("/start", get(start))
        .route("/chat", post(chat))
        .route("/check", post(check))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

/// Starts a new conversation.
async fn start(State(gateway): State<AppState>) -> Result<Json<JsonValue>, ApiError> {
    let thread_id = gateway
        .start()
        .await
        .map_err(|e| ApiError::new(Endpoint::Start, e))?;
    Ok(Json(json!({ "thread_id": thread_id })))
}

/// Appends a user message and starts a run.
async fn chat(State(gateway): State<AppState>, body: Bytes) -> Result<Json<JsonValue>, ApiError> {
    let request = lenient_json(&body);
    let thread_id = ThreadId::new(string_field(&request, "thread_id"));
    let message = string_field(&request, "message");

    let run_id = gateway
        .submit(&thread_id, &message)
        .await
        .map_err(|e| ApiError::new(Endpoint::Chat, e))?;
    Ok(Json(json!({ "run_id": run_id })))
}

/// Polls a run and returns the reply, or a timeout sentinel.
async fn check(State(gateway): State<AppState>, body: Bytes) -> Result<Json<JsonValue>, ApiError> {
    let request = lenient_json(&body);
    let thread_id = ThreadId::new(string_field(&request, "thread_id"));
    let run_id = RunId::new(string_field(&request, "run_id"));

    let outcome = gateway
        .poll_and_resolve(&thread_id, &run_id)
        .await
        .map_err(|e| ApiError::new(Endpoint::Check, e))?;

    let body = match outcome {
        PollOutcome::Completed { response } => {
            json!({ "response": response, "status": "completed" })
        }
        PollOutcome::TimedOut => json!({ "response": "timeout" }),
    };
    Ok(Json(body))
}
