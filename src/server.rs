//! HTTP surface: the Slack events webhook and a health probe.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::dispatch::{Dispatcher, Outcome};
use crate::slack::WebhookPayload;

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// POST /slack/events
///
/// Answers the URL-verification handshake with the echoed challenge;
/// everything else is acknowledged with `{"status": "ok"}` no matter how
/// dispatch went, so the platform never retries spuriously.
async fn slack_events(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<serde_json::Value> {
    match state.dispatcher.handle_payload(&payload).await {
        Outcome::Challenge(challenge) => Json(serde_json::json!({ "challenge": challenge })),
        _ => Json(serde_json::json!({ "status": "ok" })),
    }
}

/// GET /healthz
async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the webhook router.
pub fn app_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { dispatcher })
}
