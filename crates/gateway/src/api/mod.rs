pub mod chat;
pub mod health;
pub mod tools;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/tools", get(tools::list_tools))
        .route("/api/tool", post(tools::invoke_tool))
}

/// `{ "error": message }` with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// A body that is not valid JSON (or has wrongly-typed fields) is a
/// validation failure.
pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection.body_text(), "rejected request body");
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}
