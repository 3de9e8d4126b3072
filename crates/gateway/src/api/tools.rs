//! Tools API endpoints.
//!
//! - `GET  /api/tools`: the schema advertised to the model
//! - `POST /api/tool`: run one tool directly

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::api::{error_response, rejection_response};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/tools
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "tools": state.tools.list_tools() }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
pub struct ToolInvokeRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Non-object values are treated as no arguments.
    #[serde(default)]
    pub arguments: Value,
}

pub async fn invoke_tool(
    State(state): State<AppState>,
    body: Result<Json<ToolInvokeRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return rejection_response(rejection),
    };

    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing tool name.");
    }

    let arguments = match req.arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let span = tracing::info_span!("tool.call", tool_name = %name);
    match state.tools.dispatch(name, &arguments).instrument(span).await {
        Ok(result) => Json(serde_json::json!({ "result": result })).into_response(),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "direct tool call failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
