//! `POST /api/chat`: one user message in, one answer (or image) out.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::Instrument;

use gl_domain::error::Error;
use gl_domain::text::truncate_chars;

use crate::api::{error_response, rejection_response};
use crate::runtime::context::{scalar_text, ProfileSnapshot};
use crate::runtime::{prepare_chat, ChatInput};
use crate::state::AppState;

const MESSAGE_PREVIEW_CHARS: usize = 300;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fields are raw JSON and coerced after parsing, so a wrongly-typed field
/// never turns into a serde rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    /// Coerced with [`scalar_text`]; structured values count as missing.
    #[serde(default)]
    pub message: Option<Value>,
    /// Caller handle. Falls back to `profile.handle`.
    #[serde(default)]
    pub handle: Option<Value>,
    /// Only a JSON object is used; other shapes are ignored.
    #[serde(default)]
    pub profile: Option<Value>,
    /// Prior messages, `[{ role, content }]`. Sanitized, never rejected.
    #[serde(default)]
    pub history: Option<Value>,
}

impl ChatPayload {
    fn message_text(&self) -> String {
        self.message
            .as_ref()
            .and_then(scalar_text)
            .map(|m| m.trim().to_string())
            .unwrap_or_default()
    }

    fn handle_text(&self) -> Option<String> {
        self.handle.as_ref().and_then(scalar_text)
    }

    fn profile_snapshot(&self) -> Option<ProfileSnapshot> {
        let profile = self.profile.as_ref().filter(|v| v.is_object())?;
        serde_json::from_value(profile.clone()).ok()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatPayload>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return rejection_response(rejection),
    };

    let message = body.message_text();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing message.");
    }

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat.request", %request_id);
    async move {
        tracing::info!(
            message = %truncate_chars(&message, MESSAGE_PREVIEW_CHARS),
            "incoming message"
        );

        let Some(orchestrator) = state.orchestrator() else {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Missing {}.", state.credential_name()),
            );
        };

        let handle = body.handle_text();
        let profile = body.profile_snapshot();
        let prepared = prepare_chat(
            &state.persona.render_today(),
            ChatInput {
                message: &message,
                handle: handle.as_deref(),
                profile: profile.as_ref(),
                history: body.history.as_ref(),
            },
        );

        match orchestrator
            .run(prepared.system_prompt, prepared.transcript)
            .await
        {
            Ok(outcome) => Json(outcome.reply).into_response(),
            Err(e) => chat_error_response(e),
        }
    }
    .instrument(span)
    .await
}

/// Model endpoint failures carry the upstream status and body; everything
/// else is reported by message.
pub(crate) fn chat_error_response(err: Error) -> Response {
    match err {
        Error::ModelUnavailable { status, body } => {
            tracing::error!(status, "model endpoint failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Gemini error ({status})."),
                    "details": body,
                })),
            )
                .into_response()
        }
        other => {
            tracing::error!(error = %other, "chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
