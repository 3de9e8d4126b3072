//! The bounded model ⇄ tool loop behind one chat request.
//!
//! Each iteration makes exactly one model call. A candidate without a
//! tool-invocation request ends the loop with its text; a request is
//! dispatched and its result (or error) appended to the transcript before
//! the next call. A successful image generation ends the loop immediately.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;

use gl_domain::config::ModelConfig;
use gl_domain::error::Result;
use gl_domain::text::truncate_chars;
use gl_domain::transcript::Turn;
use gl_providers::{FinishReason, GenerateRequest, ModelClient};
use gl_tools::ToolDispatcher;

use super::extract::{extract_text, extract_tool_call};
use super::image::{profile_image_url, with_context_images, GeneratedImage, ToolKind};

/// Upper bound on model calls per chat request.
pub const MAX_MODEL_CALLS: usize = 4;

/// Answer used when the model stopped for safety and produced no text.
pub const SAFETY_FALLBACK: &str = "Cannot answer that.";

const RESULT_PREVIEW_CHARS: usize = 800;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcome types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationSettings {
    pub fn from_config(cfg: &ModelConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
        }
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopExit {
    /// A candidate carried no tool-invocation request.
    Answered,
    /// Image generation succeeded.
    ImageProduced,
    /// [`MAX_MODEL_CALLS`] reached while the model kept requesting tools.
    BudgetExhausted,
}

/// Response body of a chat request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_upload_error: Option<String>,
}

impl ChatReply {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Self::default()
        }
    }

    /// An image reply always has an empty answer.
    pub fn image(img: GeneratedImage) -> Self {
        Self {
            answer: String::new(),
            image_url: img.url,
            image_data_url: img.data_url,
            image_caption: img.caption,
            image_upload_error: img.upload_error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub reply: ChatReply,
    pub exit: LoopExit,
    pub model_calls: usize,
}

/// Per-request mutable state. Never shared between requests.
struct LoopState {
    request: GenerateRequest,
    collected_image_urls: Vec<String>,
    safety_stop: bool,
    model_calls: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct ChatOrchestrator {
    model: Arc<dyn ModelClient>,
    tools: Arc<dyn ToolDispatcher>,
    settings: GenerationSettings,
}

impl ChatOrchestrator {
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: Arc<dyn ToolDispatcher>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            model,
            tools,
            settings,
        }
    }

    /// Run the loop over a seeded transcript (sanitized history followed by
    /// the user's message).
    ///
    /// Model failures abort with the error. Tool failures are fed back to
    /// the model as `{ "error": <message> }` and never abort.
    pub async fn run(&self, system_prompt: String, transcript: Vec<Turn>) -> Result<LoopOutcome> {
        let mut state = LoopState {
            request: GenerateRequest {
                system_instruction: system_prompt,
                transcript,
                tools: self.tools.list_tools().to_vec(),
                temperature: Some(self.settings.temperature),
                max_output_tokens: Some(self.settings.max_output_tokens),
            },
            collected_image_urls: Vec::new(),
            safety_stop: false,
            model_calls: 0,
        };

        let mut answer = String::new();
        let mut image: Option<GeneratedImage> = None;
        let mut exit = LoopExit::BudgetExhausted;

        while state.model_calls < MAX_MODEL_CALLS {
            state.model_calls += 1;

            let llm_span = tracing::info_span!(
                "llm.call",
                "otel.kind" = "CLIENT",
                model = self.model.model_name(),
                iteration = state.model_calls,
            );
            let candidate = self
                .model
                .generate(&state.request)
                .instrument(llm_span)
                .await?;

            if candidate.finish_reason == FinishReason::Safety {
                tracing::debug!(iteration = state.model_calls, "safety finish reason");
                state.safety_stop = true;
            }

            let call = extract_tool_call(&candidate.parts)
                .filter(|c| !c.name.is_empty())
                .cloned();
            let Some(call) = call else {
                answer = extract_text(&candidate.parts);
                exit = LoopExit::Answered;
                break;
            };

            let name = call.name.clone();
            let kind = ToolKind::of(&name);
            let arguments = match kind {
                ToolKind::ImageGeneration => {
                    with_context_images(&call.arguments, &state.collected_image_urls)
                }
                _ => call.arguments.clone(),
            };
            let logged_args = Value::Object(arguments.clone());
            tracing::info!(tool = %name, arguments = %logged_args, "tool call");
            state.request.transcript.push(Turn::tool_request(call));

            let tool_span = tracing::info_span!("tool.call", tool_name = %name);
            let result = match self
                .tools
                .dispatch(&name, &arguments)
                .instrument(tool_span)
                .await
            {
                Ok(value) => {
                    tracing::info!(
                        tool = %name,
                        result = %truncate_chars(&value.to_string(), RESULT_PREVIEW_CHARS),
                        "tool result"
                    );
                    match kind {
                        ToolKind::ProfileImage => {
                            if let Some(url) = profile_image_url(&value) {
                                state.collected_image_urls.push(url);
                            }
                        }
                        ToolKind::ImageGeneration => {
                            if let Some(img) = GeneratedImage::from_result(&value) {
                                tracing::info!(
                                    image_url = img.url.as_deref().unwrap_or_default(),
                                    has_data_url = img.data_url.is_some(),
                                    upload_error = img.upload_error.as_deref().unwrap_or_default(),
                                    "image ready"
                                );
                                image = Some(img);
                                exit = LoopExit::ImageProduced;
                                break;
                            }
                        }
                        ToolKind::Other => {}
                    }
                    value
                }
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "tool error");
                    json!({ "error": e.to_string() })
                }
            };

            state.request.transcript.push(Turn::tool_result(name, result));
        }

        let reply = match image {
            Some(img) => ChatReply::image(img),
            None if answer.is_empty() && state.safety_stop => ChatReply::text(SAFETY_FALLBACK),
            None => ChatReply::text(answer),
        };

        tracing::info!(
            exit = ?exit,
            model_calls = state.model_calls,
            "chat loop finished"
        );

        Ok(LoopOutcome {
            reply,
            exit,
            model_calls: state.model_calls,
        })
    }
}
