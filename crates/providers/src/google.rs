//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API. Auth is via an API key sent
//! in the `x-goog-api-key` header. Function calling runs in `AUTO` mode.

use crate::traits::{Candidate, FinishReason, GenerateRequest, ModelClient};
use crate::util::from_reqwest;
use gl_domain::config::ModelConfig;
use gl_domain::error::{Error, Result};
use gl_domain::tool::ToolDefinition;
use gl_domain::transcript::{Part, Role, ToolInvocation, Turn};
use serde_json::{json, Map, Value};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`ModelClient`] for the Google Gemini API.
pub struct GoogleProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a client from the model config. The credential and the model
    /// name are resolved by the caller once at startup.
    pub fn from_config(cfg: &ModelConfig, api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request serialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn build_body(req: &GenerateRequest) -> Value {
    let contents: Vec<Value> = req.transcript.iter().map(turn_to_gemini).collect();

    let mut body = json!({
        "systemInstruction": { "parts": [{ "text": req.system_instruction }] },
        "contents": contents,
    });

    if !req.tools.is_empty() {
        let function_declarations: Vec<Value> = req.tools.iter().map(tool_to_gemini).collect();
        body["tools"] = json!([{ "functionDeclarations": function_declarations }]);
        body["toolConfig"] = json!({ "functionCallingConfig": { "mode": "AUTO" } });
    }

    let mut gen_config = json!({});
    if let Some(temp) = req.temperature {
        gen_config["temperature"] = json!(temp);
    }
    if let Some(max) = req.max_output_tokens {
        gen_config["maxOutputTokens"] = json!(max);
    }
    if gen_config.as_object().is_some_and(|o| !o.is_empty()) {
        body["generationConfig"] = gen_config;
    }

    body
}

fn turn_to_gemini(turn: &Turn) -> Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Model => "model",
    };
    let parts: Vec<Value> = turn.parts.iter().map(part_to_gemini).collect();
    json!({ "role": role, "parts": parts })
}

fn part_to_gemini(part: &Part) -> Value {
    match part {
        Part::Text(text) => json!({ "text": text }),
        Part::ToolInvocationRequest(call) => {
            // Echo the request back exactly as the model sent it.
            let mut fc = call.extra.clone();
            fc.insert("name".into(), Value::String(call.name.clone()));
            fc.insert("args".into(), Value::Object(call.arguments.clone()));
            json!({ "functionCall": fc })
        }
        Part::ToolInvocationResult { name, response } => json!({
            "functionResponse": { "name": name, "response": response }
        }),
    }
}

fn tool_to_gemini(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse the first candidate. Later candidates are ignored; a response
/// without candidates yields an empty candidate.
pub(crate) fn parse_gemini_response(body: &Value) -> Candidate {
    let Some(candidate) = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    else {
        tracing::debug!("gemini response carried no candidates");
        return Candidate::default();
    };

    let parts = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| parts.iter().filter_map(parse_part).collect())
        .unwrap_or_default();

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|v| v.as_str())
        .map(FinishReason::from_wire)
        .unwrap_or_default();

    Candidate {
        parts,
        finish_reason,
    }
}

fn parse_part(part: &Value) -> Option<Part> {
    if let Some(fc) = part.get("functionCall").and_then(|v| v.as_object()) {
        let mut extra = fc.clone();
        let name = extra
            .remove("name")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let arguments = match extra.remove("args") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        return Some(Part::ToolInvocationRequest(ToolInvocation {
            name,
            arguments,
            extra,
        }));
    }
    part.get("text")
        .and_then(|v| v.as_str())
        .map(|t| Part::Text(t.to_string()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ModelClient for GoogleProvider {
    async fn generate(&self, req: &GenerateRequest) -> Result<Candidate> {
        let url = self.generate_url();
        let body = build_body(req);

        tracing::debug!(
            model = %self.model,
            turns = req.transcript.len(),
            tools = req.tools.len(),
            "gemini generate request"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "gemini returned an error status");
            return Err(Error::ModelUnavailable {
                status: status.as_u16(),
                body: resp_text,
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        Ok(parse_gemini_response(&resp_json))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
