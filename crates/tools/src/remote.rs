//! Client for the external tool service.
//!
//! Wire contract:
//! - `GET  {endpoint}/tools` → `{ "tools": [ { name, description, parameters } ] }`
//! - `POST {endpoint}/tool`  with `{ name, arguments }` →
//!   `{ "result": <any> }` on success, `{ "error": <message> }` otherwise.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use gl_domain::config::ToolsConfig;
use gl_domain::error::{Error, Result};
use gl_domain::text::truncate_chars;
use gl_domain::tool::ToolDefinition;

use crate::registry::{ToolHandler, ToolRegistry};

/// Fallback message when the service fails without saying why.
const GENERIC_TOOL_ERROR: &str = "Tool error.";

/// Cap on how much of an unparseable error body ends up in a message.
const MAX_ERROR_BODY_CHARS: usize = 400;

// Mirrors the mapping in gl-providers, which this crate does not depend on.
fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

pub struct RemoteToolService {
    base_url: String,
    bearer: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    tools: Vec<ToolDefinition>,
}

impl RemoteToolService {
    /// `bearer` is resolved by the caller once at startup.
    pub fn new(cfg: &ToolsConfig, endpoint: &str, bearer: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            bearer,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Fetch the tool catalog advertised by the service.
    pub async fn fetch_catalog(&self) -> Result<Vec<ToolDefinition>> {
        let url = format!("{}/tools", self.base_url);
        let resp = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "tool catalog request failed");
            return Err(Error::Http(format!(
                "tool catalog HTTP {}: {}",
                status.as_u16(),
                truncate_chars(&text, MAX_ERROR_BODY_CHARS)
            )));
        }
        let catalog: CatalogResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, url = %url, "tool catalog body is not valid JSON");
            Error::Json(e)
        })?;
        Ok(catalog.tools)
    }

    /// Run one tool on the service.
    pub async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value> {
        let url = format!("{}/tool", self.base_url);
        let resp = self
            .authorize(self.client.post(&url))
            .json(&json!({ "name": name, "arguments": arguments }))
            .send()
            .await
            .map_err(|e| transport_error(name, e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error(name, e))?;
        if !status.is_success() {
            tracing::warn!(
                tool = %name,
                status = status.as_u16(),
                "tool service returned an error status"
            );
        }
        parse_invoke_response(name, status.is_success(), &text)
    }

    /// Fetch the catalog and register one forwarding handler per tool.
    pub async fn build_registry(self: Arc<Self>) -> Result<ToolRegistry> {
        let catalog = self.fetch_catalog().await?;
        let mut builder = ToolRegistry::builder();
        for def in catalog {
            let handler = Arc::new(RemoteTool {
                name: def.name.clone(),
                service: Arc::clone(&self),
            });
            builder = builder.register(def, handler);
        }
        builder.build()
    }
}

/// Transport failures while invoking a tool are tool errors, so they reach
/// the model as the tool's result.
fn transport_error(name: &str, e: reqwest::Error) -> Error {
    tracing::warn!(tool = %name, error = %e, "tool service transport failure");
    Error::Tool {
        tool: name.to_string(),
        message: from_reqwest(e).to_string(),
    }
}

/// A handler that forwards to [`RemoteToolService::invoke`].
struct RemoteTool {
    name: String,
    service: Arc<RemoteToolService>,
}

#[async_trait::async_trait]
impl ToolHandler for RemoteTool {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        self.service.invoke(&self.name, arguments).await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn parse_invoke_response(name: &str, success: bool, body: &str) -> Result<Value> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let error_message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.as_str())
        .map(str::to_string);

    if success {
        if let Some(message) = error_message {
            return Err(Error::Tool {
                tool: name.to_string(),
                message,
            });
        }
        return match parsed {
            Some(Value::Object(mut obj)) if obj.contains_key("result") => {
                Ok(obj.remove("result").unwrap_or(Value::Null))
            }
            Some(other) => Ok(other),
            None => Err(Error::Tool {
                tool: name.to_string(),
                message: format!(
                    "invalid tool response: {}",
                    truncate_chars(body, MAX_ERROR_BODY_CHARS)
                ),
            }),
        };
    }

    let message = error_message.unwrap_or_else(|| {
        if body.trim().is_empty() {
            GENERIC_TOOL_ERROR.to_string()
        } else {
            truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS)
        }
    });
    Err(Error::Tool {
        tool: name.to_string(),
        message,
    })
}
