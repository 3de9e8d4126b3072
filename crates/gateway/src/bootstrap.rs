//! AppState construction shared by `serve`, `ask` and `tools`.
//!
//! Everything here runs once at process start: credentials are resolved,
//! the persona is loaded and the tool catalog is fetched. Request handlers
//! only ever read the result.

use std::sync::Arc;

use anyhow::Context;

use gl_domain::config::{Config, ConfigSeverity, ModelConfig, ToolsConfig};
use gl_providers::{GoogleProvider, ModelClient};
use gl_tools::{RemoteToolService, ToolDispatcher, ToolRegistry};

use crate::runtime::persona::PersonaPrompt;
use crate::state::AppState;

/// Env vars that override `[model] model`, first match wins.
const MODEL_OVERRIDE_ENV: [&str; 2] = ["GENAI_MODEL", "GOOGLE_GENAI_MODEL"];

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Persona ──────────────────────────────────────────────────────
    let persona = PersonaPrompt::load(&config.persona).context("loading persona prompt")?;
    tracing::info!(
        source = if config.persona.prompt_file.is_some() { "file" } else { "inline" },
        "persona prompt loaded"
    );

    // ── Model client ─────────────────────────────────────────────────
    let model = build_model_client(&config.model)?;

    // ── Tools ────────────────────────────────────────────────────────
    let tools = build_tool_dispatcher(&config.tools).await?;
    tracing::info!(tools = tools.list_tools().len(), "tool dispatcher ready");

    Ok(AppState::new(config, persona, model, tools))
}

/// Model name after env overrides.
pub fn resolve_model_name(cfg: &ModelConfig) -> String {
    MODEL_OVERRIDE_ENV
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| cfg.model.clone())
}

/// `Ok(None)` when the credential is missing: the gateway still boots and
/// the chat endpoint reports the missing credential per request.
fn build_model_client(cfg: &ModelConfig) -> anyhow::Result<Option<Arc<dyn ModelClient>>> {
    let api_key = match cfg.auth.resolve() {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(
                error = %e,
                credential = %cfg.auth.source_name(),
                "no model credential; chat requests will fail until configured"
            );
            return Ok(None);
        }
    };

    let model_name = resolve_model_name(cfg);
    let provider = GoogleProvider::from_config(cfg, api_key, model_name)
        .context("initializing model client")?;
    tracing::info!(
        model = %provider.model_name(),
        base_url = %cfg.base_url,
        "model client ready"
    );
    Ok(Some(Arc::new(provider)))
}

/// Registry over the remote tool service's catalog. A missing endpoint or
/// an unreachable catalog leaves the gateway running with no tools.
async fn build_tool_dispatcher(cfg: &ToolsConfig) -> anyhow::Result<Arc<dyn ToolDispatcher>> {
    let Some(endpoint) = cfg.endpoint.as_deref() else {
        tracing::info!("no tool service configured; no tools will be advertised");
        return Ok(Arc::new(ToolRegistry::empty()));
    };

    let bearer = match &cfg.auth {
        Some(auth) => match auth.resolve() {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "tool service credential missing; calling without auth");
                None
            }
        },
        None => None,
    };

    let service = Arc::new(
        RemoteToolService::new(cfg, endpoint, bearer).context("initializing tool service client")?,
    );
    let base_url = service.base_url().to_string();
    match service.build_registry().await {
        Ok(registry) => {
            tracing::info!(endpoint = %base_url, tools = registry.len(), "tool catalog loaded");
            Ok(Arc::new(registry))
        }
        Err(e) => {
            tracing::warn!(
                endpoint = %base_url,
                error = %e,
                "tool catalog unavailable; continuing with no tools"
            );
            Ok(Arc::new(ToolRegistry::empty()))
        }
    }
}
