use std::sync::Arc;

use gl_domain::config::Config;
use gl_providers::ModelClient;
use gl_tools::ToolDispatcher;

use crate::runtime::orchestrator::{ChatOrchestrator, GenerationSettings};
use crate::runtime::persona::PersonaPrompt;

/// Shared application state passed to all API handlers.
///
/// Built once at startup and never mutated; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persona: Arc<PersonaPrompt>,
    /// `None` when no model credential could be resolved at startup.
    pub model: Option<Arc<dyn ModelClient>>,
    pub tools: Arc<dyn ToolDispatcher>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        persona: PersonaPrompt,
        model: Option<Arc<dyn ModelClient>>,
        tools: Arc<dyn ToolDispatcher>,
    ) -> Self {
        Self {
            config,
            persona: Arc::new(persona),
            model,
            tools,
        }
    }

    /// Name of the credential the chat endpoint reports when the model is
    /// not configured, e.g. `GENAI_API_KEY`.
    pub fn credential_name(&self) -> String {
        self.config.model.auth.source_name()
    }

    /// A loop runner for one request, or `None` without a model.
    pub fn orchestrator(&self) -> Option<ChatOrchestrator> {
        let model = self.model.clone()?;
        Some(ChatOrchestrator::new(
            model,
            self.tools.clone(),
            GenerationSettings::from_config(&self.config.model),
        ))
    }
}
