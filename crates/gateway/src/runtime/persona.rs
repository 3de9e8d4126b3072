//! Persona prompt template.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use gl_domain::config::{PersonaConfig, CURRENT_DATE_PLACEHOLDER};

/// The static persona template, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PersonaPrompt {
    template: String,
}

impl PersonaPrompt {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Load from `prompt_file` when set, else use the inline prompt.
    pub fn load(cfg: &PersonaConfig) -> anyhow::Result<Self> {
        match &cfg.prompt_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::new(cfg.prompt.clone())),
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("reading persona prompt {}", path.display()))?;
        Ok(Self::new(template.trim()))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fill in the date placeholder (`YYYY-MM-DD`).
    pub fn render(&self, date: NaiveDate) -> String {
        self.template.replace(
            CURRENT_DATE_PLACEHOLDER,
            &date.format("%Y-%m-%d").to_string(),
        )
    }

    /// Render for today's UTC date.
    pub fn render_today(&self) -> String {
        self.render(chrono::Utc::now().date_naive())
    }
}
