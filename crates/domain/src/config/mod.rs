mod model;
mod observability;
mod persona;
mod server;
mod tools;

pub use model::*;
pub use observability::*;
pub use persona::*;
pub use server::*;
pub use tools::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide configuration. Loaded once at startup and shared
/// read-only behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError::error(
                "server.max_concurrent_requests",
                "must be greater than 0",
            ));
        }

        if self.model.base_url.is_empty() {
            errors.push(ConfigError::error("model.base_url", "base_url must not be empty"));
        }
        if self.model.model.is_empty() {
            errors.push(ConfigError::error("model.model", "model name must not be empty"));
        }
        if self.model.max_output_tokens == 0 {
            errors.push(ConfigError::error(
                "model.max_output_tokens",
                "must be greater than 0",
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            errors.push(ConfigError::error(
                "model.temperature",
                "temperature must be within 0.0..=2.0",
            ));
        }
        if self.model.auth.env.is_none() && self.model.auth.key.is_none() {
            errors.push(ConfigError::warning(
                "model.auth",
                "no credential source configured; chat requests will fail",
            ));
        }

        match &self.tools.endpoint {
            None => errors.push(ConfigError::warning(
                "tools.endpoint",
                "no tool service configured; the model will get no tools",
            )),
            Some(url) if url.trim().is_empty() => {
                errors.push(ConfigError::error("tools.endpoint", "endpoint must not be empty"));
            }
            Some(_) => {}
        }

        if self.persona.prompt_file.is_none() && self.persona.prompt.trim().is_empty() {
            errors.push(ConfigError::warning("persona.prompt", "persona prompt is empty"));
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError::error(
                "observability.sample_rate",
                "sample_rate must be within 0.0..=1.0",
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}
