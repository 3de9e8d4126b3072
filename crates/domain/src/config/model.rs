use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the generative-language endpoint the orchestrator calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model name. `GENAI_MODEL` / `GOOGLE_GENAI_MODEL` override this at
    /// startup.
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_auth")]
    pub auth: AuthConfig,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_700")]
    pub max_output_tokens: u32,
    /// Per-call HTTP timeout.
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            model: d_model(),
            auth: d_auth(),
            temperature: d_temperature(),
            max_output_tokens: 700,
            timeout_ms: 120_000,
        }
    }
}

/// Where a credential comes from.
///
/// `key` wins over `env` when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Env var containing the key.
    #[serde(default)]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

impl AuthConfig {
    /// Human-readable name of the credential source, used in error messages.
    pub fn source_name(&self) -> String {
        match (&self.key, &self.env) {
            (Some(_), _) => "auth.key".into(),
            (None, Some(env)) => env.clone(),
            (None, None) => "credential".into(),
        }
    }

    /// Resolve the secret.
    ///
    /// Precedence:
    /// 1. `key` field (plaintext, warns)
    /// 2. `env` field (reads the environment variable; empty counts as unset)
    /// 3. Error
    pub fn resolve(&self) -> Result<String> {
        if let Some(ref key) = self.key {
            tracing::warn!(
                "credential loaded from plaintext config field 'key'; \
                 prefer 'env' instead"
            );
            return Ok(key.clone());
        }

        if let Some(ref env_var) = self.env {
            return match std::env::var(env_var) {
                Ok(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(Error::Auth(format!(
                    "environment variable '{env_var}' not set or empty"
                ))),
            };
        }

        Err(Error::Auth(
            "no credential configured: set 'key' or 'env'".into(),
        ))
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_model() -> String {
    "gemini-2.5-flash".into()
}
fn d_auth() -> AuthConfig {
    AuthConfig {
        env: Some("GENAI_API_KEY".into()),
        key: None,
    }
}
fn d_temperature() -> f32 {
    0.7
}
fn d_700() -> u32 {
    700
}
fn d_120000() -> u64 {
    120_000
}
