use serde::{Deserialize, Serialize};

use super::AuthConfig;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote tool service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection to the external service that implements the tools
/// (keyword search, community stats, image generation, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Base URL exposing `GET /tools` and `POST /tool`. When `None`, no
    /// tools are advertised to the model.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional bearer token for the tool service.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default = "d_60000")]
    pub timeout_ms: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth: None,
            timeout_ms: 60_000,
        }
    }
}

fn d_60000() -> u64 {
    60_000
}
