use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the current date when the prompt is rendered.
pub const CURRENT_DATE_PLACEHOLDER: &str = "{current_date}";

/// Static persona prompt. `prompt_file` wins over the inline `prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "d_prompt")]
    pub prompt: String,
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            prompt: d_prompt(),
            prompt_file: None,
        }
    }
}

fn d_prompt() -> String {
    "You are Gladius, a veteran of the Arena. Be brief, direct and witty. \
     Reply in plain text only. Use tools when asked about specific users, \
     communities, stats or posts. If data or tools don't support an answer, \
     say so in one line. Current Date: {current_date}."
        .into()
}
