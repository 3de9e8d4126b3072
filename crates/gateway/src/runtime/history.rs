//! Client-supplied history → transcript prefix.
//!
//! History is advisory context, so malformed entries are dropped silently
//! rather than rejected.

use serde_json::Value;

use gl_domain::transcript::Turn;

/// Most recent turns kept from client history.
pub const MAX_HISTORY_TURNS: usize = 12;
/// Per-message character cap, applied after trimming.
pub const MAX_HISTORY_CHARS: usize = 2000;

/// Normalize untrusted history into transcript turns.
///
/// Entries without a string `content` are dropped. `assistant` maps to the
/// model role, every other role to the user. Content is trimmed and capped
/// at [`MAX_HISTORY_CHARS`]; entries left empty are dropped. Only the last
/// [`MAX_HISTORY_TURNS`] survivors are kept, oldest dropped first.
pub fn sanitize_history(history: Option<&Value>) -> Vec<Turn> {
    let Some(entries) = history.and_then(|h| h.as_array()) else {
        return Vec::new();
    };

    let mut turns: Vec<Turn> = entries
        .iter()
        .filter_map(|entry| {
            let content = entry.get("content")?.as_str()?;
            let content: String = content.trim().chars().take(MAX_HISTORY_CHARS).collect();
            if content.is_empty() {
                return None;
            }
            let is_model = entry.get("role").and_then(|r| r.as_str()) == Some("assistant");
            Some(if is_model {
                Turn::model(content)
            } else {
                Turn::user(content)
            })
        })
        .collect();

    if turns.len() > MAX_HISTORY_TURNS {
        turns.drain(..turns.len() - MAX_HISTORY_TURNS);
    }
    turns
}
